//! LRU Selection Module
//!
//! Picks the least recently used keys for the trim phase of a tidy pass.

/// Returns the `count` least recently used keys.
///
/// Candidates are `(key, last_access_ms)` pairs. Ordering is ascending by last
/// access, and equal timestamps fall back to the smaller key first. Callers
/// should not rely on the tie order.
pub fn least_recent<I>(candidates: I, count: usize) -> Vec<i64>
where
    I: IntoIterator<Item = (i64, u64)>,
{
    if count == 0 {
        return Vec::new();
    }

    let mut ordered: Vec<(i64, u64)> = candidates.into_iter().collect();
    ordered.sort_unstable_by_key(|&(key, last_access)| (last_access, key));
    ordered.truncate(count);
    ordered.into_iter().map(|(key, _)| key).collect()
}
