//! Entry Metric Module
//!
//! Per-entry liveness state: recency and access count.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::config::BufferConfig;

// == Entry Metric ==
/// Liveness state of one entry.
///
/// Validity is recomputed on every check from the elapsed time since the last
/// access and the number of accesses so far; nothing is ever flagged as
/// expired.
///
/// # Thread Safety
/// Every field is an atomic, so `touch` can run while other threads call
/// `is_valid`. Removal of the metric itself is serialized by the owner.
#[derive(Debug)]
pub struct EntryMetric {
    /// Key of the entry this metric belongs to
    key: AtomicI64,
    /// Last access time (Unix milliseconds)
    last_access: AtomicU64,
    /// Number of uses so far
    access_count: AtomicI64,
}

impl EntryMetric {
    // == Constructor ==
    /// Creates a metric with an access count of zero.
    pub fn new(key: i64, now_ms: u64) -> Self {
        Self {
            key: AtomicI64::new(key),
            last_access: AtomicU64::new(now_ms),
            access_count: AtomicI64::new(0),
        }
    }

    // == Touch ==
    /// Counts one use and refreshes the last access time.
    pub fn touch(&self, now_ms: u64) -> &Self {
        self.access_count.fetch_add(1, Ordering::AcqRel);
        self.last_access.store(now_ms, Ordering::Release);
        self
    }

    // == Is Valid ==
    /// Checks the entry is within both its TTL and its access limit.
    ///
    /// Boundary condition: an entry whose age equals the TTL exactly, or whose
    /// count equals the limit exactly, is still valid.
    pub fn is_valid(&self, config: &BufferConfig, now_ms: u64) -> bool {
        self.within_ttl(config, now_ms)
            && self.access_count.load(Ordering::Acquire) <= config.access_limit
    }

    // == Try Touch ==
    /// Validity check and touch as one step.
    ///
    /// The count is only incremented from a value still within the limit, so
    /// concurrent readers cannot both consume the last allowed access.
    pub fn try_touch(&self, config: &BufferConfig, now_ms: u64) -> bool {
        if !self.within_ttl(config, now_ms) {
            return false;
        }
        let limit = config.access_limit;
        let counted = self
            .access_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count <= limit).then_some(count + 1)
            })
            .is_ok();
        if counted {
            self.last_access.store(now_ms, Ordering::Release);
        }
        counted
    }

    // == Reset ==
    /// Repurposes the metric for a new key, counting the reset as its first use.
    pub fn reset(&self, key: i64, now_ms: u64) {
        self.key.store(key, Ordering::Release);
        self.access_count.store(1, Ordering::Release);
        self.last_access.store(now_ms, Ordering::Release);
    }

    pub fn key(&self) -> i64 {
        self.key.load(Ordering::Acquire)
    }

    /// Last access time (Unix milliseconds).
    pub fn last_access(&self) -> u64 {
        self.last_access.load(Ordering::Acquire)
    }

    pub fn access_count(&self) -> i64 {
        self.access_count.load(Ordering::Acquire)
    }

    fn within_ttl(&self, config: &BufferConfig, now_ms: u64) -> bool {
        let age_ms = now_ms.saturating_sub(self.last_access());
        age_ms as f64 / 1000.0 <= config.ttl_seconds
    }
}
