//! Buffer Statistics Module
//!
//! Tracks buffer activity: hits, misses, writes and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Buffer Stats ==
/// Point-in-time snapshot of buffer activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    /// Reads that returned a payload
    pub hits: u64,
    /// Reads that returned nothing (unknown, expired, exhausted or evicted)
    pub misses: u64,
    /// Payloads written
    pub writes: u64,
    /// Entries removed by a tidy pass because they were invalid
    pub reaped: u64,
    /// Valid entries removed by a tidy pass to get back to the target length
    pub trimmed: u64,
    /// Entries resident when the snapshot was taken
    pub entries: usize,
}

impl BufferStats {
    // == Hit Rate ==
    /// Calculates the read hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total entries removed by tidy passes.
    pub fn evictions(&self) -> u64 {
        self.reaped + self.trimmed
    }
}

// == Stats Recorder ==
/// Shared counters behind a `BufferStats` snapshot.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    reaped: AtomicU64,
    trimmed: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_tidy(&self, reaped: usize, trimmed: usize) {
        self.reaped.fetch_add(reaped as u64, Ordering::Relaxed);
        self.trimmed.fetch_add(trimmed as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: usize) -> BufferStats {
        BufferStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            reaped: self.reaped.load(Ordering::Relaxed),
            trimmed: self.trimmed.load(Ordering::Relaxed),
            entries,
        }
    }
}
