//! Buffer Module
//!
//! Main buffer engine: a concurrent payload store, a metric table, and the
//! tidy pass that keeps both bounded.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, trace};

use crate::cache::lru;
use crate::cache::stats::StatsRecorder;
use crate::cache::{BufferStats, EntryMetric, ExistenceCheck, Reader, Writer};
use crate::clock::{Clock, SystemClock};
use crate::config::BufferConfig;
use crate::error::Result;
use crate::sequence::{AtomicSequence, KeySequence};

// == Tidy Report ==
/// Outcome of one tidy pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TidyReport {
    /// Invalid entries removed
    pub reaped: usize,
    /// Valid entries removed to get back to the target length
    pub trimmed: usize,
    /// Entries left after the pass
    pub remaining: usize,
}

impl TidyReport {
    /// True when the pass removed anything.
    pub fn evicted(&self) -> bool {
        self.reaped + self.trimmed > 0
    }
}

// == Buffer ==
/// Bounded buffer handing out sequential keys for stored payloads.
///
/// Entries turn invalid once their TTL has elapsed since the last access or
/// once their access limit is exceeded. Invalid entries are not removed by
/// reads: they stay resident until a tidy pass runs, which only happens once
/// the buffer grows past its capacity. Staleness is bounded, memory is not
/// strictly bounded between passes.
///
/// # Locking
/// Payloads live in a `DashMap`. The metric table sits behind an `RwLock`:
/// writes and tidy passes hold it exclusively, reads and existence checks
/// hold it shared and touch metrics through atomics. Lock order is always
/// metrics first, then store.
pub struct Buffer<T> {
    /// Validated configuration
    config: BufferConfig,
    /// Key to payload
    store: DashMap<i64, T>,
    /// Key to liveness metric
    metrics: RwLock<HashMap<i64, EntryMetric>>,
    /// Key source
    sequence: Arc<dyn KeySequence>,
    /// Time source for metrics
    clock: Arc<dyn Clock>,
    /// Activity counters
    stats: StatsRecorder,
}

impl<T> Buffer<T> {
    // == Constructor ==
    /// Creates a buffer with its own key sequence starting at 1.
    pub fn new(config: BufferConfig) -> Result<Self> {
        Self::with_sequence(config, Arc::new(AtomicSequence::new()))
    }

    /// Creates a buffer drawing keys from the given sequence.
    pub fn with_sequence(config: BufferConfig, sequence: Arc<dyn KeySequence>) -> Result<Self> {
        let config = config.validated()?;
        Ok(Self {
            config,
            store: DashMap::with_capacity(config.capacity + 1),
            metrics: RwLock::new(HashMap::with_capacity(config.capacity + 1)),
            sequence,
            clock: Arc::new(SystemClock),
            stats: StatsRecorder::default(),
        })
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    // == Write ==
    /// Stores a payload and returns its key.
    ///
    /// The write counts as the first use of the entry. A tidy pass follows,
    /// which may evict unrelated entries.
    ///
    /// # Arguments
    /// * `payload` - The payload to store; it is never inspected
    pub fn write(&self, payload: T) -> i64 {
        let key = self.sequence.next_key();
        self.store.insert(key, payload);

        let now = self.clock.now_ms();
        {
            let mut metrics = self.metrics.write();
            let metric = EntryMetric::new(key, now);
            metric.touch(now);
            metrics.insert(key, metric);
        }
        self.stats.record_write();
        trace!(key, "payload written");

        self.tidy();
        key
    }

    // == Read ==
    /// Returns a clone of the payload if the entry is present and valid.
    ///
    /// A hit counts toward the access limit. Nothing is removed on a miss,
    /// even when the entry is present but invalid.
    ///
    /// # Arguments
    /// * `key` - The key returned by `write`
    pub fn read(&self, key: i64) -> Option<T>
    where
        T: Clone,
    {
        let now = self.clock.now_ms();
        let payload = {
            let metrics = self.metrics.read();
            match metrics.get(&key) {
                Some(metric) if metric.try_touch(&self.config, now) => {
                    self.store.get(&key).map(|entry| entry.value().clone())
                }
                _ => None,
            }
        };

        if payload.is_some() {
            self.stats.record_hit();
            trace!(key, "read hit");
        } else {
            self.stats.record_miss();
            trace!(key, "read miss");
        }
        payload
    }

    // == Exist ==
    /// Checks the entry is present and valid without counting an access.
    ///
    /// # Arguments
    /// * `key` - The key to probe
    pub fn exist(&self, key: i64) -> bool {
        let now = self.clock.now_ms();
        let metrics = self.metrics.read();
        metrics
            .get(&key)
            .is_some_and(|metric| metric.is_valid(&self.config, now))
            && self.store.contains_key(&key)
    }

    // == Tidy ==
    /// Removes invalid entries, then the least recently used ones.
    ///
    /// Does nothing while the buffer holds at most `capacity` entries. Past
    /// that, every invalid entry is reaped, and if the survivors still exceed
    /// `target_length` the oldest by last access are trimmed until exactly
    /// `target_length` remain.
    ///
    /// Runs after every write; calling it directly is also allowed.
    ///
    /// # Returns
    /// A `TidyReport` with the reaped and trimmed counts and the entries left
    pub fn tidy(&self) -> TidyReport {
        let mut metrics = self.metrics.write();
        if metrics.len() <= self.config.capacity {
            return TidyReport {
                remaining: metrics.len(),
                ..TidyReport::default()
            };
        }

        let now = self.clock.now_ms();
        let before = metrics.len();
        metrics.retain(|key, metric| {
            let keep = metric.is_valid(&self.config, now);
            if !keep {
                self.store.remove(key);
            }
            keep
        });
        let reaped = before - metrics.len();

        let excess = metrics.len().saturating_sub(self.config.target_length);
        let victims = lru::least_recent(
            metrics.iter().map(|(key, metric)| (*key, metric.last_access())),
            excess,
        );
        for key in &victims {
            metrics.remove(key);
            self.store.remove(key);
        }

        let report = TidyReport {
            reaped,
            trimmed: victims.len(),
            remaining: metrics.len(),
        };
        self.stats.record_tidy(report.reaped, report.trimmed);
        debug!(
            reaped = report.reaped,
            trimmed = report.trimmed,
            remaining = report.remaining,
            "buffer tidied"
        );
        report
    }

    // == Stats ==
    /// Returns current buffer statistics.
    pub fn stats(&self) -> BufferStats {
        self.stats.snapshot(self.len())
    }

    // == Length ==
    /// Returns the number of resident entries, valid or not.
    pub fn len(&self) -> usize {
        self.metrics.read().len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.metrics.read().is_empty()
    }
}

impl<T> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("config", &self.config)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T: Clone> Reader<T> for Buffer<T> {
    fn read(&self, key: i64) -> Option<T> {
        Buffer::read(self, key)
    }
}

impl<T> Writer<T> for Buffer<T> {
    fn write(&self, payload: T) -> i64 {
        Buffer::write(self, payload)
    }
}

impl<T> ExistenceCheck for Buffer<T> {
    fn exist(&self, key: i64) -> bool {
        Buffer::exist(self, key)
    }
}
