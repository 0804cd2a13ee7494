//! Single Slot Module
//!
//! Capacity-one cache sharing the buffer's validity rules.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::cache::{EntryMetric, ExistenceCheck, Reader, Writer};
use crate::clock::{Clock, SystemClock};
use crate::config::BufferConfig;
use crate::error::Result;
use crate::sequence::{AtomicSequence, KeySequence};

// == Single Slot ==
/// Holds exactly one payload at a time.
///
/// Every write takes a new key and resets the metric, so the key of the
/// previous payload can never be read again, whatever its TTL or access count.
///
/// The key sequence is a construction choice. [`SingleSlot::new`] gives the
/// slot a private sequence; [`SingleSlot::with_sequence`] lets several slots
/// share one, so their keys interleave in a single increasing key space.
pub struct SingleSlot<T> {
    config: BufferConfig,
    /// Current payload, `None` until the first write
    slot: RwLock<Option<T>>,
    metric: EntryMetric,
    sequence: Arc<dyn KeySequence>,
    clock: Arc<dyn Clock>,
}

impl<T> SingleSlot<T> {
    // == Constructor ==
    /// Creates an empty slot with its own key sequence.
    pub fn new(config: BufferConfig) -> Result<Self> {
        Self::with_sequence(config, Arc::new(AtomicSequence::new()))
    }

    /// Creates an empty slot drawing keys from the given sequence.
    pub fn with_sequence(config: BufferConfig, sequence: Arc<dyn KeySequence>) -> Result<Self> {
        let config = config.validated()?;
        Ok(Self {
            config,
            slot: RwLock::new(None),
            // Placeholder until the first write; reads of an empty slot miss
            metric: EntryMetric::new(0, 0),
            sequence,
            clock: Arc::new(SystemClock),
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
    /// Replaces the payload and returns its new key.
    ///
    /// The metric is reset to the new key with the write counted as its first
    /// use. Whatever key was held before becomes unreadable.
    ///
    /// # Arguments
    /// * `payload` - The payload to hold, replacing the current one
    pub fn write(&self, payload: T) -> i64 {
        let mut slot = self.slot.write();
        // Taken under the lock so the slot always ends up on the latest key
        let key = self.sequence.next_key();
        *slot = Some(payload);
        self.metric.reset(key, self.clock.now_ms());
        trace!(key, "slot overwritten");
        key
    }

    // == Read ==
    /// Returns a clone of the payload if `key` is the current key and the
    /// entry is still valid.
    ///
    /// A hit counts toward the access limit. An empty slot never counts an
    /// access, whatever key is asked for.
    ///
    /// # Arguments
    /// * `key` - The key returned by the write to read back
    pub fn read(&self, key: i64) -> Option<T>
    where
        T: Clone,
    {
        let slot = self.slot.read();
        let payload = slot.as_ref()?;
        if self.metric.key() != key || !self.metric.try_touch(&self.config, self.clock.now_ms()) {
            return None;
        }
        Some(payload.clone())
    }

    // == Exist ==
    /// Checks `key` is the current key and still valid, without counting an
    /// access.
    ///
    /// # Arguments
    /// * `key` - The key to probe
    pub fn exist(&self, key: i64) -> bool {
        let slot = self.slot.read();
        slot.is_some()
            && self.metric.key() == key
            && self.metric.is_valid(&self.config, self.clock.now_ms())
    }

    /// Key of the payload currently held, if any.
    pub fn current_key(&self) -> Option<i64> {
        let slot = self.slot.read();
        slot.as_ref().map(|_| self.metric.key())
    }
}

impl<T> fmt::Debug for SingleSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleSlot")
            .field("config", &self.config)
            .field("metric", &self.metric)
            .finish_non_exhaustive()
    }
}

impl<T: Clone> Reader<T> for SingleSlot<T> {
    fn read(&self, key: i64) -> Option<T> {
        SingleSlot::read(self, key)
    }
}

impl<T> Writer<T> for SingleSlot<T> {
    fn write(&self, payload: T) -> i64 {
        SingleSlot::write(self, payload)
    }
}

impl<T> ExistenceCheck for SingleSlot<T> {
    fn exist(&self, key: i64) -> bool {
        SingleSlot::exist(self, key)
    }
}
