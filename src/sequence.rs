//! Key Sequence Module
//!
//! Hands out the integer handles returned by writes.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of strictly increasing keys.
///
/// Implementations must be thread-safe and never repeat a key. A sequence can
/// be private to one cache or shared between several through an `Arc`.
pub trait KeySequence: Send + Sync {
    /// Returns the next key.
    fn next_key(&self) -> i64;
}

// == Atomic Sequence ==
/// Lock-free sequence starting at 1.
#[derive(Debug)]
pub struct AtomicSequence {
    next: AtomicI64,
}

impl AtomicSequence {
    pub fn new() -> Self {
        Self {
            next: AtomicI64::new(1),
        }
    }

    /// Creates a sequence ready to be handed to several caches.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for AtomicSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySequence for AtomicSequence {
    fn next_key(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
