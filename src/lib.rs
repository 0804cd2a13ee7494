//! Tidy Buffer - A bounded in-process payload buffer
//!
//! Stores opaque payloads under sequential integer keys. Entries become
//! unreadable once their TTL has elapsed since the last access or once their
//! access limit is spent, and a tidy pass trims the buffer back to its target
//! length whenever it grows past capacity.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod sequence;

pub use cache::{
    Buffer, BufferStats, EntryMetric, ExistenceCheck, Reader, ReaderWriter, SingleSlot,
    TidyReport, Writer,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BufferConfig;
pub use error::{BufferError, Result};
pub use sequence::{AtomicSequence, KeySequence};
