//! Cache Module
//!
//! Sequential-key buffers with TTL and access-limit invalidation.

mod lru;
mod metric;
mod single;
mod stats;
mod store;
mod traits;


// Re-export public types
pub use metric::EntryMetric;
pub use single::SingleSlot;
pub use stats::BufferStats;
pub use store::{Buffer, TidyReport};
pub use traits::{ExistenceCheck, Reader, ReaderWriter, Writer};
