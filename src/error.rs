//! Error types for the buffer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Buffer Error Enum ==
/// Errors raised while constructing a buffer.
///
/// Reads and existence checks never fail: an unavailable entry is reported as
/// `None` / `false` without a reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Configuration failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the buffer.
pub type Result<T> = std::result::Result<T, BufferError>;
