//! Configuration Module
//!
//! Buffer sizing and invalidation parameters, loadable from environment
//! variables or any serde source.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BufferError, Result};

// == Defaults ==
/// Steady-state entry count a tidy pass trims back down to
pub const DEFAULT_TARGET_LENGTH: usize = 10;
/// Entry count above which a write triggers a tidy pass
pub const DEFAULT_CAPACITY: usize = 20;
/// Seconds an entry stays valid after its last access
pub const DEFAULT_TTL_SECONDS: f64 = 10.0;
/// Number of uses (the write included) an entry tolerates
pub const DEFAULT_ACCESS_LIMIT: i64 = 5;

/// Buffer configuration parameters.
///
/// Missing fields in a deserialized document fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Entry count a tidy pass trims back down to
    pub target_length: usize,
    /// Threshold entry count that triggers a tidy pass
    pub capacity: usize,
    /// Time-to-live in seconds, measured from the last access
    pub ttl_seconds: f64,
    /// Maximum access count before an entry turns invalid
    pub access_limit: i64,
}

impl BufferConfig {
    /// Creates a new BufferConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BUFFER_TARGET_LENGTH` - Target length (default: 10)
    /// - `BUFFER_CAPACITY` - Capacity threshold (default: 20)
    /// - `BUFFER_TTL_SECONDS` - TTL in seconds (default: 10)
    /// - `BUFFER_ACCESS_LIMIT` - Access limit (default: 5)
    ///
    /// Unparsable values are ignored. The result is not validated.
    pub fn from_env() -> Self {
        Self {
            target_length: env_or("BUFFER_TARGET_LENGTH", DEFAULT_TARGET_LENGTH),
            capacity: env_or("BUFFER_CAPACITY", DEFAULT_CAPACITY),
            ttl_seconds: env_or("BUFFER_TTL_SECONDS", DEFAULT_TTL_SECONDS),
            access_limit: env_or("BUFFER_ACCESS_LIMIT", DEFAULT_ACCESS_LIMIT),
        }
    }

    pub fn with_target_length(mut self, target_length: usize) -> Self {
        self.target_length = target_length;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: f64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_access_limit(mut self, access_limit: i64) -> Self {
        self.access_limit = access_limit;
        self
    }

    // == Validate ==
    /// Returns true iff every parameter is positive and capacity exceeds the
    /// target length.
    pub fn validate(&self) -> bool {
        self.violation().is_none()
    }

    /// Consumes the config, returning it back if valid.
    pub fn validated(self) -> Result<Self> {
        match self.violation() {
            Some(reason) => Err(BufferError::InvalidConfig(reason)),
            None => Ok(self),
        }
    }

    /// TTL as a Duration.
    ///
    /// TTLs too large for a Duration (including infinity) saturate to
    /// `Duration::MAX`; unrepresentable ones (NaN, negative) give zero.
    pub fn ttl(&self) -> Duration {
        if self.ttl_seconds.is_nan() || self.ttl_seconds <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.ttl_seconds).unwrap_or(Duration::MAX)
    }

    fn violation(&self) -> Option<String> {
        if self.target_length == 0 {
            return Some("target_length must be greater than 0".to_string());
        }
        if self.ttl_seconds.is_nan() || self.ttl_seconds <= 0.0 {
            return Some(format!(
                "ttl_seconds must be greater than 0, got {}",
                self.ttl_seconds
            ));
        }
        if self.access_limit <= 0 {
            return Some(format!(
                "access_limit must be greater than 0, got {}",
                self.access_limit
            ));
        }
        if self.capacity <= self.target_length {
            return Some(format!(
                "capacity ({}) must exceed target_length ({})",
                self.capacity, self.target_length
            ));
        }
        None
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            target_length: DEFAULT_TARGET_LENGTH,
            capacity: DEFAULT_CAPACITY,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            access_limit: DEFAULT_ACCESS_LIMIT,
        }
    }
}

fn env_or<V: FromStr>(name: &str, default: V) -> V {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
