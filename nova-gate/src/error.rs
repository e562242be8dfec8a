use std::time::Duration;

use thiserror::Error;

/// Failure to read from one of the external services.
///
/// Always recovered locally: the gate falls back to its absent-config policy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("backend request failed: {0}")]
    Backend(String),
    #[error("failed to decode guild config: {0}")]
    Decode(String),
    #[error("database query failed: {0}")]
    Database(String),
}

/// A guild configuration value outside the range the dashboard accepts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{field}` is {value}, expected {min}..={max}")]
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },
    #[error("`{field}` is {len} characters long, maximum is {max}")]
    TooLong { field: String, len: usize, max: usize },
}
