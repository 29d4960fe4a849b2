//! Error types for recency

use std::fmt;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Rejected constructor argument (zero capacity)
    InvalidArgument(String),

    /// Key not present in the cache
    NotFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::NotFound => write!(f, "Key not found"),
        }
    }
}

impl std::error::Error for Error {}
