//! Error types for driver operations.

use std::io;
use thiserror::Error;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors that can occur while talking to a database driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// An I/O error occurred on the underlying connection.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The database rejected the request or the wire protocol broke.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A parameter index was outside the statement's placeholder range.
    #[error("bind index {index} out of range: statement has {placeholders} placeholders")]
    BindOutOfRange {
        /// The 1-based index that was bound.
        index: usize,
        /// Number of `?` placeholders in the statement.
        placeholders: usize,
    },

    /// The resource was already closed.
    #[error("{resource} is closed")]
    Closed {
        /// Which kind of resource was used after close.
        resource: &'static str,
    },
}

impl DriverError {
    /// Creates a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Creates a closed-resource error.
    pub fn closed(resource: &'static str) -> Self {
        Self::Closed { resource }
    }
}
