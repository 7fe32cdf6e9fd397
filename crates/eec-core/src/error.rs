//! Core error types.

use thiserror::Error;

/// Dispatcher errors.
///
/// Only the validating registration path produces these; `on`, `off`, `has`
/// and `emit` never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Channel name was empty.
    #[error("channel name cannot be empty")]
    EmptyChannel,

    /// Event name was empty.
    #[error("event name cannot be empty")]
    EmptyEvent,

    /// A name exceeded the configured maximum length.
    #[error("{field} name is {len} bytes, maximum is {max}")]
    NameTooLong {
        /// Which name was rejected ("channel" or "event").
        field: &'static str,
        /// Actual length in bytes.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Result alias for dispatcher operations.
pub type Result<T> = std::result::Result<T, Error>;
