//! Error types for the zork core library.

use thiserror::Error;

/// Result type alias using the zork core `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for zork operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A partial line grew past the configured limit without a delimiter.
    #[error("Signal exceeds {max} bytes without a newline")]
    SignalTooLong { max: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error from the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
