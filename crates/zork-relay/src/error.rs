//! Relay error types.

use std::time::Duration;

use crate::endpoint::Role;

/// Errors that terminate a relay session.
///
/// An orderly peer close is not an error; it ends the session through
/// [`crate::Termination`].
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Failed to connect to {role} at {addr}: {source}")]
    ConnectFailed {
        role: Role,
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {timeout:?} connecting to {role} at {addr}")]
    ConnectTimeout {
        role: Role,
        addr: String,
        timeout: Duration,
    },

    #[error("Read from {role} failed: {source}")]
    Read {
        role: Role,
        #[source]
        source: std::io::Error,
    },

    #[error("Write to {role} failed: {source}")]
    Write {
        role: Role,
        #[source]
        source: std::io::Error,
    },

    #[error("Bad framing from {role}: {source}")]
    Framing {
        role: Role,
        #[source]
        source: zork_core::Error,
    },

    #[error("Reading passthrough input failed: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[source] zork_core::Error),
}
