//! Zork Core Library
//!
//! Shared functionality for the zork signaling relay:
//! - `Signal` type and the newline `SignalCodec`
//! - Settings resolution (defaults, settings file, environment)
//! - Common error types
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod signal;
pub mod tracing_init;

pub use config::Settings;
pub use error::{Error, Result};
pub use signal::{Signal, SignalCodec};
