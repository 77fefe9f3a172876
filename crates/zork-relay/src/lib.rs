//! Zork Signaling Relay Library
//!
//! Wires two zork peers together so they can negotiate a peer-to-peer
//! session:
//! - Connects to the getter and the giver over TCP
//! - Optionally injects configuration commands read from stdin
//! - Sends the `get` / `give` role handshake
//! - Forwards newline-delimited signals between the two until one closes

pub mod config;
pub mod endpoint;
pub mod error;
pub mod exit;
pub mod passthrough;
pub mod relay;

pub use config::{PeerAddr, RelayConfig};
pub use endpoint::{Endpoint, EndpointState, ReadOutcome, Role};
pub use error::RelayError;
pub use exit::ExitStatus;
pub use relay::{RelaySummary, SignalingRelay, Termination, run_session};
