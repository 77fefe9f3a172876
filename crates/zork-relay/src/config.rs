//! Relay session configuration.

use std::fmt;
use std::time::Duration;

use zork_core::Settings;

/// Host and port of one zork peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddr {
    pub host: String,
    pub port: u16,
}

impl PeerAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Everything a relay session needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub getter: PeerAddr,
    pub giver: PeerAddr,
    /// Applied to each connect attempt separately.
    pub connect_timeout: Duration,
    pub max_signal_bytes: usize,
    /// Forward stdin lines to the getter before the handshake.
    pub stdin_passthrough: bool,
}

impl RelayConfig {
    pub fn new(getter: PeerAddr, giver: PeerAddr, settings: &Settings) -> Self {
        Self {
            getter,
            giver,
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            max_signal_bytes: settings.max_signal_bytes,
            stdin_passthrough: false,
        }
    }
}
