//! One side of a relay session.
//!
//! An [`Endpoint`] owns the stream to a single zork peer, read through a
//! [`FramedRead`] with the [`SignalCodec`] that reassembles lines across
//! reads.

use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_stream::StreamExt;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, trace, warn};

use zork_core::{Signal, SignalCodec};

use crate::config::PeerAddr;
use crate::error::RelayError;

/// Role a peer plays in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Requests a signal exchange; becomes the offerer.
    Getter,
    /// Supplies the counterpart signal; becomes the answerer.
    Giver,
}

impl Role {
    /// Command that puts a zork peer into this role.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Getter => "get",
            Self::Giver => "give",
        }
    }

    /// Exact handshake bytes sent right after connecting.
    pub const fn handshake(self) -> &'static [u8] {
        match self {
            Self::Getter => b"get\n",
            Self::Giver => b"give\n",
        }
    }

    /// The role on the other side of the relay.
    pub const fn peer(self) -> Self {
        match self {
            Self::Getter => Self::Giver,
            Self::Giver => Self::Getter,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Getter => "getter",
            Self::Giver => "giver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of an endpoint. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    Open,
    Closed,
}

/// Result of one read from a peer.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One complete line.
    Signal(Signal),
    /// The peer closed its side of the connection.
    Closed,
}

/// A duplex stream to one zork peer.
pub struct Endpoint<S> {
    role: Role,
    framed: FramedRead<S, SignalCodec>,
    state: EndpointState,
}

impl<S> Endpoint<S>
where
    S: AsyncRead,
{
    pub fn new(role: Role, stream: S, max_signal_bytes: usize) -> Self {
        Self {
            role,
            framed: FramedRead::new(stream, SignalCodec::new(max_signal_bytes)),
            state: EndpointState::Open,
        }
    }
}

impl<S> Endpoint<S> {
    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn state(&self) -> EndpointState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == EndpointState::Open
    }

    fn mark_closed(&mut self) {
        if self.state == EndpointState::Open {
            self.state = EndpointState::Closed;
            debug!(role = %self.role, "Endpoint closed");
        }
    }
}

impl<S> Endpoint<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wait for the next complete line from the peer.
    ///
    /// Cancel safe: bytes already read stay buffered in the codec, so the
    /// future can be dropped inside `tokio::select!`.
    pub async fn next_signal(&mut self) -> Result<ReadOutcome, RelayError> {
        match self.framed.next().await {
            Some(Ok(signal)) => {
                trace!(role = %self.role, bytes = signal.payload().len(), "Read signal");
                Ok(ReadOutcome::Signal(signal))
            }
            Some(Err(zork_core::Error::Io(source))) => {
                self.mark_closed();
                Err(RelayError::Read {
                    role: self.role,
                    source,
                })
            }
            Some(Err(source)) => Err(RelayError::Framing {
                role: self.role,
                source,
            }),
            None => {
                self.mark_closed();
                Ok(ReadOutcome::Closed)
            }
        }
    }

    /// Send the role handshake (`get\n` or `give\n`).
    pub async fn send_handshake(&mut self) -> Result<(), RelayError> {
        debug!(role = %self.role, token = self.role.token(), "Sending handshake");
        self.write_all(self.role.handshake()).await
    }

    /// Send one signal followed by a newline.
    pub async fn send_signal(&mut self, signal: &Signal) -> Result<(), RelayError> {
        debug!(role = %self.role, signal = %signal, "Sending signal");
        self.write_all(&signal.to_wire()).await
    }

    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), RelayError> {
        let role = self.role;
        let stream = self.framed.get_mut();
        stream
            .write_all(bytes)
            .await
            .map_err(|source| RelayError::Write { role, source })?;
        stream
            .flush()
            .await
            .map_err(|source| RelayError::Write { role, source })
    }
}

/// Open a TCP connection to the peer playing `role`.
///
/// Exactly one attempt is made.
pub async fn connect(
    role: Role,
    addr: &PeerAddr,
    timeout: Duration,
    max_signal_bytes: usize,
) -> Result<Endpoint<TcpStream>, RelayError> {
    info!(role = %role, addr = %addr, "Connecting to peer");

    let stream =
        match tokio::time::timeout(timeout, TcpStream::connect((addr.host.as_str(), addr.port)))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(RelayError::ConnectFailed {
                    role,
                    addr: addr.to_string(),
                    source,
                });
            }
            Err(_) => {
                return Err(RelayError::ConnectTimeout {
                    role,
                    addr: addr.to_string(),
                    timeout,
                });
            }
        };

    if let Err(e) = stream.set_nodelay(true) {
        warn!(role = %role, error = %e, "Failed to set TCP_NODELAY");
    }
    info!(role = %role, addr = %addr, "Connected to peer");

    Ok(Endpoint::new(role, stream, max_signal_bytes))
}
