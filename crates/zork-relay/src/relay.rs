//! The signaling relay loop.
//!
//! Sends the role handshake to both peers, then forwards every complete
//! line from one peer to the other until either side closes. Both streams
//! are polled from a single task; nothing runs in parallel.

use std::fmt;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use zork_core::Signal;

use crate::config::RelayConfig;
use crate::endpoint::{self, Endpoint, ReadOutcome, Role};
use crate::error::RelayError;
use crate::passthrough::read_passthrough;

/// Why a relay session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    GetterClosed,
    GiverClosed,
}

impl Termination {
    const fn closed_by(role: Role) -> Self {
        match role {
            Role::Getter => Self::GetterClosed,
            Role::Giver => Self::GiverClosed,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GetterClosed => "getter_closed",
            Self::GiverClosed => "giver_closed",
        })
    }
}

/// Outcome of a session that ended with a peer closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySummary {
    pub termination: Termination,
    pub getter_to_giver: u64,
    pub giver_to_getter: u64,
}

/// Relay between a getter endpoint and a giver endpoint.
pub struct SignalingRelay<G, V> {
    getter: Endpoint<G>,
    giver: Endpoint<V>,
    getter_to_giver: u64,
    giver_to_getter: u64,
}

impl<G, V> SignalingRelay<G, V>
where
    G: AsyncRead + AsyncWrite + Unpin,
    V: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(getter: Endpoint<G>, giver: Endpoint<V>) -> Self {
        debug_assert_eq!(getter.role(), Role::Getter);
        debug_assert_eq!(giver.role(), Role::Giver);
        Self {
            getter,
            giver,
            getter_to_giver: 0,
            giver_to_getter: 0,
        }
    }

    /// Write raw commands to the getter ahead of the handshake.
    pub async fn inject(&mut self, commands: &[Signal]) -> Result<(), RelayError> {
        for command in commands {
            info!(command = %command, "Forwarding passthrough command to getter");
            self.getter.send_signal(command).await?;
        }
        Ok(())
    }

    /// Run the session to completion.
    ///
    /// Returns `Ok` when a peer closes its connection; any I/O or framing
    /// failure ends the session with an error.
    pub async fn run(mut self) -> Result<RelaySummary, RelayError> {
        self.getter.send_handshake().await?;
        self.giver.send_handshake().await?;
        info!("Handshake sent, relaying signals");

        let termination = loop {
            let (from, outcome) = tokio::select! {
                outcome = self.getter.next_signal() => (Role::Getter, outcome),
                outcome = self.giver.next_signal() => (Role::Giver, outcome),
            };

            let signal = match outcome? {
                ReadOutcome::Signal(signal) => signal,
                ReadOutcome::Closed => break Termination::closed_by(from),
            };

            match from {
                Role::Getter => {
                    self.giver.send_signal(&signal).await?;
                    self.getter_to_giver += 1;
                }
                Role::Giver => {
                    self.getter.send_signal(&signal).await?;
                    self.giver_to_getter += 1;
                }
            }
            debug!(from = %from, to = %from.peer(), "Forwarded signal");
        };

        let summary = RelaySummary {
            termination,
            getter_to_giver: self.getter_to_giver,
            giver_to_getter: self.giver_to_getter,
        };
        info!(
            reason = %summary.termination,
            getter_to_giver = summary.getter_to_giver,
            giver_to_getter = summary.giver_to_getter,
            "Relay terminated"
        );
        Ok(summary)
    }
}

/// Connect both peers and relay between them.
///
/// `stdin` is read to EOF and forwarded to the getter before the handshake
/// when `config.stdin_passthrough` is set; it is ignored otherwise.
pub async fn run_session<R>(
    config: &RelayConfig,
    stdin: R,
) -> Result<RelaySummary, RelayError>
where
    R: AsyncRead + Unpin,
{
    let getter = endpoint::connect(
        Role::Getter,
        &config.getter,
        config.connect_timeout,
        config.max_signal_bytes,
    )
    .await?;
    let giver = endpoint::connect(
        Role::Giver,
        &config.giver,
        config.connect_timeout,
        config.max_signal_bytes,
    )
    .await?;

    let mut relay = SignalingRelay::new(getter, giver);
    if config.stdin_passthrough {
        let commands = read_passthrough(stdin, config.max_signal_bytes).await?;
        relay.inject(&commands).await?;
    }
    relay.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream, duplex};

    type Peer = BufReader<DuplexStream>;

    fn relay_pair(max: usize) -> (SignalingRelay<DuplexStream, DuplexStream>, Peer, Peer) {
        let (getter_local, getter_remote) = duplex(4096);
        let (giver_local, giver_remote) = duplex(4096);
        let relay = SignalingRelay::new(
            Endpoint::new(Role::Getter, getter_local, max),
            Endpoint::new(Role::Giver, giver_local, max),
        );
        (
            relay,
            BufReader::new(getter_remote),
            BufReader::new(giver_remote),
        )
    }

    async fn next_line(peer: &mut Peer) -> String {
        let mut line = String::new();
        peer.read_line(&mut line).await.unwrap();
        line
    }

    #[tokio::test]
    async fn handshake_comes_first() {
        let (relay, mut getter, mut giver) = relay_pair(1024);
        let handle = tokio::spawn(relay.run());

        assert_eq!(next_line(&mut getter).await, "get\n");
        assert_eq!(next_line(&mut giver).await, "give\n");

        drop(getter);
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.termination, Termination::GetterClosed);
    }

    #[tokio::test]
    async fn forwards_both_directions_in_order() {
        let (relay, mut getter, mut giver) = relay_pair(1024);
        let handle = tokio::spawn(relay.run());
        next_line(&mut getter).await;
        next_line(&mut giver).await;

        getter
            .write_all(b"{\"type\":\"offer\",\"sdp\":\"v=0\"}\n")
            .await
            .unwrap();
        getter.write_all(b"candidate-1\n").await.unwrap();
        assert_eq!(
            next_line(&mut giver).await,
            "{\"type\":\"offer\",\"sdp\":\"v=0\"}\n"
        );
        assert_eq!(next_line(&mut giver).await, "candidate-1\n");

        giver
            .write_all(b"{\"type\":\"answer\",\"sdp\":\"v=0\"}\n")
            .await
            .unwrap();
        assert_eq!(
            next_line(&mut getter).await,
            "{\"type\":\"answer\",\"sdp\":\"v=0\"}\n"
        );

        drop(giver);
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(
            summary,
            RelaySummary {
                termination: Termination::GiverClosed,
                getter_to_giver: 2,
                giver_to_getter: 1,
            }
        );
    }

    #[tokio::test]
    async fn getter_close_ends_cleanly_without_forwarding() {
        let (relay, mut getter, mut giver) = relay_pair(1024);
        let handle = tokio::spawn(relay.run());
        assert_eq!(next_line(&mut getter).await, "get\n");
        drop(getter);

        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.termination, Termination::GetterClosed);
        assert_eq!(summary.getter_to_giver, 0);

        let mut rest = String::new();
        giver.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "give\n");
    }

    #[tokio::test]
    async fn split_line_is_forwarded_whole() {
        let (relay, mut getter, mut giver) = relay_pair(1024);
        let handle = tokio::spawn(relay.run());
        next_line(&mut giver).await;

        getter.write_all(b"AB").await.unwrap();
        tokio::task::yield_now().await;
        getter.write_all(b"CD\n").await.unwrap();
        drop(getter);

        handle.await.unwrap().unwrap();
        let mut rest = String::new();
        giver.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "ABCD\n");
    }

    #[tokio::test]
    async fn multi_line_chunk_is_split() {
        let (relay, mut getter, mut giver) = relay_pair(1024);
        let handle = tokio::spawn(relay.run());
        next_line(&mut giver).await;

        getter.write_all(b"X\nY\nZ\n").await.unwrap();
        assert_eq!(next_line(&mut giver).await, "X\n");
        assert_eq!(next_line(&mut giver).await, "Y\n");
        assert_eq!(next_line(&mut giver).await, "Z\n");

        drop(getter);
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.getter_to_giver, 3);
    }

    #[tokio::test]
    async fn no_echo_back_to_sender() {
        let (relay, mut getter, mut giver) = relay_pair(1024);
        let handle = tokio::spawn(relay.run());
        next_line(&mut giver).await;

        getter.write_all(b"offer\n").await.unwrap();
        assert_eq!(next_line(&mut giver).await, "offer\n");
        drop(giver);
        handle.await.unwrap().unwrap();

        let mut seen = String::new();
        getter.read_to_string(&mut seen).await.unwrap();
        assert_eq!(seen, "get\n");
    }

    #[tokio::test]
    async fn injected_commands_precede_handshake() {
        let (mut relay, mut getter, mut giver) = relay_pair(1024);
        relay
            .inject(&[Signal::from("transform with caesar")])
            .await
            .unwrap();
        let handle = tokio::spawn(relay.run());

        assert_eq!(next_line(&mut getter).await, "transform with caesar\n");
        assert_eq!(next_line(&mut getter).await, "get\n");
        assert_eq!(next_line(&mut giver).await, "give\n");

        drop(giver);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn carriage_returns_and_blank_lines_pass_through() {
        let (relay, mut getter, mut giver) = relay_pair(1024);
        let handle = tokio::spawn(relay.run());
        next_line(&mut getter).await;

        getter.write_all(b"abc\r\n\nnext\n").await.unwrap();
        drop(getter);

        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.getter_to_giver, 3);

        let mut seen = Vec::new();
        giver.read_to_end(&mut seen).await.unwrap();
        assert_eq!(seen, b"give\nabc\r\n\nnext\n");
    }

    #[tokio::test]
    async fn over_long_signal_fails_the_session() {
        let (relay, mut getter, _giver) = relay_pair(8);
        let handle = tokio::spawn(relay.run());
        next_line(&mut getter).await;

        getter.write_all(b"way more than eight bytes").await.unwrap();
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            RelayError::Framing {
                role: Role::Getter,
                ..
            }
        ));
    }
}
