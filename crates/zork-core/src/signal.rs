//! Newline-delimited signal framing.
//!
//! A [`Signal`] is one line of opaque signaling text: an SDP offer or answer,
//! an ICE candidate, or a zork command. Payloads are never interpreted and
//! need not be UTF-8; every byte between two delimiters is kept, including a
//! trailing `\r` and empty lines.
//!
//! [`SignalCodec`] keeps the bytes of a partial line across reads, so a line
//! split over several TCP segments is reassembled before it is yielded.

use std::fmt;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder};
use tracing::warn;

use crate::error::{Error, Result};

/// Line delimiter used on the wire.
pub const DELIMITER: u8 = b'\n';

/// Default upper bound for a single signal (1 MiB).
pub const DEFAULT_MAX_SIGNAL_BYTES: usize = 1024 * 1024;

/// One unit of signaling data, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal(Bytes);

impl Signal {
    /// Raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.0
    }

    /// Wire form of the signal: the payload followed by a single `\n`.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(self.0.len() + 1);
        wire.extend_from_slice(&self.0);
        wire.push(DELIMITER);
        wire
    }
}

impl From<&str> for Signal {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Signal {
    fn from(s: String) -> Self {
        Self(Bytes::from(s))
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Decoder splitting a byte stream into [`Signal`]s on `\n`.
///
/// A partial line longer than the configured maximum fails with
/// [`Error::SignalTooLong`]. Bytes left over at end of stream are dropped
/// unless [`SignalCodec::keep_unterminated`] is set.
#[derive(Debug)]
pub struct SignalCodec {
    inner: AnyDelimiterCodec,
    max_len: usize,
    keep_unterminated: bool,
}

impl Default for SignalCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIGNAL_BYTES)
    }
}

impl SignalCodec {
    /// Create a codec that rejects lines longer than `max_len` bytes.
    pub fn new(max_len: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(
                vec![DELIMITER],
                vec![DELIMITER],
                max_len,
            ),
            max_len,
            keep_unterminated: false,
        }
    }

    /// Yield a final line that lacks its newline at end of stream.
    #[must_use]
    pub const fn keep_unterminated(mut self) -> Self {
        self.keep_unterminated = true;
        self
    }
}

impl Decoder for SignalCodec {
    type Item = Signal;
    type Error = Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Signal>> {
        match self.inner.decode(buf) {
            Ok(frame) => Ok(frame.map(Signal)),
            Err(AnyDelimiterCodecError::Io(e)) => Err(Error::Io(e)),
            Err(_) => Err(Error::SignalTooLong { max: self.max_len }),
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Signal>> {
        if let Some(signal) = self.decode(buf)? {
            return Ok(Some(signal));
        }
        if buf.is_empty() {
            return Ok(None);
        }
        let tail = buf.split().freeze();
        if self.keep_unterminated {
            return Ok(Some(Signal(tail)));
        }
        warn!(bytes = tail.len(), "Discarding unterminated line at close");
        Ok(None)
    }
}
