//! Standard input passthrough.
//!
//! Lines given on stdin are zork commands (e.g. `transform with caesar`)
//! that must reach the getter before its role is set, since zork peers only
//! interpret commands until they receive `get` or `give`.

use std::io;

use tokio::io::AsyncRead;
use tokio_stream::StreamExt;
use tokio_util::codec::FramedRead;
use tracing::info;

use zork_core::{Signal, SignalCodec};

use crate::error::RelayError;

/// Read `input` to EOF and split it into signals.
///
/// Lines are kept verbatim, and a final line without a trailing newline is
/// kept too.
pub async fn read_passthrough<R>(
    input: R,
    max_signal_bytes: usize,
) -> Result<Vec<Signal>, RelayError>
where
    R: AsyncRead + Unpin,
{
    let codec = SignalCodec::new(max_signal_bytes).keep_unterminated();
    let mut lines = FramedRead::new(input, codec);
    let mut signals = Vec::new();

    while let Some(line) = lines.next().await {
        match line {
            Ok(signal) => signals.push(signal),
            Err(zork_core::Error::Io(e)) => return Err(RelayError::Stdin(e)),
            Err(e) => {
                return Err(RelayError::Stdin(io::Error::new(
                    io::ErrorKind::InvalidData,
                    e,
                )));
            }
        }
    }

    info!(lines = signals.len(), "Read passthrough input");
    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_every_line() {
        let input: &[u8] = b"transform with caesar\nping\n";
        let signals = read_passthrough(input, 1024).await.unwrap();
        assert_eq!(
            signals,
            vec![Signal::from("transform with caesar"), Signal::from("ping")]
        );
    }

    #[tokio::test]
    async fn keeps_unterminated_last_line() {
        let input: &[u8] = b"ping\r\n\nversion";
        let signals = read_passthrough(input, 1024).await.unwrap();
        assert_eq!(
            signals,
            vec![
                Signal::from("ping\r"),
                Signal::from(""),
                Signal::from("version")
            ]
        );
    }

    #[tokio::test]
    async fn empty_input_yields_nothing() {
        let input: &[u8] = b"";
        assert!(read_passthrough(input, 1024).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn over_long_line_is_rejected() {
        let input: &[u8] = b"transform with protean\n";
        let err = read_passthrough(input, 8).await.unwrap_err();
        assert!(matches!(err, RelayError::Stdin(_)));
    }
}
