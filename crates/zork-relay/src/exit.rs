//! Process exit codes.

use std::process::ExitCode;

use crate::error::RelayError;

/// How the relay process ended.
///
/// Code 2 is left to clap, which exits with it on a bad command line before
/// any of these apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// A peer closed its connection.
    Clean,
    /// I/O, framing or stdin failure after connecting.
    RelayFailed,
    /// Could not reach a peer.
    ConnectFailed,
    /// Settings could not be loaded or were invalid.
    Config,
}

impl ExitStatus {
    pub const fn code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::RelayFailed => 1,
            Self::ConnectFailed => 3,
            Self::Config => 4,
        }
    }
}

impl From<&RelayError> for ExitStatus {
    fn from(err: &RelayError) -> Self {
        match err {
            RelayError::ConnectFailed { .. } | RelayError::ConnectTimeout { .. } => {
                Self::ConnectFailed
            }
            RelayError::Config(_) => Self::Config,
            RelayError::Read { .. }
            | RelayError::Write { .. }
            | RelayError::Framing { .. }
            | RelayError::Stdin(_) => Self::RelayFailed,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}
