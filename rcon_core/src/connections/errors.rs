use std::time::Duration;

use thiserror::Error;

/// A central error enum for remote-command failures.
#[derive(Debug, Error)]
pub enum RconError {
    #[error("authentication rejected by {0}")]
    AuthRejected(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no response within {0:?}")]
    TimedOut(Duration),
    #[error("connection closed by remote")]
    Closed,
    /// Rejected locally before anything is sent; the connection is untouched.
    #[error("command of {len} bytes exceeds the {limit} byte limit")]
    CommandTooLong { len: usize, limit: usize },
}

impl RconError {
    /// Credential and protocol failures mean the session can no longer be
    /// trusted. Network trouble and timeouts do not.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, RconError::AuthRejected(_) | RconError::Protocol(_))
    }
}
