//! Error taxonomy shared by the fetch service, the card, and the UI.
//!
//! Remote failures travel through the event bus as [`StatsError`] values.
//! When the card gives up on a cycle it wraps whatever it knows into an
//! [`ErrorDetail`]; every [`ErrorKind`] renders the same way, the kind only
//! changes how the failure is logged.

use thiserror::Error;

/// A failure reported by the remote stats API or the network below it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, …).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a structured error body.
    #[error("server error `{code}`: {message}")]
    Domain { code: String, message: String },
}

impl StatsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StatsError::Transport(_) => ErrorKind::Transport,
            StatsError::Domain { .. } => ErrorKind::Domain,
        }
    }
}

impl From<reqwest::Error> for StatsError {
    fn from(err: reqwest::Error) -> Self {
        StatsError::Transport(err.to_string())
    }
}

/// Why a cycle ended in the error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Domain,
    /// The payload was absent or not of the expected shape.
    MalformedResponse,
    /// A follow-up result arrived with no primary data to attach it to.
    InvalidLocalState,
}

/// What the presentation layer receives with an error state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    /// The remote error object, when the failure carried one.
    pub remote: Option<StatsError>,
}

impl ErrorDetail {
    pub fn remote(err: StatsError) -> Self {
        Self {
            kind: err.kind(),
            remote: Some(err),
        }
    }

    pub fn malformed() -> Self {
        Self {
            kind: ErrorKind::MalformedResponse,
            remote: None,
        }
    }

    pub fn invalid_local_state() -> Self {
        Self {
            kind: ErrorKind::InvalidLocalState,
            remote: None,
        }
    }
}
