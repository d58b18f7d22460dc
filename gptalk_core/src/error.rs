//! Failure taxonomy shared by every remote operation.

use thiserror::Error;

/// Closed set of ways a remote call can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    TransportError,
    ServiceRejected,
    EmptyResponse,
}

/// Error returned by every dispatched operation.
///
/// The variants never overlap: a transport failure means no response was
/// received, a rejection means the service answered with a non-success
/// status, and an empty response means the service answered successfully
/// without anything to extract.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),

    #[error("service rejected request with status {status}: {payload}")]
    ServiceRejected { status: u16, payload: String },

    #[error("service returned no usable content")]
    EmptyResponse,
}

impl ClientError {
    pub fn transport(err: impl Into<anyhow::Error>) -> Self {
        Self::Transport(err.into())
    }

    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::TransportError,
            Self::ServiceRejected { .. } => FailureKind::ServiceRejected,
            Self::EmptyResponse => FailureKind::EmptyResponse,
        }
    }

    /// HTTP status of a rejected request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ServiceRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised when importing turns into a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history cannot store a system turn (found at index {index})")]
    SystemTurn { index: usize },
}
