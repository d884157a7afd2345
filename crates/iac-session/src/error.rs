//! Session error types.

use iac_client::ClientError;
use thiserror::Error;

use crate::stage::Stage;

/// Result type for session updates.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Why a session update was rejected or a stage failed.
///
/// Rejections (`Validation`, `Busy`, `Precondition`) never reach the backend.
/// `Transport` wraps a failed backend call; its `Display` is the generic
/// per-stage message, the underlying [`ClientError`] is kept as the source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    /// Upload was requested with no file selected.
    #[error("Please select a file first.")]
    Validation,

    /// The stage already has a request in flight.
    #[error("{0} is already running")]
    Busy(Stage),

    /// The stage cannot run in the current session state.
    #[error("{stage} is unavailable: {reason}")]
    Precondition { stage: Stage, reason: &'static str },

    /// The backend request for the stage failed.
    #[error("{}", .stage.failure_message())]
    Transport { stage: Stage, source: ClientError },
}

impl SessionError {
    pub(crate) fn precondition(stage: Stage, reason: &'static str) -> Self {
        Self::Precondition { stage, reason }
    }

    /// The stage the error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation => Stage::Upload,
            Self::Busy(stage) => *stage,
            Self::Precondition { stage, .. } | Self::Transport { stage, .. } => *stage,
        }
    }
}
