//! Per-stage state machine.
//!
//! Every backend-facing stage moves through the same four states:
//!
//! ```text
//! Idle ──begin──▶ Pending(ticket) ──settle(ticket, Ok)──▶ Succeeded
//!  ▲                    │          └─settle(ticket, Err)─▶ Failed
//!  └────── clear ───────┘
//! ```
//!
//! `Succeeded` and `Failed` are terminal until the stage is started again or
//! cleared by an invalidation. Clearing a `Pending` stage makes any response
//! still in flight for it stale.

use std::fmt;

use serde::Serialize;

/// The four backend-facing stages of an analysis session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Upload,
    AiAnalysis,
    Verification,
    Simulation,
}

impl Stage {
    /// All stages in display order.
    pub const ALL: [Stage; 4] = [
        Stage::Upload,
        Stage::AiAnalysis,
        Stage::Verification,
        Stage::Simulation,
    ];

    /// Human-readable stage name.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Upload => "Upload",
            Stage::AiAnalysis => "AI metadata analysis",
            Stage::Verification => "Authenticity verification",
            Stage::Simulation => "Manipulation simulation",
        }
    }

    /// Generic message stored when the stage's request fails.
    ///
    /// Transport details are logged, never shown.
    pub fn failure_message(self) -> &'static str {
        match self {
            Stage::Upload => "Error uploading file. Ensure the backend is running.",
            Stage::AiAnalysis => "Failed to run AI metadata analysis.",
            Stage::Verification => "Failed to verify authenticity.",
            Stage::Simulation => "Failed to simulate manipulation.",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies one outstanding request.
///
/// `generation` is the artifact generation the request was issued for and
/// `sequence` is unique across the whole session, so a ticket never matches a
/// later request even for the same stage and artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    generation: u64,
    sequence: u64,
}

impl Ticket {
    pub(crate) fn new(generation: u64, sequence: u64) -> Self {
        Self {
            generation,
            sequence,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Payload-free summary of a [`StageState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// State of one stage slot.
#[derive(Debug, Clone, PartialEq)]
pub enum StageState<T> {
    /// Never started, or cleared by an invalidation.
    Idle,
    /// A request is in flight; only its ticket may settle the slot.
    Pending(Ticket),
    /// The last request succeeded.
    Succeeded(T),
    /// The last request failed; holds the message shown to the user.
    Failed(String),
}

impl<T> Default for StageState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> StageState<T> {
    pub fn status(&self) -> StageStatus {
        match self {
            Self::Idle => StageStatus::Idle,
            Self::Pending(_) => StageStatus::Pending,
            Self::Succeeded(_) => StageStatus::Succeeded,
            Self::Failed(_) => StageStatus::Failed,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            Self::Pending(ticket) => Some(*ticket),
            _ => None,
        }
    }

    /// Enter `Pending`, dropping any previous result or error.
    pub(crate) fn begin(&mut self, ticket: Ticket) {
        *self = Self::Pending(ticket);
    }

    /// Settle the slot with a response.
    ///
    /// Returns `false` and leaves the slot untouched when `ticket` is not the
    /// one the slot is waiting for.
    pub(crate) fn settle(&mut self, ticket: Ticket, outcome: Result<T, String>) -> bool {
        if self.ticket() != Some(ticket) {
            return false;
        }
        *self = match outcome {
            Ok(value) => Self::Succeeded(value),
            Err(message) => Self::Failed(message),
        };
        true
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::Idle;
    }
}
