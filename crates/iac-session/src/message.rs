//! Message types for session updates.
//!
//! Messages are organized hierarchically, one enum per stage, so each
//! controller only sees its own messages. `Finished` variants carry the
//! ticket their request was issued with.

use iac_client::ClientError;
use iac_model::{
    AiAnalysisResult, ArtifactReference, AuthenticityReport, KnownHashes, SimulationResult,
    UploadResult,
};

use crate::stage::Ticket;

/// Backend outcome carried back into the session.
pub type Outcome<T> = Result<T, ClientError>;

/// Root message enum for the session.
#[derive(Debug, Clone)]
pub enum Message {
    /// The user selected a file. Resets the session before it is committed.
    FileSelected(ArtifactReference),

    /// The known-hash inputs changed. Takes effect on the next upload.
    KnownHashesChanged(KnownHashes),

    Upload(UploadMessage),
    AiAnalysis(AiAnalysisMessage),
    Verification(VerificationMessage),
    Simulation(SimulationMessage),
}

#[derive(Debug, Clone)]
pub enum UploadMessage {
    Submit,
    Finished {
        ticket: Ticket,
        outcome: Outcome<UploadResult>,
    },
}

#[derive(Debug, Clone)]
pub enum AiAnalysisMessage {
    Run,
    Finished {
        ticket: Ticket,
        outcome: Outcome<AiAnalysisResult>,
    },
}

#[derive(Debug, Clone)]
pub enum VerificationMessage {
    Run,
    Finished {
        ticket: Ticket,
        outcome: Outcome<AuthenticityReport>,
    },
}

#[derive(Debug, Clone)]
pub enum SimulationMessage {
    /// Enter or leave simulation mode.
    Toggle,
    /// Overwrite one field of the draft with user text.
    EditField { key: String, value: String },
    Run,
    Finished {
        ticket: Ticket,
        outcome: Outcome<SimulationResult>,
    },
}

impl Message {
    pub fn select_file(artifact: ArtifactReference) -> Self {
        Self::FileSelected(artifact)
    }

    pub fn upload() -> Self {
        Self::Upload(UploadMessage::Submit)
    }

    pub fn run_ai_analysis() -> Self {
        Self::AiAnalysis(AiAnalysisMessage::Run)
    }

    pub fn run_verification() -> Self {
        Self::Verification(VerificationMessage::Run)
    }

    pub fn toggle_simulation() -> Self {
        Self::Simulation(SimulationMessage::Toggle)
    }

    pub fn edit_field(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Simulation(SimulationMessage::EditField {
            key: key.into(),
            value: value.into(),
        })
    }

    pub fn run_simulation() -> Self {
        Self::Simulation(SimulationMessage::Run)
    }
}
