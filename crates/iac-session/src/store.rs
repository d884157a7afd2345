//! The session state store.
//!
//! The store is the single owner of session state. Readers get shared
//! accessors; only controllers inside this crate mutate it, each touching its
//! own slot (plus whatever [`crate::invalidation`] clears on its behalf).

use iac_model::{
    AiAnalysisResult, ArtifactReference, AuthenticityReport, KnownHashes, Metadata,
    SimulationDraft, SimulationResult, UploadResult,
};

use crate::invalidation::{self, Invalidation};
use crate::stage::{Stage, StageState, StageStatus, Ticket};

/// Simulation mode: the editable draft plus the last run.
///
/// Mode is active exactly when a draft exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationState {
    pub(crate) draft: Option<SimulationDraft>,
    pub(crate) run: StageState<SimulationResult>,
}

impl SimulationState {
    pub fn is_active(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&SimulationDraft> {
        self.draft.as_ref()
    }

    pub fn run(&self) -> &StageState<SimulationResult> {
        &self.run
    }
}

/// All state of one analysis session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStore {
    artifact: Option<ArtifactReference>,
    generation: u64,
    next_sequence: u64,
    known_hashes: KnownHashes,
    pub(crate) upload: StageState<UploadResult>,
    pub(crate) ai_analysis: StageState<AiAnalysisResult>,
    pub(crate) verification: StageState<AuthenticityReport>,
    pub(crate) simulation: SimulationState,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently selected file, if any.
    pub fn artifact(&self) -> Option<&ArtifactReference> {
        self.artifact.as_ref()
    }

    /// Incremented every time a new file is committed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn known_hashes(&self) -> &KnownHashes {
        &self.known_hashes
    }

    pub fn upload(&self) -> &StageState<UploadResult> {
        &self.upload
    }

    pub fn ai_analysis(&self) -> &StageState<AiAnalysisResult> {
        &self.ai_analysis
    }

    pub fn verification(&self) -> &StageState<AuthenticityReport> {
        &self.verification
    }

    pub fn simulation(&self) -> &SimulationState {
        &self.simulation
    }

    /// The upload result, present once the session is ready.
    pub fn upload_result(&self) -> Option<&UploadResult> {
        self.upload.result()
    }

    /// Metadata extracted by the last successful upload.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.upload_result().map(|result| &result.metadata)
    }

    /// Whether the dependent stages may run.
    pub fn is_ready(&self) -> bool {
        self.upload.is_succeeded()
    }

    pub fn status(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Upload => self.upload.status(),
            Stage::AiAnalysis => self.ai_analysis.status(),
            Stage::Verification => self.verification.status(),
            Stage::Simulation => self.simulation.run.status(),
        }
    }

    pub fn is_busy(&self, stage: Stage) -> bool {
        self.status(stage) == StageStatus::Pending
    }

    /// The user-facing error recorded for a stage.
    pub fn error(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Upload => self.upload.error(),
            Stage::AiAnalysis => self.ai_analysis.error(),
            Stage::Verification => self.verification.error(),
            Stage::Simulation => self.simulation.run.error(),
        }
    }

    /// Number of stages waiting on the backend.
    pub fn pending_count(&self) -> usize {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.is_busy(*stage))
            .count()
    }

    /// Clear the artifact and every entity derived from it.
    ///
    /// Known hashes are user input and are kept.
    pub(crate) fn reset(&mut self) {
        invalidation::apply(self, Invalidation::ArtifactChanged);
    }

    /// Replace the artifact, discarding everything derived from the old one.
    pub(crate) fn commit_artifact(&mut self, artifact: ArtifactReference) {
        self.reset();
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            file_name = artifact.name(),
            bytes = artifact.len(),
            "artifact committed"
        );
        self.artifact = Some(artifact);
    }

    pub(crate) fn set_known_hashes(&mut self, known_hashes: KnownHashes) {
        self.known_hashes = known_hashes;
    }

    /// Issue a ticket for a new request against the current artifact.
    pub(crate) fn issue_ticket(&mut self) -> Ticket {
        self.next_sequence += 1;
        Ticket::new(self.generation, self.next_sequence)
    }

    /// Record a validation failure in the upload slot.
    pub(crate) fn reject_upload(&mut self, message: &str) {
        self.upload = StageState::Failed(message.to_string());
    }

    pub(crate) fn clear_artifact(&mut self) {
        self.artifact = None;
    }
}
