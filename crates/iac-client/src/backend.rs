//! The backend contract as a trait.

use std::future::Future;

use iac_model::{
    AiAnalysisResult, ArtifactReference, AuthenticityReport, KnownHashes, Metadata,
    SimulationResult, UploadResult,
};

use crate::error::Result;

/// Request/response contract of the analysis backend.
///
/// Every method is a single independent request. Implementations must not
/// retry on their own; retrying is always a new user-triggered call.
pub trait AnalysisBackend: Send + Sync + 'static {
    /// Upload the artifact and receive hashes, metadata and the ELA asset name.
    ///
    /// Blank known hashes are not sent.
    fn upload(
        &self,
        artifact: &ArtifactReference,
        known: &KnownHashes,
    ) -> impl Future<Output = Result<UploadResult>> + Send;

    /// Ask for an AI verdict on the given metadata, sent verbatim.
    fn analyze_metadata(
        &self,
        metadata: &Metadata,
    ) -> impl Future<Output = Result<AiAnalysisResult>> + Send;

    /// Score the authenticity of a previously uploaded file.
    fn verify_authenticity(
        &self,
        file_name: &str,
    ) -> impl Future<Output = Result<AuthenticityReport>> + Send;

    /// Re-run the consistency checks against edited metadata.
    fn simulate_metadata(
        &self,
        file_name: &str,
        edits: &Metadata,
    ) -> impl Future<Output = Result<SimulationResult>> + Send;

    /// Download the rendered ELA image.
    fn fetch_ela_asset(&self, ela_filename: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}
