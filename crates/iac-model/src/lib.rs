//! Data model for the Image Authenticity Checker.
//!
//! These types mirror the JSON contract of the analysis backend. Field names
//! on the wire are kept exactly as the backend emits them.

pub mod analysis;
pub mod artifact;
pub mod error;
pub mod metadata;

pub use analysis::{
    AiAnalysisRequest, AiAnalysisResult, AuthenticityReport, KnownHashes, RiskLevel,
    SimulationRequest, SimulationResult, UploadResult, VerificationRequest,
};
pub use artifact::ArtifactReference;
pub use error::{ModelError, Result};
pub use metadata::{
    FLAGS_KEY, MISSING_VALUE, Metadata, SIMULATED_FLAGS_KEY, SimulationDraft, display_value,
    shallow_ne,
};
