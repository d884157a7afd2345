//! Request and response bodies of the analysis backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

// =============================================================================
// UPLOAD
// =============================================================================

/// Optional reference digests supplied by the user.
///
/// These are request parameters only; the comparison happens on the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownHashes {
    pub sha256: Option<String>,
    pub md5: Option<String>,
}

impl KnownHashes {
    pub fn new(sha256: Option<String>, md5: Option<String>) -> Self {
        Self { sha256, md5 }
    }

    /// Trimmed SHA-256, or `None` when blank.
    pub fn sha256(&self) -> Option<&str> {
        non_blank(self.sha256.as_deref())
    }

    /// Trimmed MD5, or `None` when blank.
    pub fn md5(&self) -> Option<&str> {
        non_blank(self.md5.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Response of `POST /upload`.
///
/// `sha_match`/`md5_match` are only present when the matching known hash was
/// submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub sha256: String,
    pub md5: String,
    #[serde(default)]
    pub sha_match: Option<bool>,
    #[serde(default)]
    pub md5_match: Option<bool>,
    pub metadata: Metadata,
    pub ela_filename: String,
}

impl UploadResult {
    /// Backend-relative path of the rendered ELA image.
    pub fn ela_asset_path(&self) -> String {
        format!("/uploads/{}", self.ela_filename)
    }
}

// =============================================================================
// AI METADATA ANALYSIS
// =============================================================================

/// Body of `POST /ai-analyze-metadata`.
#[derive(Debug, Serialize)]
pub struct AiAnalysisRequest<'a> {
    pub metadata: &'a Metadata,
}

/// AI-assisted metadata forgery verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysisResult {
    /// Confidence in the verdict, 0 to 100.
    pub confidence_score: f64,
    pub verdict: String,
    #[serde(default)]
    pub evidence: Vec<String>,
}

// =============================================================================
// AUTHENTICITY VERIFICATION
// =============================================================================

/// Body of `POST /verify-authenticity`.
#[derive(Debug, Serialize)]
pub struct VerificationRequest<'a> {
    pub file_name: &'a str,
}

/// Heuristic authenticity score for an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticityReport {
    /// Authenticity score, 0 to 100.
    #[serde(rename = "authenticity_score")]
    pub score: f64,
    #[serde(default)]
    pub flags: Vec<String>,
    pub risk_level: RiskLevel,
    pub recommendation: String,
}

/// Risk classification reported by the verification endpoint.
///
/// Unknown labels are preserved so they can still be shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unrecognized(String),
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Unrecognized(label) => label,
        }
    }
}

impl From<String> for RiskLevel {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Low" => Self::Low,
            "Medium" => Self::Medium,
            "High" => Self::High,
            _ => Self::Unrecognized(label),
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Unrecognized(label) => label,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// MANIPULATION SIMULATION
// =============================================================================

/// Body of `POST /simulate-metadata`.
#[derive(Debug, Serialize)]
pub struct SimulationRequest<'a> {
    pub file_name: &'a str,
    pub edits: &'a Metadata,
}

/// Outcome of re-running the consistency checks on edited metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub original_metadata: Metadata,
    pub simulated_metadata: Metadata,
    #[serde(default)]
    pub simulated_flags: Vec<String>,
}
