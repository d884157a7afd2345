//! Derived-view projection.
//!
//! [`project`] is a pure function of the [`SessionStore`]. Every panel is an
//! `Option` that is `Some` exactly when the panel is renderable, so callers
//! never re-derive visibility rules themselves.

use iac_model::{
    FLAGS_KEY, KnownHashes, MISSING_VALUE, Metadata, RiskLevel, SIMULATED_FLAGS_KEY,
    SimulationDraft, SimulationResult, UploadResult, display_value, shallow_ne,
};
use serde::Serialize;

use crate::stage::{Stage, StageStatus};
use crate::store::SessionStore;

/// Styling level of a banner or indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

/// Map a risk level to its banner severity. Unknown levels are not alarming.
pub fn risk_severity(level: &RiskLevel) -> Severity {
    match level {
        RiskLevel::High => Severity::Danger,
        RiskLevel::Medium => Severity::Warning,
        RiskLevel::Low | RiskLevel::Unrecognized(_) => Severity::Success,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSummary {
    pub stage: Stage,
    pub status: StageStatus,
    pub error: Option<String>,
}

/// Which user actions are currently enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Actions {
    pub upload: bool,
    pub ai_analysis: bool,
    pub verification: bool,
    pub toggle_simulation: bool,
    pub edit_draft: bool,
    pub run_simulation: bool,
}

/// Comparison of a computed hash against the user's known value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashIndicator {
    pub matched: bool,
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashPanel {
    pub sha256: String,
    pub md5: String,
    pub sha256_match: Option<HashIndicator>,
    pub md5_match: Option<HashIndicator>,
    /// Whether the backend digest equals the one computed before sending.
    pub transfer_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRow {
    pub field: String,
    pub value: String,
    pub missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataPanel {
    pub rows: Vec<MetadataRow>,
    pub missing_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiPanel {
    pub confidence_score: f64,
    pub verdict: String,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationPanel {
    pub score: f64,
    pub risk_level: String,
    pub severity: Severity,
    pub flags: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftField {
    pub key: String,
    pub value: String,
}

/// The simulation edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationPanel {
    pub fields: Vec<DraftField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub field: String,
    pub original: String,
    pub simulated: String,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub severity: Severity,
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationResultsPanel {
    pub rows: Vec<ComparisonRow>,
    pub banner: Banner,
}

/// Everything renderable for the current session state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub file_name: Option<String>,
    pub ready: bool,
    pub stages: Vec<StageSummary>,
    pub actions: Actions,
    pub hashes: Option<HashPanel>,
    pub metadata: Option<MetadataPanel>,
    pub warnings: Option<Vec<String>>,
    pub ela_asset: Option<String>,
    pub ai_analysis: Option<AiPanel>,
    pub verification: Option<VerificationPanel>,
    pub simulation: Option<SimulationPanel>,
    pub simulation_results: Option<SimulationResultsPanel>,
}

impl SessionView {
    pub fn is_metadata_visible(&self) -> bool {
        self.metadata.is_some()
    }

    pub fn are_warnings_visible(&self) -> bool {
        self.warnings.is_some()
    }

    pub fn is_ai_panel_visible(&self) -> bool {
        self.ai_analysis.is_some()
    }

    pub fn is_verification_panel_visible(&self) -> bool {
        self.verification.is_some()
    }

    pub fn is_simulation_panel_visible(&self) -> bool {
        self.simulation.is_some()
    }

    pub fn is_simulation_results_visible(&self) -> bool {
        self.simulation_results.is_some()
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageSummary> {
        self.stages.iter().find(|summary| summary.stage == stage)
    }

    /// Stages whose last attempt failed.
    pub fn failed_stages(&self) -> impl Iterator<Item = &StageSummary> {
        self.stages
            .iter()
            .filter(|summary| summary.status == StageStatus::Failed)
    }
}

/// Compute the view for the current store.
pub fn project(store: &SessionStore) -> SessionView {
    let upload = store.upload_result();
    let metadata = store.metadata();
    let simulation = store.simulation();

    SessionView {
        file_name: store.artifact().map(|artifact| artifact.name().to_string()),
        ready: store.is_ready(),
        stages: Stage::ALL
            .into_iter()
            .map(|stage| StageSummary {
                stage,
                status: store.status(stage),
                error: store.error(stage).map(str::to_string),
            })
            .collect(),
        actions: actions(store),
        hashes: upload.map(|result| {
            hash_panel(
                result,
                store.known_hashes(),
                store.artifact().map(|artifact| artifact.local_sha256()),
            )
        }),
        metadata: metadata.map(metadata_panel),
        warnings: metadata.map(Metadata::flags).filter(|flags| !flags.is_empty()),
        ela_asset: upload
            .filter(|result| !result.ela_filename.is_empty())
            .map(UploadResult::ela_asset_path),
        ai_analysis: store.ai_analysis().result().map(|result| AiPanel {
            confidence_score: result.confidence_score,
            verdict: result.verdict.clone(),
            evidence: result.evidence.clone(),
        }),
        verification: store
            .verification()
            .result()
            .map(|report| VerificationPanel {
                score: report.score,
                risk_level: report.risk_level.to_string(),
                severity: risk_severity(&report.risk_level),
                flags: report.flags.clone(),
                recommendation: report.recommendation.clone(),
            }),
        simulation: simulation
            .draft()
            .zip(metadata)
            .map(|(draft, metadata)| simulation_panel(draft, metadata)),
        simulation_results: simulation.run().result().map(simulation_results_panel),
    }
}

fn actions(store: &SessionStore) -> Actions {
    let ready = store.is_ready();
    let idle = |stage| !store.is_busy(stage);
    let simulating = store.simulation().is_active();
    Actions {
        upload: store.artifact().is_some() && idle(Stage::Upload),
        ai_analysis: ready && idle(Stage::AiAnalysis),
        verification: ready && idle(Stage::Verification),
        toggle_simulation: ready,
        edit_draft: simulating,
        run_simulation: ready && simulating && idle(Stage::Simulation),
    }
}

fn hash_panel(result: &UploadResult, known: &KnownHashes, local_sha256: Option<&str>) -> HashPanel {
    HashPanel {
        sha256: result.sha256.clone(),
        md5: result.md5.clone(),
        sha256_match: indicator("SHA-256", result.sha_match, known.sha256()),
        md5_match: indicator("MD5", result.md5_match, known.md5()),
        transfer_verified: local_sha256
            .is_some_and(|local| local.eq_ignore_ascii_case(&result.sha256)),
    }
}

fn indicator(algorithm: &str, matched: Option<bool>, known: Option<&str>) -> Option<HashIndicator> {
    // Known hashes can change after the upload; only show a verdict the user
    // still has an input for.
    if known.is_none() {
        return None;
    }
    let matched = matched?;
    let (severity, text) = if matched {
        (Severity::Success, format!("{algorithm} matches the known hash."))
    } else {
        (Severity::Danger, format!("{algorithm} does not match the known hash."))
    };
    Some(HashIndicator {
        matched,
        severity,
        text,
    })
}

fn metadata_panel(metadata: &Metadata) -> MetadataPanel {
    MetadataPanel {
        rows: metadata
            .fields()
            .map(|(field, value)| {
                let value = display_value(value);
                MetadataRow {
                    field: field.to_string(),
                    missing: value == MISSING_VALUE,
                    value,
                }
            })
            .collect(),
        missing_fields: metadata
            .missing_fields()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

fn simulation_panel(draft: &SimulationDraft, metadata: &Metadata) -> SimulationPanel {
    SimulationPanel {
        fields: metadata
            .fields()
            .map(|(key, _)| DraftField {
                key: key.to_string(),
                value: draft.field_text(key),
            })
            .collect(),
    }
}

fn simulation_results_panel(result: &SimulationResult) -> SimulationResultsPanel {
    let rows = result
        .simulated_metadata
        .as_map()
        .iter()
        .filter(|(key, _)| key.as_str() != SIMULATED_FLAGS_KEY && key.as_str() != FLAGS_KEY)
        .map(|(key, simulated)| {
            let original = result.original_metadata.get(key);
            ComparisonRow {
                field: key.clone(),
                original: original.map(display_value).unwrap_or_default(),
                simulated: display_value(simulated),
                changed: shallow_ne(original, simulated),
            }
        })
        .collect();

    let banner = if result.simulated_flags.is_empty() {
        Banner {
            severity: Severity::Success,
            title: "No suspicious metadata detected.".to_string(),
            items: Vec::new(),
        }
    } else {
        Banner {
            severity: Severity::Warning,
            title: "Detected manipulation warnings".to_string(),
            items: result.simulated_flags.clone(),
        }
    };

    SimulationResultsPanel { rows, banner }
}
