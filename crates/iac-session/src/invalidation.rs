//! Reset and invalidation policy.
//!
//! Each [`Invalidation`] names an event; [`Invalidation::clears`] is the table
//! of slots that become meaningless when it happens. Clearing a pending slot
//! detaches its in-flight request, whose response is then discarded as stale.
//!
//! | Event                   | Cleared slots                                   |
//! |-------------------------|-------------------------------------------------|
//! | `ArtifactChanged`       | artifact, upload, AI, verification, draft, run  |
//! | `UploadStarted`         | AI, verification, draft, run                    |
//! | `SimulationModeEntered` | run                                             |
//! | `SimulationModeExited`  | draft, run                                      |
//!
//! Known hashes are user input, not derived state, and survive every event.

use serde::Serialize;

use crate::store::SessionStore;

/// A piece of session state that can be cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Artifact,
    Upload,
    AiAnalysis,
    Verification,
    SimulationDraft,
    SimulationRun,
}

/// Events that make previously derived state stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invalidation {
    /// A new file was selected.
    ArtifactChanged,
    /// A new upload was issued for the current file; everything derived from
    /// the previous upload result is dropped so dependent stages can never
    /// hold results for metadata that is no longer shown.
    UploadStarted,
    SimulationModeEntered,
    SimulationModeExited,
}

impl Invalidation {
    pub fn clears(self) -> &'static [Slot] {
        match self {
            Self::ArtifactChanged => &[
                Slot::Artifact,
                Slot::Upload,
                Slot::AiAnalysis,
                Slot::Verification,
                Slot::SimulationDraft,
                Slot::SimulationRun,
            ],
            Self::UploadStarted => &[
                Slot::AiAnalysis,
                Slot::Verification,
                Slot::SimulationDraft,
                Slot::SimulationRun,
            ],
            Self::SimulationModeEntered => &[Slot::SimulationRun],
            Self::SimulationModeExited => &[Slot::SimulationDraft, Slot::SimulationRun],
        }
    }
}

/// Clear every slot the event invalidates.
pub fn apply(store: &mut SessionStore, invalidation: Invalidation) {
    let detached = invalidation
        .clears()
        .iter()
        .filter(|slot| is_pending(store, **slot))
        .count();
    if detached > 0 {
        tracing::debug!(
            ?invalidation,
            detached,
            "in-flight responses will be discarded"
        );
    }

    for slot in invalidation.clears() {
        match slot {
            Slot::Artifact => store.clear_artifact(),
            Slot::Upload => store.upload.clear(),
            Slot::AiAnalysis => store.ai_analysis.clear(),
            Slot::Verification => store.verification.clear(),
            Slot::SimulationDraft => store.simulation.draft = None,
            Slot::SimulationRun => store.simulation.run.clear(),
        }
    }
}

fn is_pending(store: &SessionStore, slot: Slot) -> bool {
    match slot {
        Slot::Artifact | Slot::SimulationDraft => false,
        Slot::Upload => store.upload.is_pending(),
        Slot::AiAnalysis => store.ai_analysis.is_pending(),
        Slot::Verification => store.verification.is_pending(),
        Slot::SimulationRun => store.simulation.run.is_pending(),
    }
}
