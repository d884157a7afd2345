//! Manipulation simulation stage.
//!
//! Simulation mode is a sub-mode of a ready session. Entering it seeds an
//! editable draft from the extracted metadata; edits only ever touch the
//! draft. Leaving it discards the draft and any result, and both transitions
//! detach a run that is still in flight.

use std::sync::Arc;

use iac_client::AnalysisBackend;
use iac_model::SimulationDraft;

use super::{MessageHandler, ensure_idle, settle, timed};
use crate::error::{Result, SessionError};
use crate::invalidation::{self, Invalidation};
use crate::message::{Message, SimulationMessage};
use crate::stage::Stage;
use crate::store::SessionStore;
use crate::task::Task;

/// Handles [`SimulationMessage`]s.
pub struct SimulationController<B> {
    backend: Arc<B>,
}

impl<B> SimulationController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

impl<B: AnalysisBackend> MessageHandler<SimulationMessage> for SimulationController<B> {
    fn handle(&self, store: &mut SessionStore, msg: SimulationMessage) -> Result<Task<Message>> {
        match msg {
            SimulationMessage::Toggle => {
                toggle(store)?;
                Ok(Task::none())
            }
            SimulationMessage::EditField { key, value } => {
                edit_field(store, &key, value)?;
                Ok(Task::none())
            }
            SimulationMessage::Run => self.run(store),
            SimulationMessage::Finished { ticket, outcome } => {
                if settle(Stage::Simulation, &mut store.simulation.run, ticket, outcome)
                    && let Some(result) = store.simulation.run.result()
                {
                    tracing::info!(
                        stage = %Stage::Simulation,
                        simulated_flags = result.simulated_flags.len(),
                        "simulation complete"
                    );
                }
                Ok(Task::none())
            }
        }
    }
}

impl<B: AnalysisBackend> SimulationController<B> {
    fn run(&self, store: &mut SessionStore) -> Result<Task<Message>> {
        ensure_idle(store, Stage::Simulation)?;
        let Some(edits) = store
            .simulation
            .draft
            .as_ref()
            .map(|draft| draft.as_metadata().clone())
        else {
            return Err(SessionError::precondition(
                Stage::Simulation,
                "simulation mode is not active",
            ));
        };
        if !store.is_ready() {
            return Err(SessionError::precondition(
                Stage::Simulation,
                "the file has not been uploaded",
            ));
        }
        let Some(file_name) = store.artifact().map(|artifact| artifact.name().to_string()) else {
            return Err(SessionError::precondition(
                Stage::Simulation,
                "no file is selected",
            ));
        };

        let ticket = store.issue_ticket();
        store.simulation.run.begin(ticket);
        tracing::info!(
            stage = %Stage::Simulation,
            generation = ticket.generation(),
            file_name = %file_name,
            fields = edits.field_count(),
            "requesting simulation"
        );

        let backend = Arc::clone(&self.backend);
        Ok(Task::perform(
            timed(Stage::Simulation, async move {
                backend.simulate_metadata(&file_name, &edits).await
            }),
            move |outcome| Message::Simulation(SimulationMessage::Finished { ticket, outcome }),
        ))
    }
}

fn edit_field(store: &mut SessionStore, key: &str, value: String) -> Result<()> {
    let Some(draft) = store.simulation.draft.as_mut() else {
        tracing::debug!(stage = %Stage::Simulation, "edit ignored: simulation mode is off");
        return Ok(());
    };
    if let Err(error) = draft.set_field(key, value) {
        tracing::debug!(stage = %Stage::Simulation, %error, "edit refused");
        return Err(SessionError::precondition(
            Stage::Simulation,
            "only extracted metadata fields can be edited",
        ));
    }
    Ok(())
}

fn toggle(store: &mut SessionStore) -> Result<()> {
    if store.simulation.is_active() {
        invalidation::apply(store, Invalidation::SimulationModeExited);
        tracing::debug!(stage = %Stage::Simulation, "simulation mode exited");
        return Ok(());
    }

    let Some(draft) = store.metadata().map(SimulationDraft::seed) else {
        return Err(SessionError::precondition(
            Stage::Simulation,
            "no metadata has been extracted yet",
        ));
    };
    invalidation::apply(store, Invalidation::SimulationModeEntered);
    store.simulation.draft = Some(draft);
    tracing::debug!(stage = %Stage::Simulation, "simulation mode entered");
    Ok(())
}
