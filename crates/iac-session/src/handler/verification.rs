//! Authenticity verification stage.

use std::sync::Arc;

use iac_client::AnalysisBackend;

use super::{MessageHandler, ensure_idle, settle, timed};
use crate::error::{Result, SessionError};
use crate::message::{Message, VerificationMessage};
use crate::stage::Stage;
use crate::store::SessionStore;
use crate::task::Task;

/// Handles [`VerificationMessage`]s.
pub struct VerificationController<B> {
    backend: Arc<B>,
}

impl<B> VerificationController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

impl<B: AnalysisBackend> MessageHandler<VerificationMessage> for VerificationController<B> {
    fn handle(&self, store: &mut SessionStore, msg: VerificationMessage) -> Result<Task<Message>> {
        match msg {
            VerificationMessage::Run => {
                ensure_idle(store, Stage::Verification)?;
                if !store.is_ready() {
                    return Err(SessionError::precondition(
                        Stage::Verification,
                        "the file has not been uploaded",
                    ));
                }
                let Some(file_name) = store.artifact().map(|artifact| artifact.name().to_string())
                else {
                    return Err(SessionError::precondition(
                        Stage::Verification,
                        "no file is selected",
                    ));
                };

                let ticket = store.issue_ticket();
                store.verification.begin(ticket);
                tracing::info!(
                    stage = %Stage::Verification,
                    generation = ticket.generation(),
                    file_name = %file_name,
                    "requesting authenticity verification"
                );

                let backend = Arc::clone(&self.backend);
                Ok(Task::perform(
                    timed(Stage::Verification, async move {
                        backend.verify_authenticity(&file_name).await
                    }),
                    move |outcome| {
                        Message::Verification(VerificationMessage::Finished { ticket, outcome })
                    },
                ))
            }
            VerificationMessage::Finished { ticket, outcome } => {
                if settle(Stage::Verification, &mut store.verification, ticket, outcome)
                    && let Some(report) = store.verification.result()
                {
                    tracing::info!(
                        stage = %Stage::Verification,
                        score = report.score,
                        risk_level = %report.risk_level,
                        flags = report.flags.len(),
                        "verification complete"
                    );
                }
                Ok(Task::none())
            }
        }
    }
}
