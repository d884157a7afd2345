//! AI metadata analysis stage.

use std::sync::Arc;

use iac_client::AnalysisBackend;

use super::{MessageHandler, ensure_idle, settle, timed};
use crate::error::{Result, SessionError};
use crate::message::{AiAnalysisMessage, Message};
use crate::stage::Stage;
use crate::store::SessionStore;
use crate::task::Task;

/// Handles [`AiAnalysisMessage`]s.
pub struct AiAnalysisController<B> {
    backend: Arc<B>,
}

impl<B> AiAnalysisController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

impl<B: AnalysisBackend> MessageHandler<AiAnalysisMessage> for AiAnalysisController<B> {
    fn handle(&self, store: &mut SessionStore, msg: AiAnalysisMessage) -> Result<Task<Message>> {
        match msg {
            AiAnalysisMessage::Run => {
                ensure_idle(store, Stage::AiAnalysis)?;
                let Some(metadata) = store.metadata().cloned() else {
                    return Err(SessionError::precondition(
                        Stage::AiAnalysis,
                        "no metadata has been extracted yet",
                    ));
                };

                let ticket = store.issue_ticket();
                store.ai_analysis.begin(ticket);
                tracing::info!(
                    stage = %Stage::AiAnalysis,
                    generation = ticket.generation(),
                    fields = metadata.field_count(),
                    "requesting AI analysis"
                );

                let backend = Arc::clone(&self.backend);
                Ok(Task::perform(
                    timed(Stage::AiAnalysis, async move {
                        backend.analyze_metadata(&metadata).await
                    }),
                    move |outcome| {
                        Message::AiAnalysis(AiAnalysisMessage::Finished { ticket, outcome })
                    },
                ))
            }
            AiAnalysisMessage::Finished { ticket, outcome } => {
                if settle(Stage::AiAnalysis, &mut store.ai_analysis, ticket, outcome)
                    && let Some(result) = store.ai_analysis.result()
                {
                    tracing::info!(
                        stage = %Stage::AiAnalysis,
                        confidence = result.confidence_score,
                        evidence = result.evidence.len(),
                        "AI analysis complete"
                    );
                }
                Ok(Task::none())
            }
        }
    }
}
