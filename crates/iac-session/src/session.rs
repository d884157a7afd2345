//! The update entry point.

use std::sync::Arc;

use iac_client::AnalysisBackend;

use crate::error::Result;
use crate::handler::{
    AiAnalysisController, MessageHandler, SimulationController, UploadController,
    VerificationController,
};
use crate::message::Message;
use crate::store::SessionStore;
use crate::task::Task;
use crate::view::{SessionView, project};

/// One analysis session: the store plus a controller per stage.
pub struct Session<B> {
    store: SessionStore,
    upload: UploadController<B>,
    ai_analysis: AiAnalysisController<B>,
    verification: VerificationController<B>,
    simulation: SimulationController<B>,
}

impl<B: AnalysisBackend> Session<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            store: SessionStore::new(),
            upload: UploadController::new(Arc::clone(&backend)),
            ai_analysis: AiAnalysisController::new(Arc::clone(&backend)),
            verification: VerificationController::new(Arc::clone(&backend)),
            simulation: SimulationController::new(backend),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Project the current state for rendering.
    pub fn view(&self) -> SessionView {
        project(&self.store)
    }

    /// Apply a message and return the follow-up work.
    pub fn update(&mut self, message: Message) -> Result<Task<Message>> {
        match message {
            Message::FileSelected(artifact) => {
                self.store.commit_artifact(artifact);
                Ok(Task::none())
            }
            Message::KnownHashesChanged(known_hashes) => {
                self.store.set_known_hashes(known_hashes);
                Ok(Task::none())
            }
            Message::Upload(msg) => self.upload.handle(&mut self.store, msg),
            Message::AiAnalysis(msg) => self.ai_analysis.handle(&mut self.store, msg),
            Message::Verification(msg) => self.verification.handle(&mut self.store, msg),
            Message::Simulation(msg) => self.simulation.handle(&mut self.store, msg),
        }
    }
}
