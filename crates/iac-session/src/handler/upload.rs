//! Upload stage.
//!
//! The gate for every other stage: dependent stages run only once the upload
//! slot holds a result for the current artifact.

use std::sync::Arc;

use iac_client::{AnalysisBackend, ClientError};
use iac_model::UploadResult;

use super::{MessageHandler, ensure_idle, settle, timed};
use crate::error::{Result, SessionError};
use crate::invalidation::{self, Invalidation};
use crate::message::{Message, UploadMessage};
use crate::stage::{Stage, Ticket};
use crate::store::SessionStore;
use crate::task::Task;

/// Handles [`UploadMessage`]s.
pub struct UploadController<B> {
    backend: Arc<B>,
}

impl<B> UploadController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

impl<B: AnalysisBackend> MessageHandler<UploadMessage> for UploadController<B> {
    fn handle(&self, store: &mut SessionStore, msg: UploadMessage) -> Result<Task<Message>> {
        match msg {
            UploadMessage::Submit => self.submit(store),
            UploadMessage::Finished { ticket, outcome } => {
                finish(store, ticket, outcome);
                Ok(Task::none())
            }
        }
    }
}

impl<B: AnalysisBackend> UploadController<B> {
    fn submit(&self, store: &mut SessionStore) -> Result<Task<Message>> {
        ensure_idle(store, Stage::Upload)?;

        let Some(artifact) = store.artifact().cloned() else {
            let err = SessionError::Validation;
            store.reject_upload(&err.to_string());
            tracing::debug!(stage = %Stage::Upload, "request rejected: no file selected");
            return Err(err);
        };

        invalidation::apply(store, Invalidation::UploadStarted);
        let ticket = store.issue_ticket();
        store.upload.begin(ticket);
        let known = store.known_hashes().clone();

        tracing::info!(
            stage = %Stage::Upload,
            generation = ticket.generation(),
            file_name = artifact.name(),
            bytes = artifact.len(),
            known_sha256 = known.sha256().is_some(),
            known_md5 = known.md5().is_some(),
            "uploading"
        );

        let backend = Arc::clone(&self.backend);
        Ok(Task::perform(
            timed(Stage::Upload, async move {
                backend.upload(&artifact, &known).await
            }),
            move |outcome| Message::Upload(UploadMessage::Finished { ticket, outcome }),
        ))
    }
}

fn finish(
    store: &mut SessionStore,
    ticket: Ticket,
    outcome: std::result::Result<UploadResult, ClientError>,
) {
    if !settle(Stage::Upload, &mut store.upload, ticket, outcome) {
        return;
    }
    let (Some(result), Some(artifact)) = (store.upload_result(), store.artifact()) else {
        return;
    };

    if !result.sha256.eq_ignore_ascii_case(artifact.local_sha256()) {
        tracing::warn!(
            stage = %Stage::Upload,
            file_name = artifact.name(),
            "backend SHA-256 differs from the locally computed digest"
        );
    }
    tracing::info!(
        stage = %Stage::Upload,
        generation = ticket.generation(),
        file_name = artifact.name(),
        fields = result.metadata.field_count(),
        flags = result.metadata.flags().len(),
        "upload complete"
    );
}
