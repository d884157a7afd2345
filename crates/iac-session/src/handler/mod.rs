//! Stage controllers.
//!
//! Each controller implements [`MessageHandler`] for its stage's message type:
//!
//! ```ignore
//! impl<B: AnalysisBackend> MessageHandler<VerificationMessage> for VerificationController<B> {
//!     fn handle(&self, store: &mut SessionStore, msg: VerificationMessage) -> Result<Task<Message>> {
//!         match msg {
//!             VerificationMessage::Run => { /* check, begin, return request */ }
//!             VerificationMessage::Finished { ticket, outcome } => { /* settle */ }
//!         }
//!     }
//! }
//! ```
//!
//! A controller validates its preconditions, moves its own slot to `Pending`
//! and returns the backend request as a [`Task`]. It never awaits; the
//! response comes back later as a `Finished` message and is settled only if
//! the slot is still waiting for that exact ticket.

mod ai_analysis;
mod simulation;
mod upload;
mod verification;

use std::future::Future;
use std::time::Instant;

use iac_client::ClientError;

use crate::error::{Result, SessionError};
use crate::message::Message;
use crate::stage::{Stage, StageState, Ticket};
use crate::store::SessionStore;
use crate::task::Task;

pub use ai_analysis::AiAnalysisController;
pub use simulation::SimulationController;
pub use upload::UploadController;
pub use verification::VerificationController;

/// Handles one message type against the session store.
pub trait MessageHandler<M> {
    /// Handle a message, possibly mutating the store and returning a request.
    ///
    /// An `Err` means the message was rejected; the store is unchanged except
    /// for a validation error recorded in the upload slot.
    fn handle(&self, store: &mut SessionStore, msg: M) -> Result<Task<Message>>;
}

/// Refuse to start a stage that is already waiting on the backend.
fn ensure_idle(store: &SessionStore, stage: Stage) -> Result<()> {
    if store.is_busy(stage) {
        tracing::debug!(stage = %stage, "request rejected: stage busy");
        return Err(SessionError::Busy(stage));
    }
    Ok(())
}

/// Apply a backend response to its slot unless it is stale.
///
/// Returns whether the response was applied.
fn settle<T>(
    stage: Stage,
    slot: &mut StageState<T>,
    ticket: Ticket,
    outcome: std::result::Result<T, ClientError>,
) -> bool {
    if slot.ticket() != Some(ticket) {
        tracing::debug!(
            stage = %stage,
            generation = ticket.generation(),
            sequence = ticket.sequence(),
            "discarding stale response"
        );
        return false;
    }

    let outcome = outcome.map_err(|source| {
        tracing::warn!(
            stage = %stage,
            generation = ticket.generation(),
            retryable = source.is_retryable(),
            hint = source.user_message(),
            error = %source,
            "stage failed"
        );
        SessionError::Transport { stage, source }.to_string()
    });
    slot.settle(ticket, outcome)
}

/// Await a backend request, logging how long it took.
async fn timed<T>(stage: Stage, request: impl Future<Output = T>) -> T {
    let started = Instant::now();
    let output = request.await;
    tracing::debug!(
        stage = %stage,
        duration_ms = started.elapsed().as_millis() as u64,
        "response received"
    );
    output
}
