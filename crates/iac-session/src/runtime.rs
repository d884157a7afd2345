//! Single-threaded driver for session tasks.
//!
//! Requests for different stages are polled concurrently on the caller's
//! task. Completions are applied one at a time in the order they resolve, so
//! the store is never touched from two places at once.

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use iac_client::AnalysisBackend;

use crate::error::Result;
use crate::message::Message;
use crate::session::Session;
use crate::task::Task;
use crate::view::SessionView;

/// Owns a [`Session`] and the requests it has issued.
pub struct SessionRuntime<B> {
    session: Session<B>,
    in_flight: FuturesUnordered<BoxFuture<'static, Message>>,
}

impl<B: AnalysisBackend> SessionRuntime<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            session: Session::new(backend),
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    /// Apply a user message and start whatever request it produced.
    pub fn dispatch(&mut self, message: Message) -> Result<()> {
        let task = self.session.update(message)?;
        self.spawn(task);
        Ok(())
    }

    /// Number of requests still being polled, including detached ones.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Wait for the next request to finish and apply its response.
    ///
    /// Returns `false` when nothing is in flight.
    pub async fn step(&mut self) -> bool {
        let Some(message) = self.in_flight.next().await else {
            return false;
        };
        match self.session.update(message) {
            Ok(task) => self.spawn(task),
            Err(err) => tracing::warn!(error = %err, "completion rejected"),
        }
        true
    }

    /// Drive every in-flight request to completion.
    pub async fn run_until_idle(&mut self) {
        while self.step().await {}
    }

    fn spawn(&mut self, task: Task<Message>) {
        for future in task.into_futures() {
            self.in_flight.push(future);
        }
    }
}
