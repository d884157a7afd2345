//! Deferred work returned from an update.

use std::fmt;
use std::future::Future;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

/// Zero or more futures whose outputs are fed back as messages.
///
/// Controllers never await anything themselves; they describe the request
/// and the runtime polls it.
pub struct Task<M> {
    futures: Vec<BoxFuture<'static, M>>,
}

impl<M: Send + 'static> Task<M> {
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    /// Run `future` and map its output into a message.
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> M + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            futures: vec![future.map(map).boxed()],
        }
    }

    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn into_futures(self) -> Vec<BoxFuture<'static, M>> {
        self.futures
    }
}

impl<M> fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("futures", &self.futures.len())
            .finish()
    }
}
