//! Optimistic updates over a `CachedQuery`
//!
//! `apply_update` shows a tentative value right away and remembers what was
//! there before. `rollback_update` puts the old state back; `commit_update`
//! writes the tentative value into the cache without calling the fetcher.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::KeyPart;
use crate::hooks::query::{CachedQuery, QueryState};

pub struct OptimisticQuery<T, E, F> {
    query: CachedQuery<T, E, F>,
    /// State before the first pending update
    original: Mutex<Option<QueryState<T, E>>>,
}

impl<T, E, F, Fut> OptimisticQuery<T, E, F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Vec<KeyPart>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    pub fn new(query: CachedQuery<T, E, F>) -> Self {
        Self {
            query,
            original: Mutex::new(None),
        }
    }

    pub fn query(&self) -> &CachedQuery<T, E, F> {
        &self.query
    }

    pub fn state(&self) -> QueryState<T, E> {
        self.query.state()
    }

    /// Loads fresh data, dropping any pending update.
    pub async fn load(&self, deps: Vec<KeyPart>) -> QueryState<T, E> {
        self.original.lock().take();
        self.query.load(deps).await
    }

    /// Whether an update is waiting for commit or rollback.
    pub fn is_pending(&self) -> bool {
        self.original.lock().is_some()
    }

    // == Apply ==
    /// Shows `value` immediately.
    ///
    /// Loads still in flight are orphaned so they cannot overwrite it, and
    /// the saved state is the last settled one rather than `Loading`. While
    /// an update is pending, further updates keep the first saved state.
    pub fn apply_update(&self, value: T) {
        let mut original = self.original.lock();
        self.query.supersede();
        let previous = self.query.replace_state(QueryState::Success(value));
        if original.is_none() {
            *original = Some(if previous.is_loading() {
                self.query.settled()
            } else {
                previous
            });
        }
    }

    // == Rollback ==
    /// Restores the state saved by the first pending update.
    pub fn rollback_update(&self) -> bool {
        match self.original.lock().take() {
            Some(previous) => {
                self.query.replace_state(previous);
                true
            }
            None => false,
        }
    }

    // == Commit ==
    /// Stores the optimistic value in the cache under the current key.
    pub fn commit_update(&self) -> bool {
        if self.original.lock().take().is_none() {
            return false;
        }
        let QueryState::Success(value) = self.query.state() else {
            return false;
        };
        let key = self.query.key();
        debug!(key = %key, "committing optimistic value");
        self.query
            .registry()
            .store(self.query.namespace(), &key, value.clone(), self.query.ttl());
        self.query.settle(QueryState::Success(value));
        true
    }

    /// Convenience for updates derived from the visible value.
    pub fn update_with<U>(&self, update: U)
    where
        U: FnOnce(Option<&T>) -> T,
    {
        let current = self.query.state();
        self.apply_update(update(current.data()));
    }

    /// The fetcher error of the saved state, if it had failed.
    pub fn original_error(&self) -> Option<Arc<E>> {
        match self.original.lock().as_ref() {
            Some(QueryState::Failed(err)) => Some(Arc::clone(err)),
            _ => None,
        }
    }
}
