//! Async fetch bindings
//!
//! `CachedQuery` owns a fetcher and the `{data, loading, error}` state of one
//! consumer. Observers follow the state through a watch channel. Every load
//! takes a new generation; a result arriving for an older generation is
//! dropped so a slow response can never overwrite a newer one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use crate::cache::{cache_key, KeyPart};
use crate::registry::{CacheRegistry, Namespace};

// == Query State ==
#[derive(Debug)]
pub enum QueryState<T, E> {
    /// Nothing requested yet
    Idle,
    Loading,
    Success(T),
    /// The fetcher's error, shared with every observer
    Failed(Arc<E>),
}

impl<T: Clone, E> Clone for QueryState<T, E> {
    fn clone(&self) -> Self {
        match self {
            QueryState::Idle => QueryState::Idle,
            QueryState::Loading => QueryState::Loading,
            QueryState::Success(data) => QueryState::Success(data.clone()),
            QueryState::Failed(err) => QueryState::Failed(Arc::clone(err)),
        }
    }
}

impl<T, E> QueryState<T, E> {
    pub fn is_idle(&self) -> bool {
        matches!(self, QueryState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            QueryState::Failed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

// == Cached Query ==
/// A cached fetch bound to one consumer's lifetime.
///
/// The fetcher receives the current dependencies; the cache key is derived
/// from the query name and those dependencies.
pub struct CachedQuery<T, E, F> {
    registry: CacheRegistry,
    name: String,
    namespace: Namespace,
    ttl: Option<Duration>,
    fetcher: F,
    deps: Mutex<Vec<KeyPart>>,
    generation: AtomicU64,
    state: watch::Sender<QueryState<T, E>>,
    /// Last state that was not `Loading`
    settled: Mutex<QueryState<T, E>>,
}

impl<T, E, F, Fut> CachedQuery<T, E, F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Vec<KeyPart>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    /// Creates an idle query backed by the `api` cache.
    pub fn new(registry: &CacheRegistry, name: impl Into<String>, fetcher: F) -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            registry: registry.clone(),
            name: name.into(),
            namespace: Namespace::Api,
            ttl: None,
            fetcher,
            deps: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
            state,
            settled: Mutex::new(QueryState::Idle),
        }
    }

    /// Overrides the TTL of stored responses.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Moves the query to the `data` cache with a fixed TTL.
    pub fn with_data_refresh(mut self, ttl: Duration) -> Self {
        self.namespace = Namespace::Data;
        self.ttl = Some(ttl);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T, E>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> QueryState<T, E> {
        self.state.borrow().clone()
    }

    /// Cache key for the current dependencies.
    pub fn key(&self) -> String {
        cache_key(&self.name, &self.deps.lock())
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    // == Load ==
    /// Switches to `deps` and fetches through the cache.
    pub async fn load(&self, deps: Vec<KeyPart>) -> QueryState<T, E> {
        *self.deps.lock() = deps;
        self.run().await
    }

    // == Refetch ==
    /// Drops the cached response for the current key and fetches again.
    pub async fn refetch(&self) -> QueryState<T, E> {
        self.registry.remove(self.namespace, &self.key());
        self.run().await
    }

    // == Invalidate ==
    /// Invalidates every key matching `pattern` plus this query's own key,
    /// then fetches again.
    pub async fn invalidate(&self, pattern: &str) -> QueryState<T, E> {
        self.registry.invalidate_by_pattern(pattern);
        self.registry.remove(self.namespace, &self.key());
        self.run().await
    }

    async fn run(&self) -> QueryState<T, E> {
        let generation = self.supersede();
        let deps = self.deps.lock().clone();
        let key = cache_key(&self.name, &deps);

        self.state.send_replace(QueryState::Loading);
        let result = self
            .registry
            .cached_fetch(self.namespace, &key, || (self.fetcher)(deps), self.ttl)
            .await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(key = %key, "discarding stale query result");
            return self.state();
        }

        let next = match result {
            Ok(data) => QueryState::Success(data),
            Err(err) => QueryState::Failed(Arc::new(err)),
        };
        self.settle(next.clone());
        next
    }

    /// Starts a new generation, orphaning any load still in flight.
    pub(crate) fn supersede(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn replace_state(&self, state: QueryState<T, E>) -> QueryState<T, E> {
        self.state.send_replace(state)
    }

    /// Publishes a final state and remembers it as the settled one.
    pub(crate) fn settle(&self, state: QueryState<T, E>) {
        *self.settled.lock() = state.clone();
        self.state.send_replace(state);
    }

    pub(crate) fn settled(&self) -> QueryState<T, E> {
        self.settled.lock().clone()
    }

    pub(crate) fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}

// == Cached Multiple ==
/// Runs several cached API calls concurrently, results in request order.
pub async fn cached_multiple<T, E, F, Fut>(
    registry: &CacheRegistry,
    requests: Vec<(String, F)>,
    ttl: Option<Duration>,
) -> Vec<Result<T, E>>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    join_all(
        requests
            .into_iter()
            .map(move |(key, fetcher)| async move {
                registry.cached_api_call(&key, fetcher, ttl).await
            }),
    )
    .await
}
