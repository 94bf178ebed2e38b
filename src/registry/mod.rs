//! Cache Registry Module
//!
//! Owns the `api`, `ui` and `data` caches and implements the caching
//! patterns consumers use: cached API calls with single-flight, cached
//! computations, longer-lived data fetches and pattern invalidation.
//!
//! The registry is an explicitly constructed value; clones share the same
//! caches, so it can be handed to every consumer that needs it.

mod inflight;

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{AllStats, Cache, CacheStats};
use crate::config::RegistryConfig;
use crate::error::{CacheError, Result};

use inflight::InFlight;

/// Type-erased cached payload.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// A cache shared between the registry's clones.
pub type SharedCache = Arc<Mutex<Cache<CachedValue>>>;

// == Namespace ==
/// The namespaces provisioned by a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Responses from the REST backend
    Api,
    /// Derived values computed for display
    Ui,
    /// Domain data kept around longer
    Data,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Api, Namespace::Ui, Namespace::Data];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Api => "api",
            Namespace::Ui => "ui",
            Namespace::Data => "data",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "api" => Ok(Namespace::Api),
            "ui" => Ok(Namespace::Ui),
            "data" => Ok(Namespace::Data),
            other => Err(CacheError::InvalidRequest(format!(
                "Unknown namespace: {other}"
            ))),
        }
    }
}

// == Cleanup Report ==
/// Expired entries removed per namespace by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub api: usize,
    pub ui: usize,
    pub data: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.api + self.ui + self.data
    }
}

// == Cache Registry ==
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    api: SharedCache,
    ui: SharedCache,
    data: SharedCache,
    flights: Arc<InFlight>,
}

impl CacheRegistry {
    // == Constructor ==
    /// Builds the three caches, rejecting invalid settings.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        Ok(Self {
            api: Arc::new(Mutex::new(Cache::new(config.api.clone())?)),
            ui: Arc::new(Mutex::new(Cache::new(config.ui.clone())?)),
            data: Arc::new(Mutex::new(Cache::new(config.data.clone())?)),
            flights: Arc::new(InFlight::default()),
        })
    }

    /// Returns the cache backing a namespace.
    pub fn cache(&self, namespace: Namespace) -> &SharedCache {
        match namespace {
            Namespace::Api => &self.api,
            Namespace::Ui => &self.ui,
            Namespace::Data => &self.data,
        }
    }

    // == Typed Access ==
    /// Reads a value, treating a value stored as another type as a miss.
    pub fn lookup<T>(&self, namespace: Namespace, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let value = self.cache(namespace).lock().get(key)?;
        value.downcast_ref::<T>().cloned()
    }

    /// Stores a value directly, bypassing any fetcher.
    pub fn store<T>(&self, namespace: Namespace, key: &str, value: T, ttl: Option<Duration>)
    where
        T: Send + Sync + 'static,
    {
        self.cache(namespace)
            .lock()
            .set(key, Arc::new(value) as CachedValue, ttl);
    }

    pub fn remove(&self, namespace: Namespace, key: &str) -> bool {
        self.cache(namespace).lock().delete(key)
    }

    pub fn keys(&self, namespace: Namespace) -> Vec<String> {
        self.cache(namespace).lock().keys()
    }

    pub fn stats(&self, namespace: Namespace) -> CacheStats {
        self.cache(namespace).lock().stats()
    }

    /// Number of fetches currently shared between callers.
    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }

    // == Cached API Call ==
    /// Returns the cached response for `key` or fetches and caches it.
    ///
    /// Concurrent misses on the same key share a single fetch. Errors are
    /// returned as-is and nothing is cached for them.
    pub async fn cached_api_call<T, E, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> std::result::Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.cached_fetch(Namespace::Api, key, fetcher, ttl).await
    }

    // == Cached Data With Refresh ==
    /// Same as `cached_api_call` against the longer-lived `data` cache.
    pub async fn cached_data_with_refresh<T, E, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Duration,
    ) -> std::result::Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.cached_fetch(Namespace::Data, key, fetcher, Some(ttl)).await
    }

    /// Shared miss path for the async patterns.
    pub async fn cached_fetch<T, E, F, Fut>(
        &self,
        namespace: Namespace,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> std::result::Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(hit) = self.lookup::<T>(namespace, key) {
            return Ok(hit);
        }

        let flight = self.flights.join::<T>(namespace, key);
        let cache = self.cache(namespace);
        let value = flight
            .cell()
            .get_or_try_init(|| async move {
                // A flight that just landed may already have filled the cache
                if let Some(hit) = read_landed::<T>(cache, key) {
                    return Ok(hit);
                }
                debug!(%namespace, key, "cache miss, fetching");
                let value = fetcher().await?;
                cache
                    .lock()
                    .set(key, Arc::new(value.clone()) as CachedValue, ttl);
                Ok::<T, E>(value)
            })
            .await?
            .clone();

        Ok(value)
    }

    // == Cached Computation ==
    /// Returns the cached result of `compute` under `key` in the `ui` cache.
    ///
    /// `compute` runs without any lock held, so it may use the registry.
    pub fn cached_computation<T, F>(&self, key: &str, compute: F, ttl: Option<Duration>) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.lookup::<T>(Namespace::Ui, key) {
            return hit;
        }
        let value = compute();
        self.store(Namespace::Ui, key, value.clone(), ttl);
        value
    }

    // == Invalidate By Pattern ==
    /// Deletes every key containing `pattern` across all namespaces.
    pub fn invalidate_by_pattern(&self, pattern: &str) -> usize {
        let mut removed = 0;
        for namespace in Namespace::ALL {
            let mut cache = self.cache(namespace).lock();
            for key in cache.keys() {
                if key.contains(pattern) && cache.delete(&key) {
                    removed += 1;
                }
            }
        }
        info!(pattern, removed, "invalidated cache keys by pattern");
        removed
    }

    /// Empties every namespace.
    pub fn clear_all(&self) {
        for namespace in Namespace::ALL {
            self.cache(namespace).lock().clear();
        }
        info!("cleared all caches");
    }

    pub fn all_stats(&self) -> AllStats {
        AllStats {
            api: self.stats(Namespace::Api),
            ui: self.stats(Namespace::Ui),
            data: self.stats(Namespace::Data),
        }
    }

    /// Sweeps expired entries from every namespace.
    pub fn cleanup_all(&self) -> CleanupReport {
        CleanupReport {
            api: self.api.lock().cleanup(),
            ui: self.ui.lock().cleanup(),
            data: self.data.lock().cleanup(),
        }
    }
}

/// Reads a value filled by a flight that landed after this caller's miss.
///
/// Goes through `Cache::get`, so the read counts as a hit and refreshes
/// recency like any other.
fn read_landed<T>(cache: &SharedCache, key: &str) -> Option<T>
where
    T: Clone + Send + Sync + 'static,
{
    let value = cache.lock().get(key)?;
    value.downcast_ref::<T>().cloned()
}
