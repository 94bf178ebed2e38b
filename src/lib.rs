//! Office Cache - client-side caching layer for the office dashboard
//!
//! Namespaced TTL/LRU caches owned by a `CacheRegistry`, caching patterns
//! with single-flight fetching, and lifecycle bindings for derived values
//! and async queries.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod hooks;
pub mod models;
pub mod registry;
pub mod tasks;

pub use api::AppState;
pub use cache::{cache_key, Cache, CacheStats, KeyPart};
pub use config::{CacheConfig, Config, RegistryConfig};
pub use error::CacheError;
pub use registry::{CacheRegistry, Namespace};
pub use tasks::spawn_cleanup_task;
