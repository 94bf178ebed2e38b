//! Cache Module
//!
//! Provides namespaced in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod key;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use key::{cache_key, fingerprint, KeyPart};
pub use lru::LruTracker;
pub use stats::{AllStats, CacheStats};
pub use store::Cache;
