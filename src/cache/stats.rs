//! Cache Statistics Module
//!
//! Running counters kept by the store and the snapshot handed to callers.

use serde::Serialize;

// == Counters ==
/// Monotonic counters updated by store operations.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

// == Cache Stats ==
/// Diagnostic snapshot of one namespaced cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub namespace: String,
    /// Entries currently held, expired ones included until swept
    pub size: usize,
    pub max_size: usize,
    /// Sum of `access_count` across live entries
    pub total_access_count: u64,
    /// Entries past their TTL that have not been removed yet
    pub expired_count: usize,
    /// Successful reads
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries removed to make room
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == All Stats ==
/// Snapshot of every namespace owned by a registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllStats {
    pub api: CacheStats,
    pub ui: CacheStats,
    pub data: CacheStats,
}

impl AllStats {
    pub fn total_size(&self) -> usize {
        self.iter().map(|s| s.size).sum()
    }

    pub fn total_access_count(&self) -> u64 {
        self.iter().map(|s| s.total_access_count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheStats> {
        [&self.api, &self.ui, &self.data].into_iter()
    }
}
