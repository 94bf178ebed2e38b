//! Cache Store Module
//!
//! Namespaced cache combining HashMap storage with LRU tracking and lazy TTL
//! expiration.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::stats::Counters;
use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::config::CacheConfig;
use crate::error::Result;

// == Cache ==
/// Bounded key-value store for one namespace.
///
/// Keys are stored under their full identity `namespace:key`, so several
/// caches can share a key space without colliding. `get` refreshes recency;
/// `has` only checks presence and leaves recency untouched.
#[derive(Debug)]
pub struct Cache<V> {
    namespace: String,
    /// Full key -> entry
    entries: HashMap<String, CacheEntry<V>>,
    lru: LruTracker,
    counters: Counters,
    max_size: usize,
    default_ttl: Duration,
}

impl<V: Clone> Cache<V> {
    // == Constructor ==
    /// Creates an empty cache, rejecting invalid configuration.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            namespace: config.namespace,
            entries: HashMap::new(),
            lru: LruTracker::new(),
            counters: Counters::default(),
            max_size: config.max_size,
            default_ttl: config.ttl,
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed and reported as misses. A hit bumps the
    /// entry's access count and makes it the most recently used.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let full = self.full_key(key);
        let now = Instant::now();

        if self.remove_if_expired(&full, now) {
            self.counters.misses += 1;
            return None;
        }

        match self.entries.get_mut(&full) {
            Some(entry) => {
                entry.touch(now);
                self.lru.touch(&full);
                self.counters.hits += 1;
                Some(entry.value.clone())
            }
            None => {
                self.counters.misses += 1;
                None
            }
        }
    }

    // == Set ==
    /// Stores a value, falling back to the default TTL.
    ///
    /// A new key arriving at a full cache evicts the least recently used
    /// entry first. Overwriting resets the entry's TTL and access metadata.
    pub fn set(&mut self, key: &str, value: V, ttl: Option<Duration>) {
        let full = self.full_key(key);

        if !self.entries.contains_key(&full) && self.entries.len() >= self.max_size {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.counters.evictions += 1;
            }
        }

        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));
        self.entries.insert(full.clone(), entry);
        self.lru.touch(&full);
    }

    // == Has ==
    /// Returns whether a live entry exists, dropping it if expired.
    pub fn has(&mut self, key: &str) -> bool {
        let full = self.full_key(key);
        if self.remove_if_expired(&full, Instant::now()) {
            return false;
        }
        self.entries.contains_key(&full)
    }

    // == Delete ==
    /// Removes an entry, returning whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let full = self.full_key(key);
        self.lru.remove(&full);
        self.entries.remove(&full).is_some()
    }

    /// Removes every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    /// Live and not-yet-swept keys with the namespace prefix stripped, sorted.
    pub fn keys(&self) -> Vec<String> {
        let prefix_len = self.namespace.len() + 1;
        let mut keys: Vec<String> = self
            .entries
            .keys()
            .map(|full| full[prefix_len..].to_string())
            .collect();
        keys.sort();
        keys
    }

    /// Read-only view of an entry's metadata, expired or not.
    pub fn peek_entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(&self.full_key(key))
    }

    // == Cleanup ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.counters.expirations += expired.len() as u64;
        expired.len()
    }

    // == Stats ==
    /// Returns a diagnostic snapshot without mutating any entry.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        CacheStats {
            namespace: self.namespace.clone(),
            size: self.entries.len(),
            max_size: self.max_size,
            total_access_count: self.entries.values().map(|e| e.access_count).sum(),
            expired_count: self
                .entries
                .values()
                .filter(|e| e.is_expired_at(now))
                .count(),
            hits: self.counters.hits,
            misses: self.counters.misses,
            evictions: self.counters.evictions,
            expirations: self.counters.expirations,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn remove_if_expired(&mut self, full: &str, now: Instant) -> bool {
        let expired = self
            .entries
            .get(full)
            .is_some_and(|entry| entry.is_expired_at(now));
        if expired {
            self.entries.remove(full);
            self.lru.remove(full);
            self.counters.expirations += 1;
        }
        expired
    }
}
