//! LRU Tracker Module
//!
//! Keeps keys in strict recency order for eviction.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Each touch stamps the key with a fresh sequence number; the smallest
/// sequence is the least recently used key. Two accesses that share a
/// timestamp are still ordered by the sequence in which they happened.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Sequence -> key, oldest first
    order: BTreeMap<u64, String>,
    /// Key -> its current sequence
    positions: HashMap<String, u64>,
    next_seq: u64,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, tracking it if new.
    pub fn touch(&mut self, key: &str) {
        let seq = self.next_seq;
        self.next_seq += 1;

        match self.positions.get_mut(key) {
            Some(pos) => {
                if let Some(k) = self.order.remove(pos) {
                    self.order.insert(seq, k);
                }
                *pos = seq;
            }
            None => {
                self.positions.insert(key.to_string(), seq);
                self.order.insert(seq, key.to_string());
            }
        }
    }

    // == Remove ==
    /// Stops tracking a key. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(seq) = self.positions.remove(key) {
            self.order.remove(&seq);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.positions.remove(&key);
        Some(key)
    }

    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.values().next().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }
}
