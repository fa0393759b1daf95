use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CAPACITY: usize = 50;

struct CacheEntry {
    data: Value,
    inserted: Instant,
}

/// Bounded memoization for AI-operation results, keyed by operation name plus
/// canonicalized parameters.
///
/// An entry is valid while `now - inserted < ttl`; stale entries are evicted
/// on lookup. When the map grows past capacity, the oldest-*inserted* entry is
/// evicted — insertion-order eviction, deliberately not LRU. The cache is
/// in-process only: owned by whoever constructs it, never shared across tabs,
/// gone on reload.
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
    ttl: Duration,
    capacity: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }

    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if entry.inserted.elapsed() < self.ttl => Some(entry.data.clone()),
            Some(_) => {
                self.entries.remove(key);
                self.order.retain(|k| k != key);
                None
            }
            None => None,
        }
    }

    /// Inserts or overwrites. Overwriting refreshes the entry's insertion
    /// position, like a `Map` delete-then-insert.
    pub fn set(&mut self, key: &str, data: Value) {
        let replaced = self
            .entries
            .insert(
                key.to_string(),
                CacheEntry {
                    data,
                    inserted: Instant::now(),
                },
            )
            .is_some();
        if replaced {
            self.order.retain(|k| k != key);
        }
        self.order.push_back(key.to_string());

        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derives the cache key: operation name plus the canonical JSON encoding of
/// the parameters (serde_json orders map keys, so equal params encode equal).
pub fn cache_key<T: Serialize>(operation: &str, params: &T) -> String {
    let canonical = serde_json::to_string(params).unwrap_or_else(|_| "null".to_string());
    format!("{}:{}", operation, canonical)
}
