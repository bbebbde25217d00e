//! Per-run memoization store

use reportcloud_expr::CacheKey;
use reportcloud_types::Value;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Address of one cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheSlot {
    /// Result of one aggregate occurrence
    Aggregate(CacheKey),
    /// Runtime state an element keeps for the duration of a run, such as
    /// the x position of a table column
    Named { owner: String, name: String },
}

impl CacheSlot {
    pub fn named(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl From<CacheKey> for CacheSlot {
    fn from(key: CacheKey) -> Self {
        Self::Aggregate(key)
    }
}

impl fmt::Display for CacheSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheSlot::Aggregate(key) => write!(f, "aggregate {}", key),
            CacheSlot::Named { owner, name } => write!(f, "{}/{}", owner, name),
        }
    }
}

/// Lookup counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub invalidations: u64,
}

/// Key to value map owned by one execution instance
#[derive(Debug, Clone, Default)]
pub struct ExecutionCache {
    entries: HashMap<CacheSlot, Value>,
    stats: CacheStats,
}

impl ExecutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value of `slot`, counting the lookup
    pub fn get(&mut self, slot: &CacheSlot) -> Option<&Value> {
        match self.entries.get(slot) {
            Some(value) => {
                self.stats.hits += 1;
                Some(value)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Cached value of `slot` without touching the counters
    pub fn peek(&self, slot: &CacheSlot) -> Option<&Value> {
        self.entries.get(slot)
    }

    pub fn contains(&self, slot: &CacheSlot) -> bool {
        self.entries.contains_key(slot)
    }

    /// Insert or replace. Returns the previous value.
    pub fn insert(&mut self, slot: CacheSlot, value: Value) -> Option<Value> {
        self.stats.stores += 1;
        self.entries.insert(slot, value)
    }

    /// Drop the entry of `slot`. Returns the removed value.
    pub fn remove(&mut self, slot: &CacheSlot) -> Option<Value> {
        let removed = self.entries.remove(slot);
        if removed.is_some() {
            self.stats.invalidations += 1;
        }
        removed
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replace_remove() {
        let mut cache = ExecutionCache::new();
        let slot = CacheSlot::named("Column1", "wc");

        assert!(cache.get(&slot).is_none());
        assert_eq!(cache.insert(slot.clone(), Value::Float64(1.5)), None);
        assert_eq!(cache.insert(slot.clone(), Value::Float64(2.5)), Some(Value::Float64(1.5)));
        assert_eq!(cache.get(&slot), Some(&Value::Float64(2.5)));
        assert_eq!(cache.remove(&slot), Some(Value::Float64(2.5)));
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.stores, stats.invalidations), (1, 1, 2, 1));
    }

    #[test]
    fn test_cached_null_is_distinct_from_missing() {
        let mut cache = ExecutionCache::new();
        let slot = CacheSlot::named("t", "x");
        cache.insert(slot.clone(), Value::Null);
        assert_eq!(cache.get(&slot), Some(&Value::Null));
    }
}
