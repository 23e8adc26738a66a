//! Version-keyed memoization for expensive derived values
//!
//! Every cached value records the graph version it was computed against.
//! A structural mutation bumps the graph version, which makes every prior
//! entry unreadable; callers can also clear slots eagerly. Cache state is
//! exposed as first-class status entries so callers detect staleness
//! without inferring it from timing.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A named derived value plus the graph version it was computed against
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub graph_version: u64,
    pub computed_at: DateTime<Utc>,
}

/// One memoization slot for a derived value of type `T`
#[derive(Debug, Default)]
pub struct CacheSlot<T> {
    entry: Option<CacheEntry<T>>,
}

impl<T> CacheSlot<T> {
    pub fn new() -> Self {
        CacheSlot { entry: None }
    }

    /// Read the cached value, valid only if no mutation happened since it
    /// was computed.
    pub fn get(&self, current_version: u64) -> Option<&T> {
        self.entry
            .as_ref()
            .filter(|e| e.graph_version == current_version)
            .map(|e| &e.value)
    }

    pub fn put(&mut self, value: T, graph_version: u64) -> &T {
        let entry = self.entry.insert(CacheEntry {
            value,
            graph_version,
            computed_at: Utc::now(),
        });
        &entry.value
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Status line for this slot, if anything is cached at all.
    pub fn status(&self, name: &str, current_version: u64) -> Option<CacheStatusEntry> {
        self.entry.as_ref().map(|e| CacheStatusEntry {
            name: name.to_string(),
            graph_version: e.graph_version,
            stale: e.graph_version != current_version,
            age_seconds: (Utc::now() - e.computed_at).num_seconds().max(0),
        })
    }
}

/// Queryable cache status for one cached stat
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatusEntry {
    pub name: String,
    pub graph_version: u64,
    pub stale: bool,
    pub age_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_requires_matching_version() {
        let mut slot = CacheSlot::new();
        assert!(slot.get(1).is_none());

        slot.put(42, 1);
        assert_eq!(slot.get(1), Some(&42));
        assert!(slot.get(2).is_none()); // mutated since computation
    }

    #[test]
    fn test_status_reports_staleness() {
        let mut slot = CacheSlot::new();
        assert!(slot.status("betweenness", 1).is_none());

        slot.put(vec![1.0], 1);
        let fresh = slot.status("betweenness", 1).unwrap();
        assert!(!fresh.stale);
        assert_eq!(fresh.graph_version, 1);

        let stale = slot.status("betweenness", 2).unwrap();
        assert!(stale.stale);
    }

    #[test]
    fn test_clear() {
        let mut slot = CacheSlot::new();
        slot.put("stats", 3);
        slot.clear();
        assert!(slot.get(3).is_none());
    }
}
