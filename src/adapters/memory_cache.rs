// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory TTL cache adapter.
//!
//! This module provides `MemoryCache`, the default `ConfigCache`
//! implementation. Every stored item carries its own absolute expiry,
//! anchored at write time; an expired item is indistinguishable from an
//! absent one. Expired items are dropped lazily on access, there is no
//! background sweeper.

use crate::domain::ConfigurationEntry;
use crate::ports::ConfigCache;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Default item lifetime.
const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// One cached item together with its absolute expiry.
#[derive(Debug, Clone)]
struct Expiring<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Expiring<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Expiring {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Per-namespace cache state.
#[derive(Debug, Default)]
struct Shard {
    entries: HashMap<String, Expiring<ConfigurationEntry>>,
    all: Option<Expiring<Vec<ConfigurationEntry>>>,
    last_update: Option<Expiring<DateTime<Utc>>>,
}

/// An in-memory, per-item-TTL implementation of [`ConfigCache`].
///
/// Items written later than others expire later; an overwrite resets the
/// item's lifetime. The cache is sharded per application namespace so two
/// readers with different namespaces never observe each other's entries.
///
/// # Examples
///
/// ```rust
/// use dynconf::adapters::MemoryCache;
/// use dynconf::domain::ConfigurationEntry;
/// use dynconf::ports::ConfigCache;
///
/// let cache = MemoryCache::new();
/// cache.set(ConfigurationEntry::new("svc-a", "timeout", "30", "int"));
/// assert!(cache.get("svc-a", "timeout").is_some());
/// assert!(cache.get("svc-b", "timeout").is_none());
/// ```
#[derive(Debug)]
pub struct MemoryCache {
    shards: RwLock<HashMap<String, Shard>>,
    ttl: Duration,
}

impl MemoryCache {
    /// Creates a cache with the default 30 minute item lifetime.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates a cache whose items expire after `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        MemoryCache {
            shards: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn read_shards(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Shard>> {
        self.shards.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_shards(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Shard>> {
        self.shards.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigCache for MemoryCache {
    fn get(&self, app: &str, key: &str) -> Option<ConfigurationEntry> {
        let shards = self.read_shards();
        let item = shards.get(app)?.entries.get(key)?;
        if item.is_expired() {
            None
        } else {
            Some(item.value.clone())
        }
    }

    fn get_all(&self, app: &str) -> Vec<ConfigurationEntry> {
        let shards = self.read_shards();
        match shards.get(app).and_then(|s| s.all.as_ref()) {
            Some(item) if !item.is_expired() => item.value.clone(),
            _ => Vec::new(),
        }
    }

    fn set(&self, entry: ConfigurationEntry) {
        let mut shards = self.write_shards();
        let shard = shards.entry(entry.application_name.clone()).or_default();
        if let Some(all) = shard.all.as_mut().filter(|a| !a.is_expired()) {
            match all.value.iter_mut().find(|e| e.name == entry.name) {
                Some(existing) => *existing = entry.clone(),
                None => all.value.push(entry.clone()),
            }
        }
        shard
            .entries
            .insert(entry.name.clone(), Expiring::new(entry, self.ttl));
    }

    fn set_all(&self, app: &str, entries: Vec<ConfigurationEntry>) {
        let mut shards = self.write_shards();
        let shard = shards.entry(app.to_string()).or_default();
        for entry in &entries {
            shard
                .entries
                .insert(entry.name.clone(), Expiring::new(entry.clone(), self.ttl));
        }
        shard.all = Some(Expiring::new(entries, self.ttl));
    }

    fn remove(&self, app: &str, key: &str) {
        let mut shards = self.write_shards();
        if let Some(shard) = shards.get_mut(app) {
            shard.entries.remove(key);
            if let Some(all) = shard.all.as_mut() {
                all.value.retain(|e| e.name != key);
            }
        }
    }

    fn last_update_time(&self, app: &str) -> Option<DateTime<Utc>> {
        let shards = self.read_shards();
        let item = shards.get(app)?.last_update.as_ref()?;
        if item.is_expired() {
            None
        } else {
            Some(item.value)
        }
    }

    fn set_last_update_time(&self, app: &str, at: DateTime<Utc>) {
        let mut shards = self.write_shards();
        let shard = shards.entry(app.to_string()).or_default();
        shard.last_update = Some(Expiring::new(at, self.ttl));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn entry(app: &str, key: &str, value: &str) -> ConfigurationEntry {
        ConfigurationEntry::new(app, key, value, "string")
    }

    #[test]
    fn test_get_returns_none_when_empty() {
        let cache = MemoryCache::new();
        assert!(cache.get("app", "missing").is_none());
        assert!(cache.get_all("app").is_empty());
        assert!(cache.last_update_time("app").is_none());
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let cache = MemoryCache::new();
        cache.set(entry("app", "k", "v"));
        let got = cache.get("app", "k").unwrap();
        assert_eq!(got.value, "v");
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let cache = MemoryCache::new();
        cache.set(entry("app-a", "k", "a"));
        cache.set(entry("app-b", "k", "b"));
        assert_eq!(cache.get("app-a", "k").unwrap().value, "a");
        assert_eq!(cache.get("app-b", "k").unwrap().value, "b");
    }

    #[test]
    fn test_set_all_warms_singular_entries() {
        let cache = MemoryCache::new();
        cache.set_all(
            "app",
            vec![entry("app", "k1", "v1"), entry("app", "k2", "v2")],
        );
        assert_eq!(cache.get("app", "k1").unwrap().value, "v1");
        assert_eq!(cache.get("app", "k2").unwrap().value, "v2");
        assert_eq!(cache.get_all("app").len(), 2);
    }

    #[test]
    fn test_set_leaves_absent_all_view_untouched() {
        let cache = MemoryCache::new();
        cache.set(entry("app", "k", "v"));
        assert!(cache.get_all("app").is_empty());
    }

    #[test]
    fn test_set_updates_present_all_view_in_place() {
        let cache = MemoryCache::new();
        cache.set_all("app", vec![entry("app", "k1", "v1")]);
        cache.set(entry("app", "k1", "changed"));
        cache.set(entry("app", "k2", "new"));
        let all = cache.get_all("app");
        assert_eq!(all.len(), 2);
        assert_eq!(
            all.iter().find(|e| e.name == "k1").unwrap().value,
            "changed"
        );
    }

    #[test]
    fn test_remove_drops_from_both_views() {
        let cache = MemoryCache::new();
        cache.set_all("app", vec![entry("app", "k1", "v1"), entry("app", "k2", "v2")]);
        cache.remove("app", "k1");
        assert!(cache.get("app", "k1").is_none());
        assert_eq!(cache.get_all("app").len(), 1);
        // removing again is a no-op
        cache.remove("app", "k1");
        cache.remove("other", "k1");
    }

    #[test]
    fn test_items_expire_after_ttl() {
        let cache = MemoryCache::with_ttl(Duration::from_millis(40));
        cache.set(entry("app", "k", "v"));
        cache.set_last_update_time("app", Utc::now());
        assert!(cache.get("app", "k").is_some());
        assert!(cache.last_update_time("app").is_some());
        thread::sleep(Duration::from_millis(60));
        assert!(cache.get("app", "k").is_none());
        assert!(cache.last_update_time("app").is_none());
    }

    #[test]
    fn test_overwrite_resets_item_lifetime() {
        let cache = MemoryCache::with_ttl(Duration::from_millis(80));
        cache.set(entry("app", "k", "old"));
        thread::sleep(Duration::from_millis(50));
        cache.set(entry("app", "k", "new"));
        thread::sleep(Duration::from_millis(50));
        // first write would have expired by now, but the overwrite re-anchored it
        assert_eq!(cache.get("app", "k").unwrap().value, "new");
    }

    #[test]
    fn test_last_update_time_round_trips() {
        let cache = MemoryCache::new();
        let at = Utc::now();
        cache.set_last_update_time("app", at);
        assert_eq!(cache.last_update_time("app"), Some(at));
    }
}
