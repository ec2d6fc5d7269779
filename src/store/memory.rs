//! In-memory store backed by a concurrent map.

use dashmap::DashMap;
use std::sync::Arc;

use crate::store::{ConfigEntry, Store, StoreResult};

/// A thread-safe, non-persistent store.
///
/// Clones share the same map, so a handle kept by a test or the admin API
/// observes writes made through any other handle.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, ConfigEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Store for MemoryStore {
    fn entry(&self, key: &str) -> StoreResult<Option<ConfigEntry>> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn put(&self, key: &str, value: &str, description: &str) -> StoreResult<()> {
        self.inner
            .insert(key.to_string(), ConfigEntry::new(key, value, description));
        Ok(())
    }

    fn entries(&self) -> StoreResult<Vec<ConfigEntry>> {
        let mut entries: Vec<ConfigEntry> = self.inner.iter().map(|r| r.value().clone()).collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_vs_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.get("bot.token").unwrap(), None);
        assert!(!store.exists("bot.token").unwrap());

        store.put("bot.token", "", "Bot token").unwrap();
        assert_eq!(store.get("bot.token").unwrap(), Some(String::new()));
        assert!(store.exists("bot.token").unwrap());
        assert!(!store.entry("bot.token").unwrap().unwrap().is_resolved());
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryStore::new();
        let operator = store.clone();

        operator.put("bot.username", "helper_bot", "").unwrap();
        assert_eq!(store.get("bot.username").unwrap().as_deref(), Some("helper_bot"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_entries_sorted() {
        let store = MemoryStore::new();
        store.put("whisper.api.url", "", "").unwrap();
        store.put("bot.token", "", "").unwrap();

        let keys: Vec<_> = store.entries().unwrap().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["bot.token", "whisper.api.url"]);
    }
}
