//! Process-local user data store.
//!
//! Key-value persistence with get/set/expire semantics for the preference
//! profile, watchlist, and favorites. Entries optionally carry a TTL and are
//! evicted lazily on read.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Well-known store keys
pub mod keys {
    pub const PREFERENCES: &str = "preferences";
    pub const WATCHLIST: &str = "watchlist";
    pub const FAVORITES: &str = "favorites";
    pub const HISTORY: &str = "history";
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: serde_json::Value,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// In-memory keyed JSON store with per-entry TTL
#[derive(Debug, Default)]
pub struct UserDataStore {
    entries: HashMap<String, StoredEntry>,
}

impl UserDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under a key, optionally expiring after `ttl`
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T, ttl: Option<Duration>) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to serialize stored value");
                return;
            }
        };

        self.entries.insert(
            key.to_string(),
            StoredEntry {
                value,
                expires_at: ttl.map(|d| Utc::now() + d),
            },
        );
    }

    /// Reads a value, evicting it first if its TTL has elapsed
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let now = Utc::now();

        if self.entries.get(key).is_some_and(|e| e.is_expired(now)) {
            self.entries.remove(key);
            return None;
        }

        self.entries
            .get(key)
            .and_then(|e| serde_json::from_value(e.value.clone()).ok())
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drops every expired entry
    pub fn purge_expired(&mut self) {
        let now = Utc::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_round_trip() {
        let mut store = UserDataStore::new();
        store.set(keys::WATCHLIST, &vec![1u64, 2, 3], None);

        let watchlist: Vec<u64> = store.get(keys::WATCHLIST).unwrap();
        assert_eq!(watchlist, vec![1, 2, 3]);
    }

    #[test]
    fn test_get_missing_key() {
        let mut store = UserDataStore::new();
        assert_eq!(store.get::<String>("nope"), None);
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let mut store = UserDataStore::new();
        store.set("ephemeral", &"value", Some(Duration::milliseconds(-1)));

        assert_eq!(store.get::<String>("ephemeral"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_unexpired_entry_survives() {
        let mut store = UserDataStore::new();
        store.set("durable", &"value", Some(Duration::hours(24)));
        assert_eq!(store.get::<String>("durable"), Some("value".to_string()));
    }

    #[test]
    fn test_purge_expired_keeps_live_entries() {
        let mut store = UserDataStore::new();
        store.set("dead", &1, Some(Duration::milliseconds(-1)));
        store.set("live", &2, Some(Duration::hours(1)));
        store.set("forever", &3, None);

        store.purge_expired();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get::<i32>("live"), Some(2));
        assert_eq!(store.get::<i32>("forever"), Some(3));
    }
}
