//! In-memory response cache used by tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::error::CacheError;
use super::key::CacheKey;
use super::ResponseCache;

/// Response cache backed by a process-local map.
///
/// Entries never expire; tests that care about TTL semantics assert on the
/// recorded `ttl` values instead of waiting for wall-clock expiry.
#[derive(Debug, Default)]
pub struct InMemoryResponseCache {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    payload: String,
    ttl: Duration,
}

impl InMemoryResponseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the TTL the given key was stored with, if present.
    ///
    /// # Panics
    ///
    /// Panics when the internal mutex is poisoned.
    #[must_use]
    pub fn recorded_ttl(&self, key: &CacheKey) -> Option<Duration> {
        self.entries
            .lock()
            .expect("cache mutex should be available")
            .get(key.as_str())
            .map(|entry| entry.ttl)
    }

    /// Number of stored entries.
    ///
    /// # Panics
    ///
    /// Panics when the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("cache mutex should be available")
            .len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        Ok(self
            .entries
            .lock()
            .map_err(|error| CacheError::Backend {
                message: error.to_string(),
            })?
            .get(key.as_str())
            .map(|entry| entry.payload.clone()))
    }

    async fn put(&self, key: &CacheKey, payload: &str, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .lock()
            .map_err(|error| CacheError::Backend {
                message: error.to_string(),
            })?
            .insert(
                key.as_str().to_owned(),
                StoredEntry {
                    payload: payload.to_owned(),
                    ttl,
                },
            );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{CacheKey, InMemoryResponseCache, ResponseCache};

    #[tokio::test]
    async fn get_returns_exactly_what_was_put() {
        let cache = InMemoryResponseCache::new();
        let key = CacheKey::user_repos(1);

        cache
            .put(&key, r#"[{"id":1}]"#, Duration::from_secs(3600))
            .await
            .expect("put should succeed");

        let value = cache.get(&key).await.expect("get should succeed");
        assert_eq!(value.as_deref(), Some(r#"[{"id":1}]"#));
        assert_eq!(cache.recorded_ttl(&key), Some(Duration::from_secs(3600)));
    }

    #[tokio::test]
    async fn missing_key_is_a_miss() {
        let cache = InMemoryResponseCache::new();
        let value = cache
            .get(&CacheKey::user_repos(99))
            .await
            .expect("get should succeed");
        assert!(value.is_none());
        assert!(cache.is_empty());
    }
}
