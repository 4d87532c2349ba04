//! Redis-backed response cache.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::error::CacheError;
use super::key::CacheKey;
use super::ResponseCache;

/// Response cache backed by a Redis connection manager.
///
/// The manager multiplexes one connection and reconnects on failure, so the
/// cache handle is cheap to clone and share across handlers.
#[derive(Clone)]
pub struct RedisResponseCache {
    connection: ConnectionManager,
}

impl RedisResponseCache {
    /// Connects to the Redis instance at `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidUrl`] when the URL cannot be parsed and
    /// [`CacheError::ConnectionFailed`] when the initial connection cannot
    /// be established.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url).map_err(|error| CacheError::InvalidUrl {
            message: error.to_string(),
        })?;

        let connection =
            ConnectionManager::new(client)
                .await
                .map_err(|error| CacheError::ConnectionFailed {
                    message: error.to_string(),
                })?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        connection
            .get::<_, Option<String>>(key.as_str())
            .await
            .map_err(|error| CacheError::Backend {
                message: format!("read {key} failed: {error}"),
            })
    }

    async fn put(&self, key: &CacheKey, payload: &str, ttl: Duration) -> Result<(), CacheError> {
        let ttl_seconds = ttl.as_secs();
        let mut connection = self.connection.clone();
        connection
            .set_ex::<_, _, ()>(key.as_str(), payload, ttl_seconds)
            .await
            .map_err(|error| CacheError::Backend {
                message: format!("write {key} failed: {error}"),
            })
    }
}
