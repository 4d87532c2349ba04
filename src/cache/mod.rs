//! Read-through response cache with TTL expiry.
//!
//! Responses are cached as the exact JSON strings returned to clients, so a
//! cache hit is byte-identical to the original response within the TTL
//! window. The backend is an explicitly constructed client owned by the
//! process entry point and injected into the server state; handlers treat
//! every backend failure as a miss.

mod error;
mod key;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;

pub use error::CacheError;
pub use key::CacheKey;
pub use self::redis::RedisResponseCache;

/// A key-value store for rendered JSON responses.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Fetches the cached payload stored under `key`, if any.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Stores `payload` under `key` with the given time-to-live.
    async fn put(&self, key: &CacheKey, payload: &str, ttl: Duration) -> Result<(), CacheError>;
}
