//! Error types for the response cache backend.

use thiserror::Error;

/// Errors returned by the cache backend.
///
/// Route handlers degrade every cache failure to a miss; these variants
/// exist so the degradation can be logged and recorded precisely.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The cache URL could not be parsed.
    #[error("cache URL is invalid: {message}")]
    InvalidUrl {
        /// Error detail from the client constructor.
        message: String,
    },

    /// Establishing the initial connection failed.
    #[error("failed to connect to cache backend: {message}")]
    ConnectionFailed {
        /// Error detail from the connection attempt.
        message: String,
    },

    /// A read or write against the backend failed.
    #[error("cache backend operation failed: {message}")]
    Backend {
        /// Error detail from the backend.
        message: String,
    },
}
