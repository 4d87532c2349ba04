//! Error types exposed by the GitHub upstream client.

use thiserror::Error;

/// Errors surfaced while parsing repository input or talking to GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GithubError {
    /// The stored access token was missing or blank.
    #[error("GitHub access token is required")]
    MissingToken,

    /// The repository reference could not be parsed as `owner/name`.
    #[error("repository reference is invalid: {value}")]
    InvalidRepository {
        /// The reference that failed to parse.
        value: String,
    },

    /// The API base URL could not be parsed.
    #[error("GitHub API base URL is invalid: {0}")]
    InvalidApiBase(String),

    /// The access token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// HTTP status returned with the rejection (401 or 403).
        status: u16,
        /// GitHub error message returned with the response.
        message: String,
    },

    /// GitHub reported that the API rate limit was exhausted.
    ///
    /// Classification only; shiplog performs no retries or backoff.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimited {
        /// Error message from GitHub.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Upstream HTTP status when one was received.
        status: Option<u16>,
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },
}

impl GithubError {
    /// Upstream HTTP status to surface to API clients, when one is known.
    #[must_use]
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(403),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}
