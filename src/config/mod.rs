//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.shiplog.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `SHIPLOG_DATABASE_URL`,
//!    `SHIPLOG_REDIS_URL`, and friends; legacy fallbacks
//!    `GITHUB_CLIENT_SECRET` and `GROQ_API_KEY` are also honoured
//! 4. **Command-line arguments** – e.g. `--bind-address`
//!
//! # Configuration File
//!
//! Place `.shiplog.toml` in the current directory, home directory, or XDG
//! config directory with:
//!
//! ```toml
//! bind_address = "0.0.0.0:8080"
//! database_url = "shiplog.sqlite"
//! redis_url = "redis://127.0.0.1:6379"
//! github_client_id = "Iv1.example"
//! pinned_repositories = ["rust-lang/cargo"]
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::github::RepositoryLocator;

/// Errors surfaced while loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// ortho-config failed to parse arguments or load files.
    #[error("configuration error: {message}")]
    LoadFailed {
        /// Error detail from ortho-config.
        message: String,
    },

    /// No database URL was configured.
    #[error("database URL is required (use --database-url or SHIPLOG_DATABASE_URL)")]
    MissingDatabaseUrl,

    /// No Redis URL was configured.
    #[error("Redis URL is required (use --redis-url or SHIPLOG_REDIS_URL)")]
    MissingRedisUrl,

    /// A pinned repository entry was not an `owner/name` reference.
    #[error("pinned repository entry is invalid: {value}")]
    InvalidPinnedRepository {
        /// The entry that failed to parse.
        value: String,
    },
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `SHIPLOG_BIND_ADDRESS` or `--bind-address`: listen address
/// - `SHIPLOG_DATABASE_URL` or `--database-url`: `SQLite` database path
/// - `SHIPLOG_REDIS_URL` or `--redis-url`: Redis connection URL
/// - `SHIPLOG_GITHUB_CLIENT_ID` / `SHIPLOG_GITHUB_CLIENT_SECRET`: OAuth
///   application credentials (`GITHUB_CLIENT_SECRET` works as a legacy
///   fallback for the secret)
/// - `SHIPLOG_GROQ_API_KEY`: summarization provider key (`GROQ_API_KEY`
///   works as a legacy fallback)
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "SHIPLOG",
    discovery(
        dotfile_name = ".shiplog.toml",
        config_file_name = "shiplog.toml",
        app_name = "shiplog"
    )
)]
pub struct ShiplogConfig {
    /// Address the HTTP server binds to.
    ///
    /// Can be provided via:
    /// - CLI: `--bind-address <ADDR>` or `-b <ADDR>`
    /// - Environment: `SHIPLOG_BIND_ADDRESS`
    /// - Config file: `bind_address = "..."`
    #[ortho_config(cli_short = 'b')]
    pub bind_address: String,

    /// `SQLite` database URL/path used for persistence.
    ///
    /// Diesel uses a filesystem path for `SQLite` connections. The same
    /// value is also used by the Diesel CLI via `DATABASE_URL` when running
    /// migrations.
    #[ortho_config()]
    pub database_url: Option<String>,

    /// Redis URL for the response cache.
    #[ortho_config()]
    pub redis_url: Option<String>,

    /// GitHub OAuth application client id.
    #[ortho_config()]
    pub github_client_id: Option<String>,

    /// GitHub OAuth application client secret.
    ///
    /// Falls back to the `GITHUB_CLIENT_SECRET` environment variable when
    /// unset.
    #[ortho_config()]
    pub github_client_secret: Option<String>,

    /// Base URL of the GitHub REST API.
    ///
    /// Overridable for GitHub Enterprise deployments and tests.
    #[ortho_config()]
    pub github_api_base: String,

    /// Base URL of the GitHub OAuth endpoints.
    #[ortho_config()]
    pub github_oauth_base: String,

    /// Frontend dashboard URL the OAuth callback redirects to.
    #[ortho_config()]
    pub frontend_dashboard_url: String,

    /// API key for the summarization provider.
    ///
    /// Falls back to the `GROQ_API_KEY` environment variable when unset.
    #[ortho_config()]
    pub groq_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible summarization API.
    #[ortho_config()]
    pub groq_base_url: String,

    /// Model identifier sent in chat-completions requests.
    #[ortho_config()]
    pub groq_model: String,

    /// Expiry in seconds applied to every cache write.
    #[ortho_config()]
    pub cache_ttl_seconds: u64,

    /// Statically configured `owner/name` references served by
    /// `/api/repos`.
    #[ortho_config()]
    pub pinned_repositories: Vec<String>,
}

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_GITHUB_OAUTH_BASE: &str = "https://github.com";
const DEFAULT_FRONTEND_DASHBOARD_URL: &str = "http://localhost:3000/dashboard";
const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_GROQ_MODEL: &str = "llama-3.1-70b-versatile";
const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;

impl Default for ShiplogConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_owned(),
            database_url: None,
            redis_url: None,
            github_client_id: None,
            github_client_secret: None,
            github_api_base: DEFAULT_GITHUB_API_BASE.to_owned(),
            github_oauth_base: DEFAULT_GITHUB_OAUTH_BASE.to_owned(),
            frontend_dashboard_url: DEFAULT_FRONTEND_DASHBOARD_URL.to_owned(),
            groq_api_key: None,
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_owned(),
            groq_model: DEFAULT_GROQ_MODEL.to_owned(),
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            pinned_repositories: Vec::new(),
        }
    }
}

impl ShiplogConfig {
    /// Returns the database URL or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when unset.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)
    }

    /// Returns the Redis URL or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRedisUrl`] when unset.
    pub fn require_redis_url(&self) -> Result<&str, ConfigError> {
        self.redis_url.as_deref().ok_or(ConfigError::MissingRedisUrl)
    }

    /// Resolves the OAuth client secret from configuration or the legacy
    /// `GITHUB_CLIENT_SECRET` environment variable.
    #[must_use]
    pub fn resolve_github_client_secret(&self) -> Option<String> {
        self.github_client_secret
            .clone()
            .or_else(|| env::var("GITHUB_CLIENT_SECRET").ok())
    }

    /// Resolves the summarization API key from configuration or the legacy
    /// `GROQ_API_KEY` environment variable.
    #[must_use]
    pub fn resolve_groq_api_key(&self) -> Option<String> {
        self.groq_api_key
            .clone()
            .or_else(|| env::var("GROQ_API_KEY").ok())
    }

    /// The cache expiry as a [`Duration`].
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Parses the pinned repository entries into locators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPinnedRepository`] for any entry that
    /// is not an `owner/name` reference.
    pub fn pinned_locators(&self) -> Result<Vec<RepositoryLocator>, ConfigError> {
        self.pinned_repositories
            .iter()
            .map(|entry| {
                RepositoryLocator::from_full_name(entry).map_err(|_| {
                    ConfigError::InvalidPinnedRepository {
                        value: entry.clone(),
                    }
                })
            })
            .collect()
    }
}
