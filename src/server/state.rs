//! Shared application state injected into route handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheKey, ResponseCache};
use crate::github::{GithubGateway, RepositoryLocator};
use crate::persistence::{PersistenceError, Store};
use crate::summarize::SummaryService;
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Server options resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// GitHub OAuth application client id.
    pub github_client_id: Option<String>,
    /// GitHub OAuth application client secret.
    pub github_client_secret: Option<String>,
    /// Base URL for the GitHub OAuth endpoints (overridable in tests).
    pub oauth_base_url: String,
    /// Frontend dashboard URL the OAuth callback redirects to.
    pub frontend_dashboard_url: String,
    /// Expiry applied to every cache write.
    pub cache_ttl: Duration,
    /// Statically configured repositories served by `/api/repos`.
    pub pinned_repositories: Vec<RepositoryLocator>,
}

/// Shared state composed by the process entry point.
///
/// Every dependency is an explicitly constructed, injected instance; there
/// is no lazily connected process-global anywhere in the request path.
#[derive(Clone)]
pub struct AppState {
    /// SQLite-backed store handle.
    pub store: Store,
    /// Read-through response cache.
    pub cache: Arc<dyn ResponseCache>,
    /// GitHub REST gateway.
    pub gateway: Arc<dyn GithubGateway>,
    /// Changelog summarization service.
    pub summarizer: Arc<dyn SummaryService>,
    /// HTTP client used for the OAuth token exchange.
    pub http: reqwest::Client,
    /// Telemetry sink for operational events.
    pub telemetry: Arc<dyn TelemetrySink>,
    /// Resolved server options.
    pub options: Arc<ServerOptions>,
}

impl AppState {
    /// Reads a cached payload, degrading any backend failure to a miss.
    pub(super) async fn cache_read(&self, key: &CacheKey) -> Option<String> {
        match self.cache.get(key).await {
            Ok(Some(payload)) => {
                tracing::debug!(key = %key, "cache hit");
                Some(payload)
            }
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "cache read failed; treating as miss");
                self.telemetry.record(TelemetryEvent::CacheBackendUnavailable {
                    operation: "read".to_owned(),
                    detail: error.to_string(),
                });
                None
            }
        }
    }

    /// Writes a payload to the cache; failures are logged, never fatal.
    pub(super) async fn cache_write(&self, key: &CacheKey, payload: &str) {
        if let Err(error) = self.cache.put(key, payload, self.options.cache_ttl).await {
            tracing::warn!(key = %key, error = %error, "cache write failed; continuing");
            self.telemetry.record(TelemetryEvent::CacheBackendUnavailable {
                operation: "write".to_owned(),
                detail: error.to_string(),
            });
        }
    }

    /// Runs a store operation on the blocking thread pool.
    pub(super) async fn with_store<T, F>(&self, operation: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(Store) -> Result<T, PersistenceError> + Send + 'static,
    {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || operation(store)).await {
            Ok(result) => result,
            Err(join_error) => Err(PersistenceError::QueryFailed {
                message: format!("blocking task failed: {join_error}"),
            }),
        }
    }
}
