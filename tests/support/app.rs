//! Shared test application harness.
//!
//! Builds the full router over a migrated temporary database, an in-memory
//! response cache, and wiremock doubles for both the GitHub API and the
//! summarization provider.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use shiplog::cache::memory::InMemoryResponseCache;
use shiplog::github::RepositoryLocator;
use shiplog::persistence::{Store, migrate_database};
use shiplog::server::{AppState, ServerOptions};
use shiplog::summarize::{GroqSummaryConfig, GroqSummaryService};
use shiplog::telemetry::NoopTelemetrySink;
use shiplog::OctocrabGithubGateway;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::MockServer;

/// Knobs for harness construction.
pub struct TestAppOptions {
    /// Pinned `owner/name` references served by `/api/repos`.
    pub pinned: Vec<String>,
    /// Whether OAuth client credentials are configured.
    pub oauth_credentials: bool,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            pinned: Vec::new(),
            oauth_credentials: true,
        }
    }
}

/// A fully wired application plus handles for assertions.
pub struct TestApp {
    /// GitHub API double; also serves the OAuth token exchange.
    pub github: MockServer,
    /// Summarization provider double.
    pub groq: MockServer,
    /// Store handle bound to the same temporary database as the app.
    pub store: Store,
    /// Cache handle shared with the app.
    pub cache: Arc<InMemoryResponseCache>,
    router: Router,
    _directory: TempDir,
}

impl TestApp {
    /// Spawns a harness with default options.
    pub async fn spawn() -> Self {
        Self::spawn_with(TestAppOptions::default()).await
    }

    /// Spawns a harness with explicit options.
    pub async fn spawn_with(options: TestAppOptions) -> Self {
        let github = MockServer::start().await;
        let groq = MockServer::start().await;

        let directory = TempDir::new().expect("temporary directory should be created");
        let database_url = directory
            .path()
            .join("shiplog.sqlite")
            .to_string_lossy()
            .into_owned();
        migrate_database(&database_url, &NoopTelemetrySink).expect("migration should succeed");
        let store = Store::new(database_url).expect("store should build");

        let cache = Arc::new(InMemoryResponseCache::new());
        let gateway =
            OctocrabGithubGateway::new(github.uri()).expect("gateway should build");
        let summarizer = GroqSummaryService::new(GroqSummaryConfig::new(
            groq.uri(),
            "llama-3.1-70b-versatile",
            Some("gsk_test".to_owned()),
            Duration::from_secs(2),
        ))
        .expect("summarizer should build");

        let pinned_repositories: Vec<RepositoryLocator> = options
            .pinned
            .iter()
            .map(|entry| {
                RepositoryLocator::from_full_name(entry).expect("pinned entry should parse")
            })
            .collect();

        let server_options = ServerOptions {
            github_client_id: options
                .oauth_credentials
                .then(|| "Iv1.testclient".to_owned()),
            github_client_secret: options.oauth_credentials.then(|| "testsecret".to_owned()),
            oauth_base_url: github.uri(),
            frontend_dashboard_url: "http://localhost:3000/dashboard".to_owned(),
            cache_ttl: Duration::from_secs(3600),
            pinned_repositories,
        };

        let state = AppState {
            store: store.clone(),
            cache: cache.clone(),
            gateway: Arc::new(gateway),
            summarizer: Arc::new(summarizer),
            http: reqwest::Client::new(),
            telemetry: Arc::new(NoopTelemetrySink),
            options: Arc::new(server_options),
        };

        Self {
            github,
            groq,
            store,
            cache,
            router: shiplog::server::router(state),
            _directory: directory,
        }
    }

    /// Issues a GET request against the router and returns status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self.request(uri).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = String::from_utf8(bytes.to_vec()).expect("body should be UTF-8");
        (status, body)
    }

    /// Issues a GET request and returns status and the `Location` header.
    pub async fn get_redirect(&self, uri: &str) -> (StatusCode, Option<String>) {
        let response = self.request(uri).await;
        let status = response.status();
        let location = response
            .headers()
            .get(axum::http::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        (status, location)
    }

    async fn request(&self, uri: &str) -> axum::response::Response {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond")
    }

    /// Issues a GET request and parses the JSON response body.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        let value = serde_json::from_str(&body)
            .unwrap_or_else(|error| panic!("body should be JSON ({error}): {body}"));
        (status, value)
    }
}
