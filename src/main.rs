//! Shiplog server entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use shiplog::cache::RedisResponseCache;
use shiplog::config::{ConfigError, ShiplogConfig};
use shiplog::persistence::{PersistenceError, Store, migrate_database};
use shiplog::server::{AppState, ServeError, ServerOptions, serve};
use shiplog::summarize::{GroqSummaryConfig, GroqSummaryService};
use shiplog::telemetry::StderrJsonlTelemetrySink;
use shiplog::{GithubError, OctocrabGithubGateway};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Startup errors surfaced to the operator.
#[derive(Debug, Error)]
enum AppError {
    /// Configuration could not be loaded or validated.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Database migration or store construction failed.
    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    /// The cache backend could not be reached.
    #[error("{0}")]
    Cache(#[from] shiplog::cache::CacheError),

    /// The GitHub gateway could not be constructed.
    #[error("{0}")]
    Github(#[from] GithubError),

    /// The summarization service could not be constructed.
    #[error("{0}")]
    Summarize(#[from] shiplog::summarize::SummaryError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),

    /// The server failed to start or crashed.
    #[error("{0}")]
    Serve(#[from] ServeError),
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    init_tracing();

    let config = load_config()?;
    let telemetry = Arc::new(StderrJsonlTelemetrySink);

    let database_url = config.require_database_url()?.to_owned();
    migrate_database(&database_url, telemetry.as_ref())?;
    let store = Store::new(database_url)?;

    let redis_url = config.require_redis_url()?;
    let cache = RedisResponseCache::connect(redis_url).await?;

    let gateway = OctocrabGithubGateway::new(config.github_api_base.clone())?;
    let summarizer = GroqSummaryService::new(GroqSummaryConfig {
        base_url: config.groq_base_url.clone(),
        model: config.groq_model.clone(),
        api_key: config.resolve_groq_api_key(),
        ..GroqSummaryConfig::default()
    })?;

    let http = reqwest::Client::builder()
        .build()
        .map_err(AppError::HttpClient)?;

    let options = ServerOptions {
        github_client_id: config.github_client_id.clone(),
        github_client_secret: config.resolve_github_client_secret(),
        oauth_base_url: config.github_oauth_base.clone(),
        frontend_dashboard_url: config.frontend_dashboard_url.clone(),
        cache_ttl: config.cache_ttl(),
        pinned_repositories: config.pinned_locators()?,
    };

    let state = AppState {
        store,
        cache: Arc::new(cache),
        gateway: Arc::new(gateway),
        summarizer: Arc::new(summarizer),
        http,
        telemetry,
        options: Arc::new(options),
    };

    serve(state, &config.bind_address).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shiplog=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ConfigError::LoadFailed`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<ShiplogConfig, AppError> {
    ShiplogConfig::load()
        .map_err(|error| {
            AppError::Config(ConfigError::LoadFailed {
                message: error.to_string(),
            })
        })
}
