//! HTTP server: router assembly and the serve loop.
//!
//! Handlers are stateless beyond the shared [`AppState`]; each one is a
//! single request/response cycle with no session or connection state.

mod dashboard;
mod error;
mod oauth;
mod repos;
mod state;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use thiserror::Error;
use tokio::net::TcpListener;

pub use error::ApiError;
pub use state::{AppState, ServerOptions};

/// Errors surfaced while starting or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Binding the listener failed.
    #[error("failed to bind {address}: {message}")]
    Bind {
        /// The address that could not be bound.
        address: String,
        /// Error detail from the listener.
        message: String,
    },

    /// The accept loop failed.
    #[error("server error: {message}")]
    Io {
        /// Error detail from the server loop.
        message: String,
    },
}

/// Assembles the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth", get(oauth::authorize))
        .route("/api/oauth-callback", get(oauth::callback))
        .route("/api/dashboard", get(dashboard::repositories))
        .route("/api/dashboard/commits", get(dashboard::commits))
        .route("/api/dashboard/summarize", get(dashboard::summarize))
        .route("/api/repos", get(repos::pinned_repositories))
        .route("/api/repos/{owner}/{repo}/changelogs", get(repos::changelogs))
        .with_state(state)
}

/// Binds the listener and serves requests until the process stops.
///
/// # Errors
///
/// Returns [`ServeError`] when the address cannot be bound or the accept
/// loop fails.
pub async fn serve(state: AppState, bind_address: &str) -> Result<(), ServeError> {
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(|error| ServeError::Bind {
            address: bind_address.to_owned(),
            message: error.to_string(),
        })?;

    if let Ok(address) = listener.local_addr() {
        tracing::info!(%address, "listening");
    }

    axum::serve(listener, router(state))
        .await
        .map_err(|error| ServeError::Io {
            message: error.to_string(),
        })
}

/// Wraps an already serialised JSON payload in a 200 response.
///
/// Cached payloads are returned through this same path, which keeps cache
/// hits byte-identical to the response that populated them.
pub(crate) fn json_payload(payload: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        payload,
    )
        .into_response()
}

/// A plain 302 redirect.
pub(crate) fn found_redirect(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_owned())],
    )
        .into_response()
}
