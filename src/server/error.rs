//! API error type rendered as JSON error bodies.
//!
//! Taxonomy per route contract: client input errors map to 400, unknown
//! users/repos to 404, and upstream/LLM/database failures to 500 (or the
//! upstream status when one was received) with a generic public message.
//! Details are logged server-side only.

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::github::GithubError;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing or malformed request input.
    BadRequest {
        /// Public message returned in the error body.
        message: String,
    },

    /// A referenced user or repository does not exist.
    NotFound {
        /// Public message returned in the error body.
        message: String,
    },

    /// An upstream call failed with a known status, surfaced directly.
    Upstream {
        /// Upstream HTTP status propagated to the client.
        status: StatusCode,
        /// Public message returned in the error body.
        message: String,
    },

    /// Any other failure; details live in the server log only.
    Internal {
        /// Public message returned in the error body.
        message: String,
    },
}

impl ApiError {
    /// Constructs a 400 response.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Constructs a 404 response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Constructs a 500 response, logging the detail server-side.
    #[must_use]
    pub fn internal(message: impl Into<String>, detail: &dyn fmt::Display) -> Self {
        let public = message.into();
        tracing::error!(detail = %detail, public = %public, "request failed");
        Self::Internal { message: public }
    }

    /// Maps a GitHub error, propagating the upstream status when known.
    #[must_use]
    pub fn from_github(message: &str, error: &GithubError) -> Self {
        tracing::error!(error = %error, public = %message, "GitHub request failed");
        match error.upstream_status() {
            Some(code) => Self::Upstream {
                status: StatusCode::from_u16(code)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message: message.to_owned(),
            },
            None => Self::Internal {
                message: message.to_owned(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            Self::NotFound { message } => (StatusCode::NOT_FOUND, message),
            Self::Upstream { status, message } => (status, message),
            Self::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
