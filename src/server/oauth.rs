//! OAuth endpoints: authorize redirect and callback token exchange.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::ApiError;
use super::found_redirect;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct CallbackParams {
    code: Option<String>,
}

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
}

/// `GET /api/auth` — redirects the browser to the GitHub authorize URL.
pub(super) async fn authorize(State(state): State<AppState>) -> Result<Response, ApiError> {
    let Some(client_id) = state.options.github_client_id.as_deref() else {
        tracing::error!("GitHub client id is not configured");
        return Err(ApiError::Internal {
            message: "Missing Client Id".to_owned(),
        });
    };

    let destination = format!(
        "{base}/login/oauth/authorize?client_id={client_id}",
        base = state.options.oauth_base_url.trim_end_matches('/')
    );

    Ok(found_redirect(&destination))
}

/// `GET /api/oauth-callback` — exchanges the code for a token, stores the
/// user, and redirects to the frontend dashboard.
pub(super) async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let Some(code) = params.code.filter(|value| !value.is_empty()) else {
        return Err(ApiError::bad_request("Missing code parameter"));
    };

    let (Some(client_id), Some(client_secret)) = (
        state.options.github_client_id.as_deref(),
        state.options.github_client_secret.as_deref(),
    ) else {
        tracing::error!("GitHub OAuth credentials are not configured");
        return Err(ApiError::Internal {
            message: "Authentication failed".to_owned(),
        });
    };

    let endpoint = format!(
        "{base}/login/oauth/access_token",
        base = state.options.oauth_base_url.trim_end_matches('/')
    );
    let response = state
        .http
        .post(endpoint)
        .header(header::ACCEPT, "application/json")
        .json(&TokenExchangeRequest {
            client_id,
            client_secret,
            code: &code,
        })
        .send()
        .await
        .map_err(|error| ApiError::internal("Authentication failed", &error))?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(ApiError::internal(
            "Authentication failed",
            &format!("token exchange returned {status}"),
        ));
    }

    let payload: TokenExchangeResponse = response
        .json()
        .await
        .map_err(|error| ApiError::internal("Authentication failed", &error))?;

    let Some(access_token) = payload.access_token.filter(|value| !value.is_empty()) else {
        tracing::error!("no access token received from GitHub");
        return Err(ApiError::Internal {
            message: "Failed to obtain access token".to_owned(),
        });
    };

    let user = state
        .with_store(move |store| store.create_user(&access_token))
        .await
        .map_err(|error| ApiError::internal("Authentication failed", &error))?;

    let mut destination = Url::parse(&state.options.frontend_dashboard_url)
        .map_err(|error| ApiError::internal("Authentication failed", &error))?;
    destination
        .query_pairs_mut()
        .append_pair("userId", &user.id.to_string())
        .append_pair("token", &user.github_token);
    tracing::info!(user_id = user.id, "authenticated new dashboard user");

    Ok(found_redirect(destination.as_str()))
}
