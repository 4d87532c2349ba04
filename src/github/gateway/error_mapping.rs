//! Error mapping helpers for the Octocrab gateway implementation.

use http::StatusCode;

use crate::github::error::GithubError;

/// Checks if a GitHub error status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Checks if an octocrab error represents a network/transport issue.
pub(super) const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

/// Checks whether the GitHub error represents a rate limit response based on
/// the HTTP status and message / documentation URL content.
pub(super) fn is_rate_limit_error(source: &octocrab::GitHubError) -> bool {
    let is_rate_limit_status = matches!(
        source.status_code,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    );

    let message_indicates_rate_limit = source.message.to_lowercase().contains("rate limit")
        || source
            .documentation_url
            .as_deref()
            .is_some_and(|url| url.contains("rate-limit"));

    is_rate_limit_status && message_indicates_rate_limit
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> GithubError {
    if let octocrab::Error::GitHub { source, .. } = error {
        if is_rate_limit_error(source) {
            return GithubError::RateLimited {
                message: format!("{operation} failed: {message}", message = source.message),
            };
        }

        return if is_auth_failure(source.status_code) {
            GithubError::Authentication {
                status: source.status_code.as_u16(),
                message: format!(
                    "{operation} failed: GitHub returned {status} {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        } else {
            GithubError::Api {
                status: Some(source.status_code.as_u16()),
                message: format!(
                    "{operation} failed with status {status}: {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        };
    }

    if is_network_error(error) {
        return GithubError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    GithubError::Api {
        status: None,
        message: format!("{operation} failed: {error}"),
    }
}
