//! Octocrab client construction for the gateway implementation.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::GithubError;
use crate::github::locator::AccessToken;

use super::error_mapping::map_octocrab_error;

/// Builds an Octocrab client for the given API base URL, authenticated when
/// a token is supplied.
///
/// # Errors
///
/// Returns [`GithubError::InvalidApiBase`] when the base URI cannot be
/// parsed or [`GithubError::Api`] when Octocrab fails to construct a
/// client.
pub(super) fn build_octocrab_client(
    token: Option<&AccessToken>,
    api_base: &str,
) -> Result<Octocrab, GithubError> {
    let base_uri: Uri = api_base
        .parse::<Uri>()
        .map_err(|error| GithubError::InvalidApiBase(error.to_string()))?;

    let builder = Octocrab::builder();
    let builder = match token {
        Some(value) => builder.personal_token(value.as_ref()),
        None => builder,
    };

    builder
        .base_uri(base_uri)
        .map_err(|error| GithubError::Api {
            status: None,
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}
