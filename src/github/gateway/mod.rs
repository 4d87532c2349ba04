//! Trait-based gateway for the GitHub REST API.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests. Every call builds a fresh
//! Octocrab client so a per-user token can be attached when required;
//! unauthenticated calls (pull request listings for public repositories)
//! skip the token entirely.

mod client;
mod error_mapping;

use async_trait::async_trait;

use crate::github::error::GithubError;
use crate::github::locator::{AccessToken, RepositoryLocator};
use crate::github::models::{
    ApiBranch, ApiCommit, ApiPullRequest, ApiRepo, ApiRepoDetails, CommitListQuery, RepoMetadata,
    UpstreamCommit, UpstreamPullRequest,
};

use client::build_octocrab_client;
use error_mapping::map_octocrab_error;

/// Gateway covering the GitHub operations shiplog depends on.
///
/// No retry, backoff, or rate-limit handling happens here; a non-2xx
/// response maps to a [`GithubError`] carrying the upstream status.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GithubGateway: Send + Sync {
    /// Lists the repositories visible to the authenticated user.
    async fn list_user_repos(&self, token: &AccessToken)
    -> Result<Vec<RepoMetadata>, GithubError>;

    /// Looks up the default branch of a repository.
    async fn default_branch(
        &self,
        token: &AccessToken,
        locator: &RepositoryLocator,
    ) -> Result<String, GithubError>;

    /// Resolves a branch name to its head commit SHA.
    async fn branch_head(
        &self,
        token: &AccessToken,
        locator: &RepositoryLocator,
        branch: &str,
    ) -> Result<String, GithubError>;

    /// Lists commits for a repository, newest first as GitHub returns them.
    async fn list_commits<'a>(
        &self,
        token: Option<&'a AccessToken>,
        locator: &RepositoryLocator,
        query: &CommitListQuery,
    ) -> Result<Vec<UpstreamCommit>, GithubError>;

    /// Lists the most recently closed pull requests of a repository.
    async fn list_closed_pull_requests(
        &self,
        locator: &RepositoryLocator,
        per_page: u8,
    ) -> Result<Vec<UpstreamPullRequest>, GithubError>;
}

/// Octocrab-backed [`GithubGateway`] implementation.
#[derive(Debug, Clone)]
pub struct OctocrabGithubGateway {
    api_base: String,
}

impl OctocrabGithubGateway {
    /// Creates a gateway targeting the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::InvalidApiBase`] when the URL cannot be
    /// parsed.
    pub fn new(api_base: impl Into<String>) -> Result<Self, GithubError> {
        let api_base_string = api_base.into();
        // Fail fast on an unusable base URL rather than on the first request.
        build_octocrab_client(None, &api_base_string)?;
        Ok(Self {
            api_base: api_base_string,
        })
    }
}

#[async_trait]
impl GithubGateway for OctocrabGithubGateway {
    async fn list_user_repos(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<RepoMetadata>, GithubError> {
        let client = build_octocrab_client(Some(token), &self.api_base)?;
        let repos: Vec<ApiRepo> = client
            .get("/user/repos", None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("list repositories", &error))?;

        Ok(repos.into_iter().map(ApiRepo::into).collect())
    }

    async fn default_branch(
        &self,
        token: &AccessToken,
        locator: &RepositoryLocator,
    ) -> Result<String, GithubError> {
        let client = build_octocrab_client(Some(token), &self.api_base)?;
        let details: ApiRepoDetails = client
            .get(locator.repo_path(), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("repository details", &error))?;

        details.default_branch.ok_or_else(|| GithubError::Api {
            status: None,
            message: format!("repository {locator} reported no default branch"),
        })
    }

    async fn branch_head(
        &self,
        token: &AccessToken,
        locator: &RepositoryLocator,
        branch: &str,
    ) -> Result<String, GithubError> {
        let client = build_octocrab_client(Some(token), &self.api_base)?;
        let branch_info: ApiBranch = client
            .get(locator.branch_path(branch), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("branch lookup", &error))?;

        Ok(branch_info.commit.sha)
    }

    async fn list_commits<'a>(
        &self,
        token: Option<&'a AccessToken>,
        locator: &RepositoryLocator,
        query: &CommitListQuery,
    ) -> Result<Vec<UpstreamCommit>, GithubError> {
        let client = build_octocrab_client(token, &self.api_base)?;

        let mut params: Vec<(&str, String)> = vec![("per_page", query.per_page.to_string())];
        if let Some(sha) = query.sha.as_deref() {
            params.push(("sha", sha.to_owned()));
        }
        if let Some(since) = query.since.as_deref() {
            params.push(("since", since.to_owned()));
        }

        let commits: Vec<ApiCommit> = client
            .get(locator.commits_path(), Some(&params))
            .await
            .map_err(|error| map_octocrab_error("list commits", &error))?;

        let mut mapped: Vec<UpstreamCommit> =
            commits.into_iter().map(ApiCommit::into).collect();
        // The cap holds even when upstream ignores per_page.
        mapped.truncate(usize::from(query.per_page));
        Ok(mapped)
    }

    async fn list_closed_pull_requests(
        &self,
        locator: &RepositoryLocator,
        per_page: u8,
    ) -> Result<Vec<UpstreamPullRequest>, GithubError> {
        let client = build_octocrab_client(None, &self.api_base)?;
        let params = [
            ("state", "closed".to_owned()),
            ("per_page", per_page.to_string()),
        ];

        let pulls: Vec<ApiPullRequest> = client
            .get(locator.pulls_path(), Some(&params))
            .await
            .map_err(|error| map_octocrab_error("list pull requests", &error))?;

        Ok(pulls.into_iter().map(ApiPullRequest::into).collect())
    }
}
