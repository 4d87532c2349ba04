//! Data models for repositories, commits, and pull requests.
//!
//! Types prefixed with `Api` are internal deserialisation targets for
//! GitHub REST responses that convert into the public domain types consumed
//! by route handlers.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Repository metadata shown on the dashboard listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMetadata {
    /// GitHub repository id.
    pub id: u64,
    /// Repository name without the owner prefix.
    pub name: String,
    /// Owner login.
    pub owner: String,
    /// The `owner/name` form.
    pub full_name: String,
    /// Default branch when GitHub reports one.
    pub default_branch: Option<String>,
}

/// A commit as returned by the upstream commit listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamCommit {
    /// Commit SHA.
    pub sha: String,
    /// Full commit message.
    pub message: String,
    /// Commit author name.
    pub author: String,
    /// Author timestamp.
    pub date: DateTime<Utc>,
}

/// A closed pull request as returned by the upstream listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPullRequest {
    /// Pull request title.
    pub title: String,
    /// Pull request body when present.
    pub body: Option<String>,
    /// When the pull request was closed.
    pub closed_at: Option<DateTime<Utc>>,
}

/// Query parameters for the upstream commit listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitListQuery {
    /// Head SHA or branch to list from.
    pub sha: Option<String>,
    /// Lower bound timestamp (ISO 8601), passed through verbatim.
    pub since: Option<String>,
    /// Maximum number of commits to return.
    pub per_page: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRepo {
    pub(super) id: u64,
    pub(super) name: String,
    pub(super) owner: Option<ApiUser>,
    pub(super) full_name: String,
    pub(super) default_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRepoDetails {
    pub(super) default_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiBranch {
    pub(super) commit: ApiBranchCommit,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiBranchCommit {
    pub(super) sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCommit {
    pub(super) sha: String,
    pub(super) commit: ApiCommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCommitDetail {
    pub(super) message: String,
    pub(super) author: Option<ApiCommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCommitAuthor {
    pub(super) name: Option<String>,
    pub(super) date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) title: Option<String>,
    pub(super) body: Option<String>,
    pub(super) closed_at: Option<DateTime<Utc>>,
}

impl From<ApiRepo> for RepoMetadata {
    fn from(value: ApiRepo) -> Self {
        Self {
            id: value.id,
            name: value.name,
            owner: value
                .owner
                .and_then(|owner| owner.login)
                .unwrap_or_default(),
            full_name: value.full_name,
            default_branch: value.default_branch,
        }
    }
}

impl From<ApiCommit> for UpstreamCommit {
    fn from(value: ApiCommit) -> Self {
        let author = value.commit.author;
        Self {
            sha: value.sha,
            message: value.commit.message,
            author: author
                .as_ref()
                .and_then(|details| details.name.clone())
                .unwrap_or_else(|| "unknown".to_owned()),
            date: author
                .and_then(|details| details.date)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        }
    }
}

impl From<ApiPullRequest> for UpstreamPullRequest {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            title: value.title.unwrap_or_default(),
            body: value.body,
            closed_at: value.closed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiCommit, ApiRepo, RepoMetadata, UpstreamCommit};

    #[test]
    fn api_repo_flattens_owner_login() {
        let api: ApiRepo = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "hello-world",
            "owner": { "login": "octocat" },
            "full_name": "octocat/hello-world",
            "default_branch": "main"
        }))
        .expect("repo payload should deserialise");

        let metadata = RepoMetadata::from(api);
        assert_eq!(metadata.owner, "octocat");
        assert_eq!(metadata.full_name, "octocat/hello-world");
        assert_eq!(metadata.default_branch.as_deref(), Some("main"));
    }

    #[test]
    fn api_commit_defaults_missing_author_fields() {
        let api: ApiCommit = serde_json::from_value(serde_json::json!({
            "sha": "abc123",
            "commit": { "message": "fix: a bug" }
        }))
        .expect("commit payload should deserialise");

        let commit = UpstreamCommit::from(api);
        assert_eq!(commit.author, "unknown");
        assert_eq!(commit.date.timestamp(), 0);
    }
}
