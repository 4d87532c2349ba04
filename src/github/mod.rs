//! GitHub upstream client: repositories, commits, and pull requests.
//!
//! This module wraps Octocrab to list repositories, resolve branches, and
//! fetch commits and closed pull requests with a stored per-user token.
//! Errors are mapped into precise variants so route handlers can surface
//! the upstream status without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;

pub use error::GithubError;
pub use gateway::{GithubGateway, OctocrabGithubGateway};
pub use locator::{AccessToken, RepositoryLocator, RepositoryName, RepositoryOwner};
pub use models::{CommitListQuery, RepoMetadata, UpstreamCommit, UpstreamPullRequest};

#[cfg(test)]
pub use gateway::MockGithubGateway;
