//! Identity wrappers for repositories and access tokens.

use std::fmt;

use super::error::GithubError;

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, GithubError> {
        if value.is_empty() || value.contains('/') {
            return Err(GithubError::InvalidRepository {
                value: value.to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, GithubError> {
        if value.is_empty() || value.contains('/') {
            return Err(GithubError::InvalidRepository {
                value: value.to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// OAuth access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::MissingToken`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GithubError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GithubError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Token values never appear in logs or panic payloads.
        formatter.write_str("AccessToken(***)")
    }
}

/// Identifies a repository by owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    owner: RepositoryOwner,
    name: RepositoryName,
}

impl RepositoryLocator {
    /// Builds a locator from explicit owner and name values.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::InvalidRepository`] when either segment is
    /// empty or contains a slash.
    pub fn from_owner_repo(owner: &str, name: &str) -> Result<Self, GithubError> {
        Ok(Self {
            owner: RepositoryOwner::new(owner)?,
            name: RepositoryName::new(name)?,
        })
    }

    /// Parses an `owner/name` reference such as `rust-lang/cargo`.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::InvalidRepository`] when the reference does
    /// not contain exactly one slash separating two non-empty segments.
    pub fn from_full_name(value: &str) -> Result<Self, GithubError> {
        let Some((owner, name)) = value.split_once('/') else {
            return Err(GithubError::InvalidRepository {
                value: value.to_owned(),
            });
        };

        Self::from_owner_repo(owner, name).map_err(|_| GithubError::InvalidRepository {
            value: value.to_owned(),
        })
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn name(&self) -> &RepositoryName {
        &self.name
    }

    /// The `owner/name` form used as a natural key in persistence and
    /// cache keys.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.name.as_str())
    }

    /// API path for repository metadata.
    #[must_use]
    pub fn repo_path(&self) -> String {
        format!("/repos/{}/{}", self.owner.as_str(), self.name.as_str())
    }

    /// API path for a branch of this repository.
    #[must_use]
    pub fn branch_path(&self, branch: &str) -> String {
        format!(
            "/repos/{}/{}/branches/{branch}",
            self.owner.as_str(),
            self.name.as_str()
        )
    }

    /// API path for the commit listing of this repository.
    #[must_use]
    pub fn commits_path(&self) -> String {
        format!("/repos/{}/{}/commits", self.owner.as_str(), self.name.as_str())
    }

    /// API path for the pull request listing of this repository.
    #[must_use]
    pub fn pulls_path(&self) -> String {
        format!("/repos/{}/{}/pulls", self.owner.as_str(), self.name.as_str())
    }
}

impl fmt::Display for RepositoryLocator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}", self.owner.as_str(), self.name.as_str())
    }
}
