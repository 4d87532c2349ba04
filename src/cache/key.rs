//! Fixed cache-key templates.
//!
//! Every cached response lives under one of five key shapes. The templates
//! are part of the external contract: a deployment can inspect or flush
//! keys by pattern, so the shapes must stay stable.

use std::fmt;

use crate::github::RepositoryLocator;

/// A fully rendered cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for the commit listing of a repository at a given `since` bound.
    #[must_use]
    pub fn commits(locator: &RepositoryLocator, since: &str) -> Self {
        Self(format!(
            "commits:{owner}/{repo}?since={since}",
            owner = locator.owner().as_str(),
            repo = locator.name().as_str()
        ))
    }

    /// Key for the repository listing of a user.
    #[must_use]
    pub fn user_repos(user_id: i64) -> Self {
        Self(format!("githubRepos:{user_id}"))
    }

    /// Key for the stored commit summary set of a repository.
    #[must_use]
    pub fn commit_summaries(repo_full_name: &str) -> Self {
        Self(format!("commitSummaries:{repo_full_name}"))
    }

    /// Key for the pull request summary set of a repository.
    #[must_use]
    pub fn pull_requests(locator: &RepositoryLocator) -> Self {
        Self(format!(
            "pullRequests:{owner}/{repo}",
            owner = locator.owner().as_str(),
            repo = locator.name().as_str()
        ))
    }

    /// Key for the pinned-repository detail card.
    #[must_use]
    pub fn repo_details(locator: &RepositoryLocator) -> Self {
        Self(format!(
            "repoDetails:{owner}/{repo}",
            owner = locator.owner().as_str(),
            repo = locator.name().as_str()
        ))
    }

    /// Borrow the rendered key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::CacheKey;
    use crate::github::RepositoryLocator;

    fn locator() -> RepositoryLocator {
        RepositoryLocator::from_owner_repo("octocat", "hello-world")
            .expect("locator should be valid")
    }

    #[test]
    fn templates_render_expected_shapes() {
        assert_eq!(
            CacheKey::commits(&locator(), "2019-05-06T00:00:00Z").as_str(),
            "commits:octocat/hello-world?since=2019-05-06T00:00:00Z"
        );
        assert_eq!(CacheKey::user_repos(7).as_str(), "githubRepos:7");
        assert_eq!(
            CacheKey::commit_summaries("octocat/hello-world").as_str(),
            "commitSummaries:octocat/hello-world"
        );
        assert_eq!(
            CacheKey::pull_requests(&locator()).as_str(),
            "pullRequests:octocat/hello-world"
        );
        assert_eq!(
            CacheKey::repo_details(&locator()).as_str(),
            "repoDetails:octocat/hello-world"
        );
    }
}
