//! Dashboard endpoints: repository listing, commits, and summaries.

use axum::extract::{Query, State};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::github::{AccessToken, CommitListQuery, RepoMetadata, RepositoryLocator};
use crate::persistence::{NewCommit, NewCommitSummary, UserRecord};
use crate::summarize::summarize_commits;

use super::error::ApiError;
use super::json_payload;
use super::state::AppState;

/// Commit fetches are capped at the five most recent entries.
const COMMIT_FETCH_LIMIT: u8 = 5;

/// Default lower bound applied when the client omits `since`.
const DEFAULT_SINCE: &str = "2019-05-06T00:00:00Z";

#[derive(Debug, Deserialize)]
pub(super) struct DashboardParams {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommitsParams {
    repo: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
    since: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SummarizeParams {
    repo: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct DashboardRepo {
    id: u64,
    name: String,
    owner: String,
    full_name: String,
    default_branch: Option<String>,
}

impl From<RepoMetadata> for DashboardRepo {
    fn from(value: RepoMetadata) -> Self {
        Self {
            id: value.id,
            name: value.name,
            owner: value.owner,
            full_name: value.full_name,
            default_branch: value.default_branch,
        }
    }
}

#[derive(Debug, Serialize)]
struct DashboardCommit {
    sha: String,
    message: String,
    author: String,
    date: DateTime<Utc>,
    #[serde(rename = "repoFullName")]
    repo_full_name: String,
}

/// `GET /api/dashboard` — lists the user's repositories.
pub(super) async fn repositories(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, ApiError> {
    let Some(raw_user_id) = params.user_id.filter(|value| !value.is_empty()) else {
        return Err(ApiError::bad_request("Missing userId"));
    };
    let user_id = parse_user_id(&raw_user_id, "Invalid userId")?;

    let user = resolve_user(&state, user_id, "Failed to fetch repositories").await?;

    let key = CacheKey::user_repos(user_id);
    if let Some(cached) = state.cache_read(&key).await {
        return Ok(json_payload(cached));
    }

    let token = AccessToken::new(&user.github_token)
        .map_err(|error| ApiError::internal("Failed to fetch repositories", &error))?;
    let repos = state
        .gateway
        .list_user_repos(&token)
        .await
        .map_err(|error| ApiError::from_github("Failed to fetch repositories", &error))?;

    let payload: Vec<DashboardRepo> = repos.into_iter().map(DashboardRepo::from).collect();
    let body = serde_json::to_string(&payload)
        .map_err(|error| ApiError::internal("Failed to fetch repositories", &error))?;

    state.cache_write(&key, &body).await;
    Ok(json_payload(body))
}

/// `GET /api/dashboard/commits` — fetches and persists recent commits.
pub(super) async fn commits(
    State(state): State<AppState>,
    Query(params): Query<CommitsParams>,
) -> Result<Response, ApiError> {
    let (Some(repo_param), Some(raw_user_id)) = (
        params.repo.filter(|value| !value.is_empty()),
        params.user_id.filter(|value| !value.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Invalid repo or userId parameter"));
    };
    let user_id = parse_user_id(&raw_user_id, "Invalid repo or userId parameter")?;
    let locator = RepositoryLocator::from_full_name(&repo_param)
        .map_err(|_| ApiError::bad_request("Invalid repo format"))?;

    let since = params.since.unwrap_or_else(|| DEFAULT_SINCE.to_owned());
    if DateTime::parse_from_rfc3339(&since).is_err() {
        return Err(ApiError::bad_request("Invalid since parameter"));
    }

    let user = resolve_user(&state, user_id, "Failed to fetch commits").await?;

    let key = CacheKey::commits(&locator, &since);
    if let Some(cached) = state.cache_read(&key).await {
        return Ok(json_payload(cached));
    }

    let token = AccessToken::new(&user.github_token)
        .map_err(|error| ApiError::internal("Failed to fetch commits", &error))?;

    let branch = state
        .gateway
        .default_branch(&token, &locator)
        .await
        .map_err(|error| ApiError::from_github("Failed to fetch commits", &error))?;
    let head_sha = state
        .gateway
        .branch_head(&token, &locator, &branch)
        .await
        .map_err(|error| ApiError::from_github("Failed to fetch commits", &error))?;

    let query = CommitListQuery {
        sha: Some(head_sha),
        since: Some(since.clone()),
        per_page: COMMIT_FETCH_LIMIT,
    };
    let fetched = state
        .gateway
        .list_commits(Some(&token), &locator, &query)
        .await
        .map_err(|error| ApiError::from_github("Failed to fetch commits", &error))?;

    let repo_full_name = locator.full_name();
    let payload: Vec<DashboardCommit> = fetched
        .into_iter()
        .map(|commit| DashboardCommit {
            sha: commit.sha,
            message: commit.message,
            author: commit.author,
            date: commit.date,
            repo_full_name: repo_full_name.clone(),
        })
        .collect();

    let rows: Vec<NewCommit> = payload
        .iter()
        .map(|commit| NewCommit {
            sha: commit.sha.clone(),
            message: commit.message.clone(),
            author: commit.author.clone(),
            date: commit.date,
            repo_full_name: commit.repo_full_name.clone(),
        })
        .collect();
    state
        .with_store(move |store| store.insert_commits(&rows))
        .await
        .map_err(|error| ApiError::internal("Failed to fetch commits", &error))?;

    let body = serde_json::to_string(&payload)
        .map_err(|error| ApiError::internal("Failed to fetch commits", &error))?;

    state.cache_write(&key, &body).await;
    Ok(json_payload(body))
}

/// `GET /api/dashboard/summarize` — returns the stored summary set for a
/// repository, generating it on first request.
pub(super) async fn summarize(
    State(state): State<AppState>,
    Query(params): Query<SummarizeParams>,
) -> Result<Response, ApiError> {
    let (Some(repo_param), Some(raw_user_id)) = (
        params.repo.filter(|value| !value.is_empty()),
        params.user_id.filter(|value| !value.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Invalid repo or userId parameter"));
    };
    let user_id = parse_user_id(&raw_user_id, "Invalid repo or userId parameter")?;
    let locator = RepositoryLocator::from_full_name(&repo_param)
        .map_err(|_| ApiError::bad_request("Invalid repo format"))?;

    resolve_user(&state, user_id, "Failed to summarize commits").await?;

    let repo_full_name = locator.full_name();
    let key = CacheKey::commit_summaries(&repo_full_name);
    if let Some(cached) = state.cache_read(&key).await {
        return Ok(json_payload(cached));
    }

    let lookup_name = repo_full_name.clone();
    let existing = state
        .with_store(move |store| store.summaries_for_repo(&lookup_name))
        .await
        .map_err(|error| ApiError::internal("Failed to summarize commits", &error))?;
    if !existing.is_empty() {
        let body = serde_json::to_string(&existing)
            .map_err(|error| ApiError::internal("Failed to summarize commits", &error))?;
        state.cache_write(&key, &body).await;
        return Ok(json_payload(body));
    }

    let commits_name = repo_full_name.clone();
    let stored_commits = state
        .with_store(move |store| {
            store.commits_for_repo(&commits_name, i64::from(COMMIT_FETCH_LIMIT))
        })
        .await
        .map_err(|error| ApiError::internal("Failed to summarize commits", &error))?;

    let messages: Vec<String> = stored_commits
        .into_iter()
        .map(|commit| commit.message)
        .collect();
    let outcomes = summarize_commits(state.summarizer.as_ref(), &messages).await;
    let degraded = outcomes.iter().filter(|outcome| outcome.is_degraded()).count();
    if degraded > 0 {
        tracing::warn!(
            repo = %repo_full_name,
            degraded,
            "some summaries degraded to sentinel records"
        );
    }

    let records: Vec<NewCommitSummary> = outcomes
        .into_iter()
        .map(|outcome| {
            let record = outcome.into_record();
            NewCommitSummary {
                name: record.name,
                description: record.description,
                tags: record.tags,
            }
        })
        .collect();

    let insert_name = repo_full_name.clone();
    let stored = state
        .with_store(move |store| store.insert_summary_set(&insert_name, &records, Utc::now()))
        .await
        .map_err(|error| ApiError::internal("Failed to summarize commits", &error))?;

    let body = serde_json::to_string(&stored)
        .map_err(|error| ApiError::internal("Failed to summarize commits", &error))?;

    state.cache_write(&key, &body).await;
    Ok(json_payload(body))
}

fn parse_user_id(raw: &str, error_message: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(error_message))
}

async fn resolve_user(
    state: &AppState,
    user_id: i64,
    failure_message: &str,
) -> Result<UserRecord, ApiError> {
    state
        .with_store(move |store| store.find_user(user_id))
        .await
        .map_err(|error| ApiError::internal(failure_message, &error))?
        .ok_or_else(|| ApiError::not_found("User not found"))
}
