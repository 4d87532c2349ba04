//! Pinned repository endpoints: detail cards and pull request changelogs.

use axum::extract::{Path, State};
use axum::response::Response;
use chrono::{DateTime, TimeDelta, Utc};
use futures_util::future::try_join_all;
use serde::Serialize;

use crate::cache::CacheKey;
use crate::github::{CommitListQuery, RepositoryLocator};
use crate::persistence::NewPullRequest;
use crate::summarize::{
    PullRequestInput, SummaryOutcome, SummaryRecord, summarize_pull_requests,
};

use super::error::ApiError;
use super::json_payload;
use super::state::AppState;

/// Pull request fetches are capped at the five most recently closed.
const PULL_REQUEST_FETCH_LIMIT: u8 = 5;

/// Stored pull requests younger than this window are reused instead of
/// refetching from upstream.
const RECENT_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Serialize)]
struct RepoDetail {
    owner: String,
    name: String,
    id: i64,
    #[serde(rename = "lastUpdate")]
    last_update: String,
    #[serde(rename = "timeAgo")]
    time_ago: String,
}

/// `GET /api/repos` — detail cards for the statically configured repo list.
pub(super) async fn pinned_repositories(
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let details: Vec<serde_json::Value> = try_join_all(
        state
            .options
            .pinned_repositories
            .iter()
            .map(|locator| repo_detail(&state, locator)),
    )
    .await?;

    let body = serde_json::to_string(&details).map_err(|error| {
        ApiError::internal("Failed to fetch and save repositories", &error)
    })?;

    Ok(json_payload(body))
}

/// `GET /api/repos/{owner}/{repo}/changelogs` — summarizes the most recent
/// closed pull requests of a repository.
pub(super) async fn changelogs(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let locator = RepositoryLocator::from_owner_repo(&owner, &repo)
        .map_err(|_| ApiError::bad_request("Owner or repo parameter missing"))?;

    let key = CacheKey::pull_requests(&locator);
    if let Some(cached) = state.cache_read(&key).await {
        return Ok(json_payload(cached));
    }

    let full_name = locator.full_name();
    let repo_record = state
        .with_store(move |store| store.find_or_create_repo(&full_name))
        .await
        .map_err(|error| ApiError::internal("Error fetching PRs", &error))?;

    let cutoff = Utc::now() - TimeDelta::hours(RECENT_WINDOW_HOURS);
    let repo_id = repo_record.id;
    let recent = state
        .with_store(move |store| store.recent_pull_requests(repo_id, cutoff))
        .await
        .map_err(|error| ApiError::internal("Error fetching PRs", &error))?;

    if recent.is_empty() {
        let fetched = state
            .gateway
            .list_closed_pull_requests(&locator, PULL_REQUEST_FETCH_LIMIT)
            .await
            .map_err(|error| ApiError::from_github("Error fetching PRs", &error))?;

        let rows: Vec<NewPullRequest> = fetched
            .into_iter()
            .map(|pull_request| NewPullRequest {
                title: pull_request.title,
                description: pull_request
                    .body
                    .filter(|body| !body.is_empty())
                    .unwrap_or_else(|| "No description".to_owned()),
                closed_at: pull_request.closed_at,
            })
            .collect();

        state
            .with_store(move |store| store.insert_pull_requests(repo_id, &rows))
            .await
            .map_err(|error| ApiError::internal("Error fetching PRs", &error))?;
    }

    let stored = state
        .with_store(move |store| {
            store.pull_requests_for_repo(repo_id, i64::from(PULL_REQUEST_FETCH_LIMIT))
        })
        .await
        .map_err(|error| ApiError::internal("Error fetching PRs", &error))?;

    let inputs: Vec<PullRequestInput> = stored
        .into_iter()
        .map(|pull_request| PullRequestInput {
            title: pull_request.title,
            description: pull_request.description,
        })
        .collect();

    let outcomes = summarize_pull_requests(state.summarizer.as_ref(), &inputs).await;
    let records: Vec<SummaryRecord> = outcomes
        .into_iter()
        .map(SummaryOutcome::into_record)
        .collect();

    let body = serde_json::to_string(&records)
        .map_err(|error| ApiError::internal("Error fetching PRs", &error))?;

    state.cache_write(&key, &body).await;
    Ok(json_payload(body))
}

async fn repo_detail(
    state: &AppState,
    locator: &RepositoryLocator,
) -> Result<serde_json::Value, ApiError> {
    let key = CacheKey::repo_details(locator);
    if let Some(cached) = state.cache_read(&key).await {
        match serde_json::from_str(&cached) {
            Ok(value) => return Ok(value),
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "discarding undecodable cache entry");
            }
        }
    }

    let full_name = locator.full_name();
    let repo_record = state
        .with_store(move |store| store.find_or_create_repo(&full_name))
        .await
        .map_err(|error| ApiError::internal("Failed to fetch and save repositories", &error))?;

    // A repository without reachable commits still gets a card.
    let query = CommitListQuery {
        sha: None,
        since: None,
        per_page: 1,
    };
    let last_commit = match state.gateway.list_commits(None, locator, &query).await {
        Ok(commits) => commits.into_iter().next(),
        Err(error) => {
            tracing::warn!(repo = %locator, error = %error, "last commit lookup failed");
            None
        }
    };

    let detail = RepoDetail {
        owner: locator.owner().as_str().to_owned(),
        name: locator.name().as_str().to_owned(),
        id: repo_record.id,
        last_update: last_commit
            .as_ref()
            .map_or_else(|| "No updates".to_owned(), |commit| format_last_update(commit.date)),
        time_ago: last_commit.map_or_else(
            || "Unknown".to_owned(),
            |commit| humanise_time_ago(Utc::now() - commit.date),
        ),
    };

    let body = serde_json::to_string(&detail).map_err(|error| {
        ApiError::internal("Failed to fetch and save repositories", &error)
    })?;
    state.cache_write(&key, &body).await;

    serde_json::to_value(&detail)
        .map_err(|error| ApiError::internal("Failed to fetch and save repositories", &error))
}

fn format_last_update(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Coarse humanised delta, e.g. "3 days ago".
///
/// Only intervals strictly greater than one unit are reported in that
/// unit, so exactly one year reads as months; this mirrors the dashboard's
/// longstanding display behaviour.
fn humanise_time_ago(delta: TimeDelta) -> String {
    const UNITS: [(i64, &str); 5] = [
        (31_536_000, "years"),
        (2_592_000, "months"),
        (86_400, "days"),
        (3_600, "hours"),
        (60, "minutes"),
    ];

    let seconds = delta.num_seconds().max(0);
    for (unit_seconds, label) in UNITS {
        let interval = seconds.div_euclid(unit_seconds);
        if interval > 1 {
            return format!("{interval} {label} ago");
        }
    }

    format!("{seconds} seconds ago")
}
