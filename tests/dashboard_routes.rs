//! Integration tests for the dashboard repository and commit routes.

mod support;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::app::TestApp;

async fn mount_user_repos(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": 101,
                "name": "hello-world",
                "owner": { "login": "octocat" },
                "full_name": "octocat/hello-world",
                "default_branch": "main"
            },
            {
                "id": 102,
                "name": "spoon-knife",
                "owner": { "login": "octocat" },
                "full_name": "octocat/spoon-knife",
                "default_branch": "master"
            }
        ])))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn missing_user_id_returns_400_with_contract_body() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/dashboard").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "Missing userId" }));
}

#[tokio::test]
async fn malformed_user_id_returns_400() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/dashboard?userId=not-a-number").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "Invalid userId" }));
}

#[tokio::test]
async fn unknown_user_id_returns_404_with_contract_body() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/dashboard?userId=999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, serde_json::json!({ "error": "User not found" }));
}

#[tokio::test]
async fn dashboard_lists_repositories_and_caches_byte_identically() {
    let app = TestApp::spawn().await;
    let user = app
        .store
        .create_user("gho_token")
        .expect("user should be created");
    // expect(1): the second request must be served from the cache.
    mount_user_repos(&app.github, 1).await;

    let uri = format!("/api/dashboard?userId={}", user.id);
    let (status, first_body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);

    let listing: serde_json::Value =
        serde_json::from_str(&first_body).expect("body should be JSON");
    assert_eq!(
        listing,
        serde_json::json!([
            {
                "id": 101,
                "name": "hello-world",
                "owner": "octocat",
                "full_name": "octocat/hello-world",
                "default_branch": "main"
            },
            {
                "id": 102,
                "name": "spoon-knife",
                "owner": "octocat",
                "full_name": "octocat/spoon-knife",
                "default_branch": "master"
            }
        ])
    );

    let (second_status, second_body) = app.get(&uri).await;
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second_body, first_body, "cache hit must be byte-identical");
}

#[tokio::test]
async fn upstream_failure_surfaces_status_and_generic_body() {
    let app = TestApp::spawn().await;
    let user = app
        .store
        .create_user("gho_token")
        .expect("user should be created");

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(502).set_body_json(serde_json::json!({
            "message": "Server Error"
        })))
        .mount(&app.github)
        .await;

    let (status, body) = app
        .get_json(&format!("/api/dashboard?userId={}", user.id))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        serde_json::json!({ "error": "Failed to fetch repositories" })
    );
}

#[tokio::test]
async fn commits_requires_repo_and_user_id() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/dashboard/commits?repo=a/b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        serde_json::json!({ "error": "Invalid repo or userId parameter" })
    );

    let (status, body) = app
        .get_json("/api/dashboard/commits?repo=not-a-full-name&userId=1")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "Invalid repo format" }));
}

#[tokio::test]
async fn commits_flow_fetches_persists_and_caches() {
    let app = TestApp::spawn().await;
    let user = app
        .store
        .create_user("gho_token")
        .expect("user should be created");

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "default_branch": "main" })),
        )
        .expect(1)
        .mount(&app.github)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/branches/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "commit": { "sha": "headsha" }
        })))
        .expect(1)
        .mount(&app.github)
        .await;

    let commit_payload: Vec<serde_json::Value> = (0..5)
        .map(|index| {
            let date = Utc
                .with_ymd_and_hms(2026, 3, 1 + index, 9, 0, 0)
                .single()
                .expect("date should be valid");
            serde_json::json!({
                "sha": format!("sha{index}"),
                "commit": {
                    "message": format!("commit {index}"),
                    "author": { "name": "Ada", "date": date.to_rfc3339() }
                }
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/commits"))
        .and(query_param("sha", "headsha"))
        .and(query_param("per_page", "5"))
        .and(query_param("since", "2019-05-06T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commit_payload))
        .expect(1)
        .mount(&app.github)
        .await;

    let uri = format!(
        "/api/dashboard/commits?repo=octocat%2Fhello-world&userId={}",
        user.id
    );
    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);

    let commits: serde_json::Value = serde_json::from_str(&body).expect("body should be JSON");
    let entries = commits.as_array().expect("body should be an array");
    assert_eq!(entries.len(), 5);
    let first = entries.first().expect("should have first entry");
    assert_eq!(first.get("sha"), Some(&serde_json::json!("sha0")));
    assert_eq!(
        first.get("repoFullName"),
        Some(&serde_json::json!("octocat/hello-world"))
    );
    // Upstream order is preserved, not re-sorted.
    let shas: Vec<&str> = entries
        .iter()
        .filter_map(|entry| entry.get("sha").and_then(serde_json::Value::as_str))
        .collect();
    assert_eq!(shas, vec!["sha0", "sha1", "sha2", "sha3", "sha4"]);

    let stored = app
        .store
        .commits_for_repo("octocat/hello-world", 10)
        .expect("commits should be stored");
    assert_eq!(stored.len(), 5);

    // Second request is served from the cache without touching GitHub.
    let (second_status, second_body) = app.get(&uri).await;
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second_body, body);
}

#[tokio::test]
async fn commits_rejects_malformed_since() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .get_json("/api/dashboard/commits?repo=a%2Fb&userId=1&since=yesterday")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "Invalid since parameter" }));
}
