//! Integration tests for the OAuth endpoints.

mod support;

use axum::http::StatusCode;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use support::app::{TestApp, TestAppOptions};

#[tokio::test]
async fn auth_redirects_to_the_authorize_url() {
    let app = TestApp::spawn().await;

    let (status, location) = app.get_redirect("/api/auth").await;

    assert_eq!(status, StatusCode::FOUND);
    let location = location.expect("redirect should carry a Location header");
    assert_eq!(
        location,
        format!(
            "{}/login/oauth/authorize?client_id=Iv1.testclient",
            app.github.uri()
        )
    );
}

#[tokio::test]
async fn auth_without_client_id_returns_500() {
    let app = TestApp::spawn_with(TestAppOptions {
        oauth_credentials: false,
        ..TestAppOptions::default()
    })
    .await;

    let (status, body) = app.get_json("/api/auth").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "Missing Client Id" }));
}

#[tokio::test]
async fn callback_without_code_returns_400() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_json("/api/oauth-callback").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "Missing code parameter" }));
}

#[tokio::test]
async fn callback_exchanges_code_stores_user_and_redirects() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(header("accept", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "client_id": "Iv1.testclient",
            "client_secret": "testsecret",
            "code": "deadbeef"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "gho_granted",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&app.github)
        .await;

    let (status, location) = app.get_redirect("/api/oauth-callback?code=deadbeef").await;

    assert_eq!(status, StatusCode::FOUND);
    let location = location.expect("redirect should carry a Location header");
    assert!(
        location.starts_with("http://localhost:3000/dashboard?userId="),
        "unexpected redirect target: {location}"
    );
    assert!(
        location.ends_with("&token=gho_granted"),
        "unexpected redirect target: {location}"
    );

    let user = app
        .store
        .find_user(1)
        .expect("lookup should succeed")
        .expect("user should have been created");
    assert_eq!(user.github_token, "gho_granted");
}

#[tokio::test]
async fn callback_without_access_token_in_response_returns_500() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "bad_verification_code"
        })))
        .mount(&app.github)
        .await;

    let (status, body) = app.get_json("/api/oauth-callback?code=expired").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        serde_json::json!({ "error": "Failed to obtain access token" })
    );
}
