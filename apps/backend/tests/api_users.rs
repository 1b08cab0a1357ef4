//! User API tests.
//!
//! These tests require a running PostgreSQL database. Set the
//! DATABASE_URL environment variable before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use uuid::Uuid;

use common::fixtures;
use common::TestContext;

/// Test registering returns a usable bearer token.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_returns_token() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/users/register")
        .json(&fixtures::register_request(None))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());
    let user_id: Uuid = body["user_id"].as_str().unwrap().parse().unwrap();

    // The returned token must authenticate follow-up requests.
    let me = server
        .get("/api/users/me")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(token),
        )
        .await;
    me.assert_status_ok();

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test registering with a name stores it on the profile.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_stores_name() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/users/register")
        .json(&fixtures::register_request(Some("Mika")))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let token = body["token"].as_str().unwrap().to_string();
    let user_id: Uuid = body["user_id"].as_str().unwrap().parse().unwrap();

    let me = server
        .get("/api/users/me")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    me.assert_status_ok();
    let profile: serde_json::Value = me.json();
    assert_eq!(profile["name"], "Mika");

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test a fresh profile starts with zeroed progress.
#[tokio::test]
#[ignore = "requires database"]
async fn test_me_reports_fresh_profile() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;

    let response = server
        .get("/api/users/me")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    assert_eq!(body["curriculum_pos"], 0);
    assert_eq!(body["enrolled"], 0);
    assert_eq!(body["seen"], 0);

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test profile endpoint requires authentication.
#[tokio::test]
#[ignore = "requires database"]
async fn test_me_requires_auth() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/users/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// Test an unknown token is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_unknown_token_rejected() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .get("/api/users/me")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value("not-a-real-token"),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// Test the health endpoint is public.
#[tokio::test]
#[ignore = "requires database"]
async fn test_health_is_public() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}
