use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt; // for `oneshot`

use inboxhook::config::Config;
use inboxhook::models::account::Account;
use inboxhook::routes;
use inboxhook::services::account_service;
use inboxhook::AppState;

const ACCOUNTS_SCHEMA: &str = "CREATE TABLE accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    alias TEXT,
    credentials TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (strftime('%s','now'))
)";

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        // Nothing listens here; any connection attempt fails fast.
        imap_host: "127.0.0.1".into(),
        imap_port: 1,
        imap_timeout_secs: 2,
        fetch_limit: 5,
        body_preview_chars: None,
        port: 0,
    }
}

async fn test_state(with_schema: bool) -> AppState {
    // A pool of one: every in-memory sqlite connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    if with_schema {
        sqlx::query(ACCOUNTS_SCHEMA).execute(&pool).await.unwrap();
    }
    AppState {
        pool,
        config: Arc::new(test_config()),
    }
}

fn app(state: AppState) -> Router {
    routes::router().with_state(state)
}

fn post_webhook(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_probe_returns_ok() {
    let app = app(test_state(true).await);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_account_is_404_without_mailbox_contact() {
    let app = app(test_state(true).await);
    let response = app
        .oneshot(post_webhook(serde_json::json!({ "email": "x@y.com" })))
        .await
        .unwrap();
    // The resolver short-circuits before any connection attempt; a contacted
    // mailbox would have produced a connect/timeout error instead.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("x@y.com"));
}

#[tokio::test]
async fn empty_email_is_rejected() {
    let app = app(test_state(true).await);
    let response = app
        .oneshot(post_webhook(serde_json::json!({ "email": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn broken_store_is_500_not_404() {
    // No accounts table at all: an unreachable store is an infrastructure
    // failure, distinct from the business outcome "no such account".
    let app = app(test_state(false).await);
    let response = app
        .oneshot(post_webhook(serde_json::json!({ "email": "a@b.com" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn supplied_password_bypasses_the_resolver() {
    // Store has no schema; a resolver query would 500 with a store error.
    // With a caller-supplied password the pipeline goes straight to the
    // (unreachable) mailbox host instead.
    let app = app(test_state(false).await);
    let response = app
        .oneshot(post_webhook(
            serde_json::json!({ "email": "a@b.com", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("mailbox"));
}

#[tokio::test]
async fn resolver_matches_primary_address_and_alias() {
    let state = test_state(true).await;
    let credentials = Account::encode_credentials("a@b.com", "s3cret");
    account_service::insert(&state.pool, "a@b.com", Some("alias@b.com"), &credentials)
        .await
        .unwrap();

    let by_email = account_service::resolve(&state.pool, "a@b.com")
        .await
        .unwrap()
        .expect("primary address should resolve");
    assert_eq!(by_email.email, "a@b.com");

    let by_alias = account_service::resolve(&state.pool, "alias@b.com")
        .await
        .unwrap()
        .expect("alias should resolve");
    assert_eq!(by_alias.email, "a@b.com");

    let account = by_alias.with_password().unwrap();
    assert_eq!(account.login, "a@b.com");
    assert_eq!(account.password, "s3cret");

    assert!(account_service::resolve(&state.pool, "nobody@b.com")
        .await
        .unwrap()
        .is_none());
}
