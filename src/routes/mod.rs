pub mod webhook;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::config::Config;

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    sqlx::SqlitePool: FromRef<S>,
    Arc<Config>: FromRef<S>,
{
    Router::new()
        .route("/", get(health))
        .route("/webhook", post(webhook::receive_webhook))
}
