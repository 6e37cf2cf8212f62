use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::Config;
use crate::error::FetchError;
use crate::models::account::Account;
use crate::models::message::{MessageSummary, SearchScope, SelectionCriteria, SkippedMessage};
use crate::services::{account_service, fetch_service};

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub email: String,
    /// When present the credential resolver is bypassed and the address itself
    /// is used as the mailbox login.
    pub password: Option<String>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub unseen: bool,
    #[serde(default)]
    pub subject_contains: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub email: String,
    pub messages: Vec<MessageSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedMessage>,
}

/// POST /webhook: resolve the account, fetch and decode recent messages,
/// answer with the documented JSON contract. Failures map to HTTP statuses
/// (404 unknown account, 401 rejected login, 500 infrastructure), never to
/// errors embedded in a 200 message list.
pub async fn receive_webhook(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Json(req): Json<WebhookRequest>,
) -> Result<Json<WebhookResponse>, FetchError> {
    if req.email.trim().is_empty() {
        return Err(FetchError::InvalidRequest("email is required".into()));
    }
    info!(email = %req.email, "webhook received");

    let account = match &req.password {
        Some(password) => Account::ephemeral(&req.email, password),
        None => account_service::resolve(&pool, &req.email)
            .await?
            .ok_or_else(|| FetchError::AccountNotFound(req.email.clone()))?
            .with_password()
            .map_err(|e| FetchError::Credentials(e.to_string()))?,
    };

    let scope = if req.unseen {
        SearchScope::Unseen
    } else {
        SearchScope::All
    };
    let criteria = SelectionCriteria::new(scope, req.limit.unwrap_or(config.fetch_limit))
        .with_subject_filter(req.subject_contains.clone())
        .with_preview_chars(config.body_preview_chars);

    let outcome = fetch_service::fetch_messages(&config, &account, &criteria).await?;
    info!(
        email = %req.email,
        returned = outcome.messages.len(),
        skipped = outcome.skipped.len(),
        "webhook served"
    );

    Ok(Json(WebhookResponse {
        email: req.email,
        messages: outcome.messages,
        skipped: outcome.skipped,
    }))
}
