use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Request-level failures of the fetch pipeline. Per-message problems never
/// surface here; they are recorded as skips and the batch continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no account found for {0}")]
    AccountNotFound(String),

    #[error("credential store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("stored credentials unreadable: {0}")]
    Credentials(String),

    #[error("could not reach mailbox server: {0}")]
    Connect(String),

    #[error("mailbox connection timed out after {0}s")]
    Timeout(u64),

    #[error("mailbox login rejected: {0}")]
    Authentication(String),

    #[error("could not select mailbox folder: {0}")]
    MailboxSelect(String),

    #[error("mailbox search failed: {0}")]
    Search(String),
}

impl FetchError {
    pub fn status(&self) -> StatusCode {
        match self {
            FetchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            FetchError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            FetchError::Authentication(_) => StatusCode::UNAUTHORIZED,
            FetchError::Store(_)
            | FetchError::Credentials(_)
            | FetchError::Connect(_)
            | FetchError::Timeout(_)
            | FetchError::MailboxSelect(_)
            | FetchError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "webhook request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
