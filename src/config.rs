use anyhow::{Context, Result};
use std::env;

/// Process configuration, read once at startup and shared through app state.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub imap_host: String,
    pub imap_port: u16,
    /// Connect + login deadline. A hung mailbox server fails the request
    /// instead of blocking it forever.
    pub imap_timeout_secs: u64,
    /// Message limit applied when the webhook request does not carry one.
    pub fetch_limit: usize,
    /// Optional char cap on returned body text, for summary consumers.
    pub body_preview_chars: Option<usize>,
    /// HTTP listen port.
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let imap_host = env::var("IMAP_HOST").context("IMAP_HOST must be set")?;
        let imap_port = env::var("IMAP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(993);
        let imap_timeout_secs = env::var("IMAP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let fetch_limit = env::var("FETCH_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(5);
        let body_preview_chars = env::var("BODY_PREVIEW_CHARS")
            .ok()
            .and_then(|v| v.parse().ok());
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3030);

        Ok(Config {
            database_url,
            imap_host,
            imap_port,
            imap_timeout_secs,
            fetch_limit,
            body_preview_chars,
            port,
        })
    }
}
