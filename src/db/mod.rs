use anyhow::Result;
use sqlx::SqlitePool;
use std::fs;
use std::path::PathBuf;

use crate::models::account::Account;
use crate::services::account_service;

/// Connect to the credential store. For file-based sqlite the database file is
/// created up front; sqlx refuses to open a missing file on some setups.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let url = normalize_sqlite_url(database_url);
    if let Some(path) = db_file_path(&url) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        if !path.exists() {
            fs::File::create(&path).ok();
        }
    }
    Ok(SqlitePool::connect(&url).await?)
}

/// Run plain .sql migrations from the `migrations` directory, in file order.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir("migrations")?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.path());
    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("sql") {
            let sql = fs::read_to_string(&path)?;
            sqlx::query(&sql).execute(pool).await?;
        }
    }
    Ok(())
}

/// Seed one account from the environment so a fresh deployment is usable
/// without touching the database by hand. No-op unless SEED_EMAIL and
/// SEED_PASSWORD are both set; existing rows are left alone.
pub async fn seed_account(pool: &SqlitePool) -> Result<()> {
    let email = std::env::var("SEED_EMAIL")?;
    let password = std::env::var("SEED_PASSWORD")?;
    let login = std::env::var("SEED_LOGIN").unwrap_or_else(|_| email.clone());
    let alias = std::env::var("SEED_ALIAS").ok();

    let credentials = Account::encode_credentials(&login, &password);
    account_service::insert(pool, &email, alias.as_deref(), &credentials).await?;
    Ok(())
}

/// Accept the sqlite URL forms seen in the wild: `sqlite://path` (ok),
/// `sqlite:path` (fix), `file:path` (convert), bare path (prepend).
pub fn normalize_sqlite_url(input: &str) -> String {
    if input.starts_with("sqlite://") || input.starts_with("sqlite::memory:") {
        return input.to_string();
    }
    if input.starts_with("sqlite:") {
        let rest = input.trim_start_matches("sqlite:");
        return format!("sqlite://{}", rest.trim_start_matches('/'));
    }
    if input.starts_with("file:") {
        return format!("sqlite://{}", input.trim_start_matches("file:"));
    }
    format!("sqlite://{}", input)
}

fn db_file_path(url: &str) -> Option<PathBuf> {
    if let Some(rest) = url.strip_prefix("sqlite://") {
        if rest == ":memory:" {
            return None;
        }
        return Some(PathBuf::from(rest));
    }
    None
}
