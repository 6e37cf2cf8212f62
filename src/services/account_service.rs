//! Credential resolver: maps a public-facing address to stored mailbox
//! credentials. Read-only apart from the startup seed helper.

use sqlx::SqlitePool;

use crate::models::account::Account;

/// Point lookup by primary address or alias. `Ok(None)` means the identity is
/// unknown (a business outcome); `Err` means the store itself failed.
pub async fn resolve(pool: &SqlitePool, identity: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT id, email, alias, credentials FROM accounts WHERE email = ? OR alias = ? LIMIT 1",
    )
    .bind(identity)
    .bind(identity)
    .fetch_optional(pool)
    .await
}

/// Insert a credential row if the address is not present yet. Used by the
/// startup seed and by tests.
pub async fn insert(
    pool: &SqlitePool,
    email: &str,
    alias: Option<&str>,
    credentials: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO accounts (email, alias, credentials) VALUES (?, ?, ?)")
        .bind(email)
        .bind(alias)
        .bind(credentials)
        .execute(pool)
        .await?;
    Ok(())
}
