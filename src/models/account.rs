use anyhow::Result;
use base64::Engine;

/// One credential row: maps a public-facing address (or alias) to mailbox
/// login credentials. Lifecycle is owned by the store; this service only reads.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub alias: Option<String>,
    /// Base64 `login:password` packing, see `encode_credentials`.
    pub credentials: String,

    // Populated by `with_password`, never read from the store directly.
    #[sqlx(skip)]
    pub login: String,
    #[sqlx(skip)]
    pub password: String,
}

impl Account {
    /// Account built from caller-supplied credentials; never touches the store.
    pub fn ephemeral(email: &str, password: &str) -> Self {
        Account {
            id: 0,
            email: email.to_string(),
            alias: None,
            credentials: String::new(),
            login: email.to_string(),
            password: password.to_string(),
        }
    }

    /// Encode credentials (simple base64, not encryption).
    pub fn encode_credentials(login: &str, password: &str) -> String {
        let creds = format!("{}:{}", login, password);
        base64::engine::general_purpose::STANDARD.encode(creds.as_bytes())
    }

    pub fn decode_credentials(encoded: &str) -> Result<(String, String)> {
        let decoded = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        let creds = String::from_utf8(decoded)?;
        let parts: Vec<&str> = creds.splitn(2, ':').collect();
        if parts.len() != 2 {
            anyhow::bail!("invalid credentials format");
        }
        Ok((parts[0].to_string(), parts[1].to_string()))
    }

    /// Populate `login`/`password` from the stored credentials column.
    pub fn with_password(mut self) -> Result<Self> {
        let (login, password) = Self::decode_credentials(&self.credentials)?;
        self.login = login;
        self.password = password;
        Ok(self)
    }
}
