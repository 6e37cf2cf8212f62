use std::time::Duration;

use async_imap::Session;
use tokio::net::TcpStream;
use tokio_native_tls::{TlsConnector, TlsStream};
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use crate::error::FetchError;

/// One live, authenticated mailbox session. Created per request, never pooled;
/// callers must log out on every exit path.
pub type MailboxSession = Session<Compat<TlsStream<TcpStream>>>;

/// Open an encrypted connection and authenticate. The whole sequence runs
/// under one deadline so a hung server fails the request instead of wedging it.
pub async fn connect(
    host: &str,
    port: u16,
    login: &str,
    password: &str,
    timeout: Duration,
) -> Result<MailboxSession, FetchError> {
    let attempt = async {
        let tcp_stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| FetchError::Connect(format!("{host}:{port}: {e}")))?;
        let tls_connector = TlsConnector::from(
            native_tls::TlsConnector::builder()
                .build()
                .map_err(|e| FetchError::Connect(e.to_string()))?,
        );
        let tls_stream = tls_connector
            .connect(host, tcp_stream)
            .await
            .map_err(|e| FetchError::Connect(format!("TLS handshake failed: {e}")))?;
        let client = async_imap::Client::new(tls_stream.compat());
        client
            .login(login, password)
            .await
            .map_err(|e| FetchError::Authentication(e.0.to_string()))
    };

    tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| FetchError::Timeout(timeout.as_secs()))?
}
