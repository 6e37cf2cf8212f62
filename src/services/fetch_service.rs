//! Message fetch pipeline: open one mailbox session, search, fetch candidates
//! newest-first, decode and filter, and always log out again.

use std::collections::HashSet;
use std::time::Duration;

use async_imap::types::Fetch;
use futures::StreamExt;
use mail_parser::{Addr, Message, MessageParser};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::imap::conn::{self, MailboxSession};
use crate::mail;
use crate::models::account::Account;
use crate::models::message::{MessageSummary, SelectionCriteria, SkippedMessage};

/// Two-level result: the request either failed as a whole (`FetchError`), or
/// produced a batch where individual messages may still have been skipped.
#[derive(Debug)]
pub struct FetchOutcome {
    pub messages: Vec<MessageSummary>,
    pub skipped: Vec<SkippedMessage>,
}

/// Run the whole pipeline for one request. The session is created here and
/// logged out on every exit path, including select/search failures.
pub async fn fetch_messages(
    config: &Config,
    account: &Account,
    criteria: &SelectionCriteria,
) -> Result<FetchOutcome, FetchError> {
    info!(
        email = %account.email,
        scope = criteria.scope.query(),
        limit = criteria.limit,
        "opening mailbox session"
    );
    let mut session = conn::connect(
        &config.imap_host,
        config.imap_port,
        &account.login,
        &account.password,
        Duration::from_secs(config.imap_timeout_secs),
    )
    .await?;

    let outcome = run(&mut session, criteria).await;

    // Single logout site; a failed search must not leak the server-side session.
    session.logout().await.ok();
    outcome
}

async fn run(
    session: &mut MailboxSession,
    criteria: &SelectionCriteria,
) -> Result<FetchOutcome, FetchError> {
    session
        .select("INBOX")
        .await
        .map_err(|e| FetchError::MailboxSelect(e.to_string()))?;

    let ids = session
        .search(criteria.scope.query())
        .await
        .map_err(|e| FetchError::Search(e.to_string()))?;
    let candidates = order_candidates(ids);
    debug!(total = candidates.len(), "search returned candidates");

    let mut batch = BatchCollector::new(criteria.limit);
    for seq in candidates {
        // Early termination: filtered-out messages never consume a slot, so
        // an Unseen scan keeps walking older ids until the batch is full.
        if batch.is_full() {
            break;
        }
        let outcome = match fetch_one(session, seq).await {
            Ok(Some(fetch)) => summarize(&fetch, criteria),
            Ok(None) => Summarized::Skip("no fetch response".into()),
            // One bad message must not abort the batch.
            Err(e) => Summarized::Skip(e.to_string()),
        };
        batch.accept(seq, outcome);
    }

    Ok(batch.finish())
}

/// Accumulates per-candidate outcomes: summaries fill the batch up to the
/// limit, skips are recorded without aborting, filtered messages count for
/// nothing.
struct BatchCollector {
    limit: usize,
    messages: Vec<MessageSummary>,
    skipped: Vec<SkippedMessage>,
}

impl BatchCollector {
    fn new(limit: usize) -> Self {
        BatchCollector {
            limit,
            messages: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.messages.len() >= self.limit
    }

    fn accept(&mut self, seq: u32, outcome: Summarized) {
        match outcome {
            Summarized::Message(summary) => self.messages.push(summary),
            Summarized::Filtered => {}
            Summarized::Skip(reason) => {
                warn!(seq, %reason, "skipping message");
                self.skipped.push(SkippedMessage { seq, reason });
            }
        }
    }

    fn finish(self) -> FetchOutcome {
        FetchOutcome {
            messages: self.messages,
            skipped: self.skipped,
        }
    }
}

/// SEARCH returns an unordered id set; ascending ids are oldest-to-newest, so
/// newest-first iteration is a descending sort.
fn order_candidates(ids: HashSet<u32>) -> Vec<u32> {
    let mut ids: Vec<u32> = ids.into_iter().collect();
    ids.sort_unstable_by(|a, b| b.cmp(a));
    ids
}

async fn fetch_one(
    session: &mut MailboxSession,
    seq: u32,
) -> Result<Option<Fetch>, async_imap::error::Error> {
    let stream = session.fetch(seq.to_string(), "(ENVELOPE RFC822)").await?;
    let items: Vec<_> = stream.collect().await;
    Ok(items.into_iter().find_map(|item| item.ok()))
}

enum Summarized {
    Message(MessageSummary),
    /// Rejected by the subject filter; not an error and not a limit slot.
    Filtered,
    Skip(String),
}

fn summarize(fetch: &Fetch, criteria: &SelectionCriteria) -> Summarized {
    // Providers disagree on where the payload lands; normalize here and
    // nowhere else.
    let raw = match fetch.body().or_else(|| fetch.text()) {
        Some(raw) => raw,
        None => return Summarized::Skip("no message payload".into()),
    };
    let parsed = match MessageParser::default().parse(raw) {
        Some(parsed) => parsed,
        None => return Summarized::Skip("unparseable MIME payload".into()),
    };
    let envelope = fetch.envelope();

    let subject = envelope
        .and_then(|e| e.subject.as_ref())
        .map(|b| mail::decode_header_value(b))
        .or_else(|| parsed.subject().map(str::to_string))
        .unwrap_or_default();
    if !criteria.subject_filter.matches(&subject) {
        return Summarized::Filtered;
    }

    let from = envelope
        .and_then(|e| e.from.as_ref())
        .and_then(|addrs| addrs.first())
        .and_then(|addr| {
            let name = addr.name.as_ref().map(|n| mail::decode_header_value(n));
            let mailbox = addr.mailbox.as_ref().and_then(|m| std::str::from_utf8(m).ok());
            let host = addr.host.as_ref().and_then(|h| std::str::from_utf8(h).ok());
            match (name.as_deref(), mailbox, host) {
                (Some(n), Some(m), Some(h)) if !n.is_empty() => Some(format!("{} <{}@{}>", n, m, h)),
                (_, Some(m), Some(h)) => Some(format!("{}@{}", m, h)),
                _ => None,
            }
        })
        .unwrap_or_else(|| sender_from_message(&parsed));

    let date = envelope
        .and_then(|e| e.date.as_ref())
        .and_then(|d| std::str::from_utf8(d).ok())
        .map(str::to_string)
        .or_else(|| parsed.date().map(|d| d.to_rfc3339()));

    let text = mail::preview(mail::extract_plain_text(&parsed), criteria.preview_chars);

    Summarized::Message(MessageSummary {
        from,
        subject,
        date,
        text: (!text.is_empty()).then_some(text),
    })
}

fn sender_from_message(parsed: &Message) -> String {
    parsed
        .from()
        .and_then(|addrs| addrs.first())
        .map(format_addr)
        .unwrap_or_default()
}

fn format_addr(addr: &Addr) -> String {
    match (addr.name.as_deref(), addr.address.as_deref()) {
        (Some(name), Some(address)) if !name.is_empty() => format!("{} <{}>", name, address),
        (_, Some(address)) => address.to_string(),
        (Some(name), None) => name.to_string(),
        _ => String::new(),
    }
}
