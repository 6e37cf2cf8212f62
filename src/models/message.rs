use serde::Serialize;

/// One decoded message as returned to the webhook caller. Derived per request,
/// never stored.
#[derive(Debug, Clone, Serialize)]
pub struct MessageSummary {
    pub from: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A message that could not be decoded or fetched; reported alongside the
/// batch instead of aborting it.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedMessage {
    pub seq: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    All,
    Unseen,
}

impl SearchScope {
    pub fn query(&self) -> &'static str {
        match self {
            SearchScope::All => "ALL",
            SearchScope::Unseen => "UNSEEN",
        }
    }
}

/// Required subject substrings, case-sensitive, OR-combined. Empty matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct SubjectFilter(pub Vec<String>);

impl SubjectFilter {
    pub fn matches(&self, subject: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|term| subject.contains(term))
    }
}

/// Which message ids get fetched and which get discarded.
#[derive(Debug, Clone)]
pub struct SelectionCriteria {
    pub scope: SearchScope,
    pub limit: usize,
    pub subject_filter: SubjectFilter,
    pub preview_chars: Option<usize>,
}

impl SelectionCriteria {
    pub fn new(scope: SearchScope, limit: usize) -> Self {
        SelectionCriteria {
            scope,
            // At least one, and keep a single request from draining a mailbox.
            limit: limit.clamp(1, 50),
            subject_filter: SubjectFilter::default(),
            preview_chars: None,
        }
    }

    pub fn with_subject_filter(mut self, terms: Vec<String>) -> Self {
        self.subject_filter = SubjectFilter(terms);
        self
    }

    pub fn with_preview_chars(mut self, chars: Option<usize>) -> Self {
        self.preview_chars = chars;
        self
    }
}
