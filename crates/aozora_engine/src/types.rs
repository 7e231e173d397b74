use std::fmt;

use url::Url;

use crate::error::{CollectorError, ExtractError, FetchError};

/// A work found on an index page, before its detail page has been visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub author_id: String,
    pub title_id: String,
    pub title: String,
    pub detail_url: String,
    pub source_page_url: String,
}

/// A work whose archive link has been resolved.
///
/// Identifiers are never empty and `archive_url` is always absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub author_id: String,
    pub author_name: String,
    pub title_id: String,
    pub title: String,
    pub source_page_url: String,
    pub archive_url: String,
}

impl Entry {
    pub fn new(
        candidate: &Candidate,
        author_name: Option<String>,
        archive_url: impl Into<String>,
    ) -> Result<Self, CollectorError> {
        if candidate.author_id.is_empty() || candidate.title_id.is_empty() {
            return Err(CollectorError::InvalidEntry(format!(
                "empty identifier (author_id={:?}, title_id={:?})",
                candidate.author_id, candidate.title_id
            )));
        }
        let archive_url = archive_url.into();
        if let Err(err) = Url::parse(&archive_url) {
            return Err(CollectorError::InvalidEntry(format!(
                "archive url {archive_url:?} is not absolute: {err}"
            )));
        }
        Ok(Self {
            author_id: candidate.author_id.clone(),
            author_name: author_name.unwrap_or_default(),
            title_id: candidate.title_id.clone(),
            title: candidate.title.clone(),
            source_page_url: candidate.source_page_url.clone(),
            archive_url,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub entry: Entry,
    pub text: String,
}

/// Fields read from a detail page. Either may be missing from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailInfo {
    pub author_name: Option<String>,
    pub archive_url: Option<String>,
}

/// Result of visiting a detail page. Keeps "page unreachable" apart from
/// "page reachable but fields missing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailLookup {
    Found(DetailInfo),
    Unavailable(FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    DetailUnavailable(FetchError),
    NoArchiveLink,
    InvalidEntry(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DetailUnavailable(err) => write!(f, "detail page unavailable: {err}"),
            SkipReason::NoArchiveLink => write!(f, "no archive link on detail page"),
            SkipReason::InvalidEntry(message) => write!(f, "invalid entry: {message}"),
        }
    }
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Extracted(ExtractedDocument),
    Failed { entry: Entry, error: ExtractError },
    Skipped { candidate: Candidate, reason: SkipReason },
}

impl EntryOutcome {
    /// Pairs the entry with its extraction result; `None` for skipped candidates.
    pub fn into_pair(self) -> Option<(Entry, Result<String, ExtractError>)> {
        match self {
            EntryOutcome::Extracted(doc) => Some((doc.entry, Ok(doc.text))),
            EntryOutcome::Failed { entry, error } => Some((entry, Err(error))),
            EntryOutcome::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub extracted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::Extracted(_) => self.extracted += 1,
            EntryOutcome::Failed { .. } => self.failed += 1,
            EntryOutcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorEvent {
    Discovered { candidates: usize },
    Outcome(EntryOutcome),
    Finished(Result<RunSummary, CollectorError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}
