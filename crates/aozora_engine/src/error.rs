use std::fmt;

use thiserror::Error;

/// A single failed network round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} fetching {url}: {message}")]
pub struct FetchError {
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(url: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Undecodable,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Undecodable => write!(f, "undecodable page"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Errors that end a whole run, or reject a value before a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectorError {
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("fetch failed: {0}")]
    FetchFailed(#[from] FetchError),
    #[error("invalid entry: {0}")]
    InvalidEntry(String),
    #[error("invalid detail url template: {0}")]
    InvalidTemplate(String),
    #[error("unknown text encoding: {0}")]
    InvalidEncoding(String),
    #[error("failed to start runtime: {0}")]
    Runtime(String),
}

/// Errors scoped to one entry's archive. Never abort the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("download failed: {0}")]
    DownloadFailed(FetchError),
    #[error("archive is corrupt: {0}")]
    ArchiveCorrupt(String),
    #[error("failed to read {name} from archive: {message}")]
    ExtractFailed { name: String, message: String },
    #[error("{name} inflates past {max_bytes} bytes")]
    PayloadTooLarge { name: String, max_bytes: u64 },
    #[error("no text payload in archive")]
    PayloadNotFound,
    #[error("{name} is not valid {encoding}")]
    DecodeFailed { name: String, encoding: String },
}
