//! Aozora collector engine: index discovery, detail lookup and archive text extraction.
mod archive;
mod config;
mod decode;
mod detail;
mod discover;
mod engine;
mod error;
mod fetch;
mod page;
mod pipeline;
mod resolve;
mod types;

pub use archive::{extract_payload, extract_text};
pub use config::{
    ArchiveSettings, CollectorConfig, DetailUrlTemplate, DEFAULT_DETAIL_URL_TEMPLATE,
};
pub use decode::{decode_page, decode_payload, DecodeError, DecodedPage};
pub use detail::{parse_detail, resolve_detail};
pub use discover::discover_entries;
pub use engine::{discover_blocking, CollectorHandle};
pub use error::{CollectorError, ExtractError, FailureKind, FetchError};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use page::{fetch_document, FetchedPage};
pub use pipeline::Collector;
pub use resolve::resolve;
pub use types::{
    Candidate, CollectorEvent, DetailInfo, DetailLookup, Entry, EntryOutcome, ExtractedDocument,
    FetchMetadata, FetchOutput, RunSummary, SkipReason,
};

// Re-exported so callers can build tokens without a direct dependency.
pub use tokio_util::sync::CancellationToken;
