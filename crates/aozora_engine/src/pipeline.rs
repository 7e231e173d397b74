use std::sync::Arc;

use aozora_logging::{collector_info, collector_warn};
use futures_util::future;
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::archive::extract_text;
use crate::config::CollectorConfig;
use crate::detail::resolve_detail;
use crate::discover::discover_entries;
use crate::fetch::{Fetcher, ReqwestFetcher};
use crate::page::fetch_document;
use crate::{
    Candidate, CollectorError, DetailLookup, Entry, EntryOutcome, ExtractError, ExtractedDocument,
    SkipReason,
};

/// Discovers works on an index page and extracts each one's text.
#[derive(Clone)]
pub struct Collector {
    config: Arc<CollectorConfig>,
    pages: Arc<dyn Fetcher>,
    archives: Arc<dyn Fetcher>,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        let pages = Arc::new(ReqwestFetcher::new(config.page_fetch.clone()));
        let archives = Arc::new(ReqwestFetcher::new(config.archive_fetch.clone()));
        Self::with_fetchers(config, pages, archives)
    }

    pub fn with_fetchers(
        config: CollectorConfig,
        pages: Arc<dyn Fetcher>,
        archives: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pages,
            archives,
        }
    }

    /// Fetches the index page once and lists its candidates.
    ///
    /// This is the only step whose failure ends the run.
    pub async fn discover(
        &self,
        index_url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candidate>, CollectorError> {
        Url::parse(index_url).map_err(|err| CollectorError::InvalidUrl {
            url: index_url.to_string(),
            message: err.to_string(),
        })?;
        collector_info!("fetching index page {}", index_url);
        let page = fetch_document(self.pages.as_ref(), index_url, cancel).await?;
        let candidates =
            discover_entries(&page.document(), index_url, &self.config.detail_url_template);
        collector_info!("discovered {} candidates on {}", candidates.len(), index_url);
        Ok(candidates)
    }

    /// Lazily processes candidates, at most `concurrency` at a time, in list order.
    ///
    /// The stream ends early once `cancel` fires.
    pub fn process_all(
        &self,
        candidates: Vec<Candidate>,
        cancel: CancellationToken,
    ) -> BoxStream<'static, EntryOutcome> {
        let concurrency = self.config.concurrency.max(1);
        let this = self.clone();
        let stop = cancel.clone();
        stream::iter(candidates)
            .map(move |candidate| {
                let this = this.clone();
                let cancel = cancel.clone();
                async move { this.process(candidate, &cancel).await }
            })
            .buffered(concurrency)
            .take_until(async move { stop.cancelled().await })
            .boxed()
    }

    /// Every candidate's outcome, skipped ones included.
    pub async fn outcomes(
        &self,
        index_url: &str,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, EntryOutcome>, CollectorError> {
        let candidates = self.discover(index_url, &cancel).await?;
        Ok(self.process_all(candidates, cancel))
    }

    /// Entries paired with their extracted text or extraction error.
    /// Candidates without an archive produce no element.
    pub async fn run(
        &self,
        index_url: &str,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, (Entry, Result<String, ExtractError>)>, CollectorError> {
        let outcomes = self.outcomes(index_url, cancel).await?;
        Ok(outcomes
            .filter_map(|outcome| future::ready(outcome.into_pair()))
            .boxed())
    }

    async fn process(&self, candidate: Candidate, cancel: &CancellationToken) -> EntryOutcome {
        let lookup = resolve_detail(
            self.pages.as_ref(),
            &candidate.detail_url,
            &self.config.archive.link_suffix,
            cancel,
        )
        .await;
        let detail = match lookup {
            DetailLookup::Found(detail) => detail,
            DetailLookup::Unavailable(err) => {
                collector_warn!("skipping {}: {}", candidate.detail_url, err);
                return EntryOutcome::Skipped {
                    candidate,
                    reason: SkipReason::DetailUnavailable(err),
                };
            }
        };

        let Some(archive_url) = detail.archive_url else {
            collector_info!("skipping {}: no archive link", candidate.detail_url);
            return EntryOutcome::Skipped {
                candidate,
                reason: SkipReason::NoArchiveLink,
            };
        };

        let entry = match Entry::new(&candidate, detail.author_name, archive_url) {
            Ok(entry) => entry,
            Err(err) => {
                collector_warn!("skipping {}: {}", candidate.detail_url, err);
                return EntryOutcome::Skipped {
                    candidate,
                    reason: SkipReason::InvalidEntry(err.to_string()),
                };
            }
        };

        match extract_text(
            self.archives.as_ref(),
            &entry.archive_url,
            &self.config.archive,
            cancel,
        )
        .await
        {
            Ok(text) => EntryOutcome::Extracted(ExtractedDocument { entry, text }),
            Err(error) => {
                collector_warn!("extraction failed for {}: {}", entry.archive_url, error);
                EntryOutcome::Failed { entry, error }
            }
        }
    }
}
