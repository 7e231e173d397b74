use scraper::Html;
use tokio_util::sync::CancellationToken;

use crate::decode::decode_page;
use crate::fetch::Fetcher;
use crate::{FailureKind, FetchError};

/// A fetched and decoded HTML page.
///
/// Holds the markup as text so it can cross await points; call
/// [`FetchedPage::document`] to get a queryable tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub final_url: String,
    pub html: String,
    pub encoding_label: String,
}

impl FetchedPage {
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

pub async fn fetch_document(
    fetcher: &dyn Fetcher,
    url: &str,
    cancel: &CancellationToken,
) -> Result<FetchedPage, FetchError> {
    let output = fetcher.fetch(url, cancel).await?;
    let decoded = decode_page(&output.bytes, output.metadata.content_type.as_deref())
        .map_err(|err| FetchError::new(url, FailureKind::Undecodable, err.to_string()))?;
    Ok(FetchedPage {
        url: url.to_string(),
        final_url: output.metadata.final_url,
        html: decoded.html,
        encoding_label: decoded.encoding_label,
    })
}
