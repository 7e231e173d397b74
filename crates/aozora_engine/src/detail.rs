use aozora_logging::{collector_debug, collector_warn};
use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;

use crate::fetch::Fetcher;
use crate::page::fetch_document;
use crate::resolve::resolve;
use crate::{DetailInfo, DetailLookup};

const AUTHOR_CELL: &str = r#"table[summary="作家データ"] tr:nth-child(2) td:nth-child(2)"#;
const DOWNLOAD_ANCHORS: &str = "table.download a";

/// Visits a detail page. A fetch failure is returned as
/// [`DetailLookup::Unavailable`] instead of an error so the batch keeps going.
pub async fn resolve_detail(
    fetcher: &dyn Fetcher,
    detail_url: &str,
    archive_suffix: &str,
    cancel: &CancellationToken,
) -> DetailLookup {
    match fetch_document(fetcher, detail_url, cancel).await {
        Ok(page) => DetailLookup::Found(parse_detail(&page.document(), detail_url, archive_suffix)),
        Err(err) => {
            collector_debug!("detail page {} unavailable: {}", detail_url, err);
            DetailLookup::Unavailable(err)
        }
    }
}

/// Reads the author name and archive link from a parsed detail page.
pub fn parse_detail(document: &Html, detail_url: &str, archive_suffix: &str) -> DetailInfo {
    DetailInfo {
        author_name: author_name(document),
        archive_url: archive_href(document, archive_suffix).and_then(|href| {
            resolve(detail_url, href)
                .inspect_err(|err| {
                    collector_warn!("dropping archive link {:?} on {}: {}", href, detail_url, err)
                })
                .ok()
        }),
    }
}

fn author_name(document: &Html) -> Option<String> {
    let sel = Selector::parse(AUTHOR_CELL).ok()?;
    let cell = document.select(&sel).next()?;
    let name = cell.text().collect::<String>().trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn archive_href<'a>(document: &'a Html, archive_suffix: &str) -> Option<&'a str> {
    let sel = Selector::parse(DOWNLOAD_ANCHORS).ok()?;
    document
        .select(&sel)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .find(|href| href.ends_with(archive_suffix))
}
