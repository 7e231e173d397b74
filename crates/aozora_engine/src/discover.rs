use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::config::DetailUrlTemplate;
use crate::Candidate;

static CARD_HREF: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^.*/cards/([0-9]+)/card([0-9]+)\.html$").ok());

/// Collects work candidates from the anchors inside ordered-list items.
///
/// Only hrefs shaped like `.../cards/<author_id>/card<title_id>.html` count;
/// every other anchor is ignored. The detail URL comes from `template`, not
/// from the href itself.
pub fn discover_entries(
    document: &Html,
    index_url: &str,
    template: &DetailUrlTemplate,
) -> Vec<Candidate> {
    let (Some(anchor_sel), Some(pattern)) =
        (Selector::parse("ol li a").ok(), CARD_HREF.as_ref())
    else {
        return Vec::new();
    };

    document
        .select(&anchor_sel)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim();
            let captures = pattern.captures(href)?;
            let author_id = captures.get(1)?.as_str();
            let title_id = captures.get(2)?.as_str();
            Some(Candidate {
                author_id: author_id.to_string(),
                title_id: title_id.to_string(),
                title: anchor.text().collect::<String>().trim().to_string(),
                detail_url: template.render(author_id, title_id),
                source_page_url: index_url.to_string(),
            })
        })
        .collect()
}
