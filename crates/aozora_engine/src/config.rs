use encoding_rs::Encoding;

use crate::fetch::FetchSettings;
use crate::CollectorError;

pub const DEFAULT_DETAIL_URL_TEMPLATE: &str =
    "https://www.aozora.gr.jp/cards/{author_id}/card{title_id}.html";

const AUTHOR_PLACEHOLDER: &str = "{author_id}";
const TITLE_PLACEHOLDER: &str = "{title_id}";

/// Canonical detail-page URL, parameterized by author and title ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailUrlTemplate(String);

impl DetailUrlTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, CollectorError> {
        let template = template.into();
        for placeholder in [AUTHOR_PLACEHOLDER, TITLE_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(CollectorError::InvalidTemplate(format!(
                    "{template:?} is missing {placeholder}"
                )));
            }
        }
        Ok(Self(template))
    }

    pub fn render(&self, author_id: &str, title_id: &str) -> String {
        self.0
            .replace(AUTHOR_PLACEHOLDER, author_id)
            .replace(TITLE_PLACEHOLDER, title_id)
    }

}

impl Default for DetailUrlTemplate {
    fn default() -> Self {
        Self(DEFAULT_DETAIL_URL_TEMPLATE.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// Suffix an href must end with to count as the archive link.
    pub link_suffix: String,
    /// Extension (without the dot) of the payload entry inside the archive.
    pub payload_extension: String,
    pub source_encoding: &'static Encoding,
    /// Largest payload, after decompression, that will be read into memory.
    pub max_payload_bytes: u64,
}

impl ArchiveSettings {
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self, CollectorError> {
        self.source_encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| CollectorError::InvalidEncoding(label.to_string()))?;
        Ok(self)
    }
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            link_suffix: ".zip".to_string(),
            payload_extension: "txt".to_string(),
            source_encoding: encoding_rs::SHIFT_JIS,
            max_payload_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub page_fetch: FetchSettings,
    pub archive_fetch: FetchSettings,
    pub detail_url_template: DetailUrlTemplate,
    pub archive: ArchiveSettings,
    /// Candidates processed at once. Values below 1 behave as 1.
    pub concurrency: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            page_fetch: FetchSettings::default(),
            archive_fetch: FetchSettings::for_archives(),
            detail_url_template: DetailUrlTemplate::default(),
            archive: ArchiveSettings::default(),
            concurrency: 1,
        }
    }
}
