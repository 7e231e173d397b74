#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Mutex;

use aozora_engine::{
    CancellationToken, FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher,
};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const HTML_UTF8: &str = "text/html; charset=utf-8";

/// Builds an in-memory zip; names ending in `/` become directories.
pub fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        || SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options()).unwrap();
        } else {
            writer.start_file(*name, options()).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

pub fn shift_jis(text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(text);
    assert!(!had_errors, "{text:?} is not representable in Shift_JIS");
    bytes.into_owned()
}

pub fn index_html(anchors: &[(&str, &str)]) -> String {
    let items: String = anchors
        .iter()
        .map(|(href, title)| format!("<li><a href=\"{href}\">{title}</a>　（新字新仮名）</li>\n"))
        .collect();
    format!("<html><head><title>作家別作品リスト</title></head><body><ol>\n{items}</ol></body></html>")
}

pub fn detail_html(author: Option<&str>, archive_href: Option<&str>) -> String {
    let author_table = author
        .map(|name| {
            format!(
                r#"<table summary="作家データ">
<tr><td class="header">分類：</td><td>著者</td></tr>
<tr><td class="header">作家名：</td><td><a href="../../index_pages/person123.html">{name}</a></td></tr>
</table>"#
            )
        })
        .unwrap_or_default();
    let download_table = archive_href
        .map(|href| {
            format!(
                r#"<table class="download">
<tr><th>ファイル種別</th><th>ファイル名</th></tr>
<tr><td>テキストファイル(ルビあり)</td><td><a href="{href}">archive</a></td></tr>
</table>"#
            )
        })
        .unwrap_or_default();
    format!("<html><body>{author_table}\n{download_table}</body></html>")
}

/// Serves canned bodies by exact URL and answers 404 for anything else.
#[derive(Default)]
pub struct MapFetcher {
    bodies: HashMap<String, (Vec<u8>, Option<String>)>,
    requests: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>, content_type: &str) -> Self {
        self.bodies
            .insert(url.to_string(), (body.into(), Some(content_type.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for MapFetcher {
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchOutput, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        if cancel.is_cancelled() {
            return Err(FetchError {
                url: url.to_string(),
                kind: FailureKind::Cancelled,
                message: "request aborted".to_string(),
            });
        }
        let Some((bytes, content_type)) = self.bodies.get(url) else {
            return Err(FetchError {
                url: url.to_string(),
                kind: FailureKind::HttpStatus(404),
                message: "404 Not Found".to_string(),
            });
        };
        Ok(FetchOutput {
            bytes: bytes.clone(),
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: content_type.clone(),
                byte_len: bytes.len() as u64,
            },
        })
    }
}
