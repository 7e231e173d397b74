use std::io::{Cursor, Read, Seek};
use std::path::Path;

use aozora_logging::{collector_debug, collector_trace};
use tokio_util::sync::CancellationToken;
use zip::ZipArchive;

use crate::config::ArchiveSettings;
use crate::decode::decode_payload;
use crate::fetch::Fetcher;
use crate::ExtractError;

/// Downloads an archive and returns its text payload decoded to UTF-8.
pub async fn extract_text(
    fetcher: &dyn Fetcher,
    archive_url: &str,
    settings: &ArchiveSettings,
    cancel: &CancellationToken,
) -> Result<String, ExtractError> {
    collector_debug!("downloading archive {}", archive_url);
    let output = fetcher
        .fetch(archive_url, cancel)
        .await
        .map_err(ExtractError::DownloadFailed)?;
    extract_payload(&output.bytes, settings)
}

/// Finds the first payload entry of an in-memory archive and decodes it.
pub fn extract_payload(bytes: &[u8], settings: &ArchiveSettings) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| ExtractError::ArchiveCorrupt(err.to_string()))?;

    let payload = find_payload(&mut archive, &settings.payload_extension)?
        .ok_or(ExtractError::PayloadNotFound)?;
    collector_trace!(
        "payload entry {} at index {} ({} bytes declared)",
        payload.name,
        payload.index,
        payload.size
    );

    let max_bytes = settings.max_payload_bytes;
    if payload.size > max_bytes {
        return Err(ExtractError::PayloadTooLarge {
            name: payload.name,
            max_bytes,
        });
    }
    let contents = read_capped(&mut archive, &payload, max_bytes)?;

    decode_payload(&contents, settings.source_encoding).map_err(|_| ExtractError::DecodeFailed {
        name: payload.name,
        encoding: settings.source_encoding.name().to_string(),
    })
}

struct PayloadEntry {
    index: usize,
    name: String,
    size: u64,
}

/// First file entry, in container order, carrying the payload extension.
fn find_payload<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    extension: &str,
) -> Result<Option<PayloadEntry>, ExtractError> {
    for index in 0..archive.len() {
        let file = archive
            .by_index_raw(index)
            .map_err(|err| ExtractError::ArchiveCorrupt(err.to_string()))?;
        if file.is_dir() {
            continue;
        }
        let matches = Path::new(file.name())
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            return Ok(Some(PayloadEntry {
                index,
                name: file.name().to_string(),
                size: file.size(),
            }));
        }
    }
    Ok(None)
}

/// Inflates the entry, refusing to go past `max_bytes` whatever its header claims.
fn read_capped<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    payload: &PayloadEntry,
    max_bytes: u64,
) -> Result<Vec<u8>, ExtractError> {
    let extract_failed = |message: String| ExtractError::ExtractFailed {
        name: payload.name.clone(),
        message,
    };

    let mut file = archive
        .by_index(payload.index)
        .map_err(|err| extract_failed(err.to_string()))?;
    let mut contents = Vec::new();
    file.by_ref()
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut contents)
        .map_err(|err| extract_failed(err.to_string()))?;

    if contents.len() as u64 > max_bytes {
        return Err(ExtractError::PayloadTooLarge {
            name: payload.name.clone(),
            max_bytes,
        });
    }
    Ok(contents)
}
