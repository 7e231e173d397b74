use url::Url;

use crate::CollectorError;

/// Makes `reference` absolute against the directory of `base`.
///
/// A reference that already parses as an absolute URL is returned unchanged.
/// Anything else replaces the last path segment of `base`, so
/// `./files/1_ruby.zip` against `https://host/cards/000001/card1.html`
/// becomes `https://host/cards/000001/files/1_ruby.zip`. A leading `/` does
/// not climb to the host root: `/files/1.zip` lands in the same directory.
pub fn resolve(base_url: &str, reference: &str) -> Result<String, CollectorError> {
    if Url::parse(reference).is_ok() {
        return Ok(reference.to_string());
    }

    let base = Url::parse(base_url).map_err(|err| CollectorError::InvalidUrl {
        url: base_url.to_string(),
        message: err.to_string(),
    })?;
    let relative = reference.trim().trim_start_matches('/');
    base.join(relative)
        .map(String::from)
        .map_err(|err| CollectorError::InvalidUrl {
            url: reference.to_string(),
            message: err.to_string(),
        })
}
