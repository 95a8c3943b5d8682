//! Resolving page-relative link references.

use url::Url;

/// Resolves a possibly-relative reference against the page URL.
///
/// - empty or missing references yield `None`
/// - `http:`/`https:` references are parsed and passed through
/// - relative and scheme-relative references are joined with `base`
/// - anything that fails to parse yields `None`
pub fn absolute_url(base: &str, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;

    let resolved = if path.starts_with("http:") || path.starts_with("https:") {
        Url::parse(path)
    } else {
        Url::parse(base).and_then(|base_url| base_url.join(path))
    };

    match resolved {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            log::debug!(
                "Could not create absolute URL for base: {}, path: {}: {}",
                base,
                path,
                e
            );
            None
        }
    }
}

/// `<origin>/favicon.ico` for the page URL, used when the page declares no icon.
pub fn default_favicon(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    if !parsed.origin().is_tuple() {
        return None;
    }
    Some(format!("{}/favicon.ico", parsed.origin().ascii_serialization()))
}
