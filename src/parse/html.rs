//! Basic HTML extraction utilities.
//!
//! This module provides functions to extract basic HTML elements:
//! - Page title (with the client-rendered app heuristic)
//! - Meta description and arbitrary `meta` tags by name/property
//! - `link` hrefs by rel
//! - Heading outline

use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::config::{SPA_FRAMEWORK_MARKERS, SPA_ROOT_MARKERS, SPA_TITLE_SENTINEL};
use crate::models::{Heading, TitleSource};
use crate::utils::{parse_selector_unsafe, parse_selector_with_fallback};

static HEAD_TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("head > title", "HEAD_TITLE_SELECTOR"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("title", "TITLE_SELECTOR"));
static META_TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("meta[name='title']", "META_TITLE_SELECTOR"));
static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("body", "BODY_SELECTOR"));
static HEADINGS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("h1, h2, h3, h4, h5, h6", "HEADINGS_SELECTOR"));

/// Trimmed text of the first element matching `selector`, if non-empty.
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Extracts the page title and records where it came from.
///
/// Looks at `head > title`, then any `title`, then `<meta name="title">`. When
/// none of them yields text, checks whether the page looks like a
/// client-rendered single-page app (an `id="root"`/`id="app"` mount point in
/// the body, or a framework name anywhere in the source). Such pages get
/// [`SPA_TITLE_SENTINEL`] instead of an empty title so that reports can say
/// "set by JavaScript" rather than "missing".
///
/// # Arguments
///
/// * `document` - The parsed HTML document
/// * `raw_html` - The unparsed source, searched for framework names
pub fn extract_title(document: &Html, raw_html: &str) -> (String, TitleSource) {
    if let Some(title) =
        first_text(document, &HEAD_TITLE_SELECTOR).or_else(|| first_text(document, &TITLE_SELECTOR))
    {
        return (title, TitleSource::TitleTag);
    }

    let meta_title = document
        .select(&META_TITLE_SELECTOR)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty());
    if let Some(title) = meta_title {
        return (title.to_string(), TitleSource::MetaNameTitle);
    }

    if looks_like_spa(document, raw_html) {
        log::debug!("No static title found, page looks client-rendered");
        return (SPA_TITLE_SENTINEL.to_string(), TitleSource::JsRendered);
    }

    log::debug!("No title element found in document");
    (String::new(), TitleSource::None)
}

/// SPA heuristic: a known mount point in the body, or a framework name in the source.
fn looks_like_spa(document: &Html, raw_html: &str) -> bool {
    let body = document
        .select(&BODY_SELECTOR)
        .next()
        .map(|element| element.inner_html().to_lowercase())
        .unwrap_or_default();
    let has_root_element = SPA_ROOT_MARKERS.iter().any(|marker| body.contains(marker));

    let source = raw_html.to_lowercase();
    let has_framework_reference = SPA_FRAMEWORK_MARKERS
        .iter()
        .any(|marker| source.contains(marker));

    has_root_element || has_framework_reference
}

/// Reads the `content` of the first `meta` element whose `name` or `property`
/// equals `name`, trimmed. Empty content counts as absent.
pub fn extract_meta(document: &Html, name: &str) -> Option<String> {
    let selector = parse_selector_with_fallback(
        &format!(r#"meta[name="{name}"], meta[property="{name}"]"#),
        "meta tag lookup",
    );
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

/// Extracts the meta description, defaulting to an empty string.
pub fn extract_meta_description(document: &Html) -> String {
    extract_meta(document, "description").unwrap_or_default()
}

/// Reads the trimmed `href` of the first `link` element with the given `rel`.
pub fn extract_link(document: &Html, rel: &str) -> Option<String> {
    let selector =
        parse_selector_with_fallback(&format!(r#"link[rel="{rel}"]"#), "link tag lookup");
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Extracts every `h1`-`h6` element in document order.
pub fn extract_headings(document: &Html) -> Vec<Heading> {
    document
        .select(&HEADINGS_SELECTOR)
        .map(|element| Heading {
            tag: element.value().name().to_lowercase(),
            text: element.text().collect::<String>().trim().to_string(),
        })
        .collect()
}
