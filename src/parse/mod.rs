//! HTML parsing and data extraction.
//!
//! This module extracts structured data from HTML content including:
//! - Title (with the client-rendered app heuristic)
//! - Meta description, canonical link, favicon
//! - Open Graph and Twitter Card tags
//! - Heading outline
//!
//! All parsing is done using CSS selectors via the `scraper` crate.

mod html;
mod social;
mod links;

use scraper::Html;

use crate::models::{MetaData, RobotsTxt};

// Re-export public API
pub use html::{extract_headings, extract_link, extract_meta, extract_meta_description, extract_title};
pub use social::{extract_social_tags, SocialTags};
pub use links::{absolute_url, default_favicon};

/// Builds the complete [`MetaData`] record for a fetched page.
///
/// # Arguments
///
/// * `raw_html` - The response body
/// * `page_url` - The URL the body was fetched from, used to resolve relative links
/// * `robots` - Outcome of the separate robots.txt request
pub fn extract_metadata(raw_html: &str, page_url: &str, robots: RobotsTxt) -> MetaData {
    let document = Html::parse_document(raw_html);

    let (title, title_source) = extract_title(&document, raw_html);
    let social = extract_social_tags(&document, page_url);

    let favicon = absolute_url(page_url, extract_link(&document, "icon").as_deref())
        .or_else(|| absolute_url(page_url, extract_link(&document, "shortcut icon").as_deref()))
        .or_else(|| default_favicon(page_url));

    MetaData {
        title,
        title_source,
        description: extract_meta_description(&document),
        canonical: absolute_url(page_url, extract_link(&document, "canonical").as_deref()),
        og_title: social.og_title,
        og_description: social.og_description,
        og_image: social.og_image,
        twitter_card: social.twitter_card,
        twitter_title: social.twitter_title,
        twitter_description: social.twitter_description,
        twitter_image: social.twitter_image,
        headings: extract_headings(&document),
        favicon,
        robots_txt: robots.content,
        robots_txt_status: robots.status,
    }
}
