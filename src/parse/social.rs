//! Open Graph and Twitter Card extraction.

use scraper::Html;

use super::html::extract_meta;
use super::links::absolute_url;

/// Social preview tags. Image URLs are absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialTags {
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub twitter_card: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
}

/// Extracts Open Graph and Twitter Card tags.
///
/// Tags are matched on either `name` or `property`, since sites use both.
pub fn extract_social_tags(document: &Html, page_url: &str) -> SocialTags {
    SocialTags {
        og_title: extract_meta(document, "og:title"),
        og_description: extract_meta(document, "og:description"),
        og_image: absolute_url(page_url, extract_meta(document, "og:image").as_deref()),
        twitter_card: extract_meta(document, "twitter:card"),
        twitter_title: extract_meta(document, "twitter:title"),
        twitter_description: extract_meta(document, "twitter:description"),
        twitter_image: absolute_url(page_url, extract_meta(document, "twitter:image").as_deref()),
    }
}
