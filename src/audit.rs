//! On-page SEO checklist.
//!
//! A fixed set of pass/fail checks over the extracted metadata, used by the
//! CLI report.

use serde::Serialize;

use crate::models::MetaData;

/// Outcome of one checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoCheck {
    pub name: &'static str,
    /// Why the item matters
    pub importance: &'static str,
    pub is_ok: bool,
    /// Short status, e.g. `"42 chars"` or `"Missing"`
    pub status: String,
    /// What to do when the check fails
    pub suggestion: &'static str,
}

impl SeoCheck {
    /// Advice to show: the suggestion when failing, a short ack otherwise.
    pub fn advice(&self) -> &'static str {
        if self.is_ok {
            "Looking good!"
        } else {
            self.suggestion
        }
    }
}

fn length_status(text: &str) -> String {
    match text.chars().count() {
        0 => "Missing".to_string(),
        n => format!("{n} chars"),
    }
}

fn presence_check(
    name: &'static str,
    importance: &'static str,
    value: Option<&str>,
    suggestion: &'static str,
) -> SeoCheck {
    let present = value.is_some_and(|v| !v.is_empty());
    SeoCheck {
        name,
        importance,
        is_ok: present,
        status: if present { "Present" } else { "Missing" }.to_string(),
        suggestion,
    }
}

/// Runs the checklist over `meta`.
pub fn seo_checks(meta: &MetaData) -> Vec<SeoCheck> {
    let title_len = meta.title.chars().count();
    let description_len = meta.description.chars().count();
    let h1_count = meta.h1_count();
    let js_title = meta.is_js_rendered_title();

    vec![
        SeoCheck {
            name: "Title Tag",
            importance: "Crucial for search rankings and click-through rates.",
            is_ok: !js_title && title_len > 10 && title_len <= 60,
            status: if js_title {
                "JS Rendered".to_string()
            } else {
                length_status(&meta.title)
            },
            suggestion: if js_title {
                "Title is set by JavaScript. Use SSR or pre-rendering for optimal SEO."
            } else {
                "Aim for a length between 10 and 60 characters."
            },
        },
        SeoCheck {
            name: "Meta Description",
            importance: "Affects click-through rates from search results.",
            is_ok: description_len > 70 && description_len <= 160,
            status: length_status(&meta.description),
            suggestion: "Write a compelling summary between 70 and 160 characters.",
        },
        SeoCheck {
            name: "H1 Heading",
            importance: "Tells search engines the main topic of your page.",
            is_ok: h1_count == 1,
            status: format!("{h1_count} found"),
            suggestion: "Ensure there is exactly one H1 tag on the page.",
        },
        presence_check(
            "Canonical Tag",
            "Prevents duplicate content issues.",
            meta.canonical.as_deref(),
            "Add a self-referencing canonical link tag to the page.",
        ),
        presence_check(
            "Open Graph Title",
            "Controls how your content appears on social media.",
            meta.og_title.as_deref(),
            "Add an 'og:title' meta tag for better social sharing.",
        ),
        presence_check(
            "Open Graph Desc.",
            "Provides the summary text for social media shares.",
            meta.og_description.as_deref(),
            "Add an 'og:description' meta tag.",
        ),
        presence_check(
            "Open Graph Image",
            "The primary image used when your content is shared.",
            meta.og_image.as_deref(),
            "Add an 'og:image' meta tag with a high-quality image.",
        ),
        presence_check(
            "Twitter Card",
            "Enables rich photo cards when your URL is shared on Twitter.",
            meta.twitter_card.as_deref(),
            "Add 'twitter:card', 'twitter:title', etc. for rich sharing.",
        ),
    ]
}
