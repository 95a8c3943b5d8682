//! SEO suggestion generation.
//!
//! Renders the analysis into a single expert-review prompt and returns the
//! model's Markdown answer verbatim.

use std::fmt::Write as _;

use crate::error_handling::SuggestionError;
use crate::llm::TextCompletion;
use crate::models::{MetaData, PsiData, PsiDeviceData, ServerDetails};

const LCP: &str = "largest-contentful-paint";
const CLS: &str = "cumulative-layout-shift";

fn or_not_found(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("Not found")
}

fn or_not_detected(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("Not detected")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn device_score(device: Option<&PsiDeviceData>) -> String {
    device
        .map(|d| format!("{}/100", d.score))
        .unwrap_or_else(|| "N/A".to_string())
}

fn device_metric<'a>(device: Option<&'a PsiDeviceData>, id: &str) -> &'a str {
    device.and_then(|d| d.metric_display(id)).unwrap_or("N/A")
}

fn performance_section(psi: Option<&PsiData>) -> String {
    let Some(psi) = psi else {
        return "**Google PageSpeed Insights:**\n\
                - Data could not be loaded for this site. The analysis will proceed without performance metrics."
            .to_string();
    };
    let mobile = psi.mobile.as_ref();
    let desktop = psi.desktop.as_ref();
    format!(
        "**Google PageSpeed Insights:**\n\
         - Mobile Score: {}\n\
         - Desktop Score: {}\n\
         - Mobile LCP: {}\n\
         - Desktop LCP: {}\n\
         - Mobile CLS: {}\n\
         - Desktop CLS: {}",
        device_score(mobile),
        device_score(desktop),
        device_metric(mobile, LCP),
        device_metric(desktop, LCP),
        device_metric(mobile, CLS),
        device_metric(desktop, CLS),
    )
}

/// Renders the suggestion prompt for the analyzed page.
///
/// Missing performance data is called out explicitly so the model focuses
/// on the other areas.
pub fn build_prompt(meta: &MetaData, psi: Option<&PsiData>, server: &ServerDetails, url: &str) -> String {
    let mut prompt = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(
        prompt,
        "Act as a world-class SEO expert and senior web developer. Analyze the following data for the website: {url}\n"
    );
    let _ = writeln!(prompt, "**Meta Data:**");
    let _ = writeln!(prompt, "- Title: {} (Length: {})", meta.title, meta.title.chars().count());
    let _ = writeln!(
        prompt,
        "- Description: {} (Length: {})",
        meta.description,
        meta.description.chars().count()
    );
    let _ = writeln!(prompt, "- Canonical: {}", or_not_found(meta.canonical.as_deref()));
    let _ = writeln!(prompt, "- OG Title: {}", or_not_found(meta.og_title.as_deref()));
    let _ = writeln!(prompt, "- OG Description: {}", or_not_found(meta.og_description.as_deref()));
    let _ = writeln!(prompt, "- OG Image: {}", or_not_found(meta.og_image.as_deref()));
    let _ = writeln!(prompt, "- Twitter Card: {}", or_not_found(meta.twitter_card.as_deref()));
    let _ = writeln!(prompt, "- H1 Tags: {}", meta.h1_count());
    let _ = writeln!(prompt, "- Total Headings: {}", meta.headings.len());
    let _ = writeln!(
        prompt,
        "- Favicon: {}",
        if meta.favicon.is_some() { "Found" } else { "Not found" }
    );
    let _ = writeln!(prompt, "- robots.txt: {}\n", meta.robots_txt_status.as_str());

    let _ = writeln!(prompt, "{}\n", performance_section(psi));

    let _ = writeln!(prompt, "**Server & Hosting Details:**");
    let _ = writeln!(
        prompt,
        "- Hosting Provider: {}",
        or_not_detected(server.hosting_provider.as_deref())
    );
    let _ = writeln!(prompt, "- CDN: {}", or_not_detected(server.cdn_provider.as_deref()));
    let _ = writeln!(prompt, "- Server: {}", or_not_detected(server.server_signature.as_deref()));
    let _ = writeln!(prompt, "- HSTS Enabled: {}", yes_no(server.is_hsts_enabled));
    let _ = writeln!(prompt, "- SSL Enabled: {}\n", yes_no(server.ssl_enabled));

    prompt.push_str(
        "Based on ALL this data (SEO, Performance, and Server), provide a concise, actionable, and prioritized list of improvement suggestions.\n\
         Use Markdown for formatting. Group suggestions into categories like 'On-Page SEO', 'Social Media Presence', 'Performance & Core Web Vitals', and 'Server & Security'.\n\
         If performance data is missing, acknowledge it and focus on other areas.\n\
         Start with a brief, encouraging summary of the site's strengths.\n\
         Be specific in your recommendations (e.g., \"Shorten the meta description to under 160 characters\" instead of \"Improve meta description\").\n",
    );
    prompt
}

/// Asks the model for prioritized improvement suggestions.
///
/// # Errors
///
/// Any model failure is returned as [`SuggestionError::Generation`], whose
/// message is the user-facing one.
pub async fn get_seo_suggestions(
    llm: &dyn TextCompletion,
    meta: &MetaData,
    psi: Option<&PsiData>,
    server: &ServerDetails,
    url: &str,
) -> Result<String, SuggestionError> {
    let prompt = build_prompt(meta, psi, server, url);
    log::debug!("Requesting SEO suggestions for {} ({} byte prompt)", url, prompt.len());
    llm.complete(&prompt).await.map_err(|e| {
        log::error!("Error generating SEO suggestions for {}: {}", url, e);
        SuggestionError::Generation(e)
    })
}
