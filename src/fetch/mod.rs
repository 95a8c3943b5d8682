//! Core page fetch: metadata, robots.txt, and server details.
//!
//! This is the only stage whose failure aborts an analysis run. It performs
//! the primary page fetch through the content gateway, parses the HTML, then
//! gathers the best-effort extras (robots.txt, DNS, hosting provider) that
//! can only degrade to empty values.

mod robots;
mod server;

use url::Url;

use crate::error_handling::FetchError;
use crate::gateway::ContentGateway;
use crate::models::{MetaData, ServerDetails};
use crate::network::{resolve_network_info, DnsResolver, IpIntelligence};
use crate::parse::extract_metadata;

pub use robots::fetch_robots_txt;
pub use server::{build_server_details, detect_cdn, extract_other_headers};

/// Collaborators the core stage needs.
pub struct CoreServices<'a> {
    pub gateway: &'a dyn ContentGateway,
    pub dns: &'a dyn DnsResolver,
    pub intel: &'a dyn IpIntelligence,
}

/// Fetches and analyzes the page at `url`.
///
/// # Errors
///
/// Returns a [`FetchError`] when the primary fetch fails in transport, returns
/// a non-success status, or returns an empty body. Failures of robots.txt and
/// the network lookups are never errors.
pub async fn analyze_url(
    services: &CoreServices<'_>,
    url: &str,
) -> Result<(MetaData, ServerDetails), FetchError> {
    let response = services.gateway.fetch(url).await.map_err(|e| {
        log::error!("Network request for {} failed: {}", url, e);
        FetchError::Network(e)
    })?;

    if !response.status.is_success() {
        log::warn!("{} answered {}", url, response.status);
        return Err(FetchError::HttpStatus {
            status: response.status.as_u16(),
            reason: response
                .status
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
        });
    }
    if response.body.trim().is_empty() {
        log::warn!("{} answered with an empty body", url);
        return Err(FetchError::EmptyBody);
    }

    let robots = fetch_robots_txt(services.gateway, url).await;
    let meta_data = extract_metadata(&response.body, url, robots);

    let network = match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => resolve_network_info(&host, services.dns, services.intel).await,
        None => Default::default(),
    };
    let server_details = build_server_details(url, &response.headers, network);

    log::info!(
        "Analyzed {}: title {:?}, {} headings, CDN {:?}",
        url,
        meta_data.title,
        meta_data.headings.len(),
        server_details.cdn_provider
    );
    Ok((meta_data, server_details))
}
