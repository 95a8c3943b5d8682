//! Server, CDN, and header details derived from the primary response.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;

use crate::config::{
    HEADER_SERVER, HEADER_STRICT_TRANSPORT_SECURITY, HEADER_X_FASTLY_BACKEND, HEADER_X_SERVED_BY,
    HEADER_X_VERCEL_ID, RELEVANT_HEADERS,
};
use crate::models::ServerDetails;
use crate::network::NetworkInfo;

/// How a CDN rule recognizes its provider.
enum CdnSignal {
    /// The `server` header contains this (lowercase) text
    ServerContains(&'static str),
    /// Any of these headers is present
    HeaderPresent(&'static [&'static str]),
}

/// CDN rules in priority order; the first match wins.
const CDN_RULES: &[(CdnSignal, &str)] = &[
    (CdnSignal::ServerContains("cloudflare"), "Cloudflare"),
    (CdnSignal::ServerContains("cloudfront"), "Amazon CloudFront"),
    (CdnSignal::HeaderPresent(&[HEADER_X_VERCEL_ID]), "Vercel"),
    (CdnSignal::ServerContains("netlify"), "Netlify"),
    (
        CdnSignal::HeaderPresent(&[HEADER_X_FASTLY_BACKEND, HEADER_X_SERVED_BY]),
        "Fastly",
    ),
    (CdnSignal::ServerContains("google frontend"), "Google Cloud CDN"),
];

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Infers the CDN provider from response headers.
pub fn detect_cdn(headers: &HeaderMap) -> Option<&'static str> {
    let server = header_str(headers, HEADER_SERVER)
        .map(str::to_lowercase)
        .unwrap_or_default();

    CDN_RULES
        .iter()
        .find(|(signal, _)| match signal {
            CdnSignal::ServerContains(needle) => server.contains(needle),
            CdnSignal::HeaderPresent(names) => names.iter().any(|name| headers.contains_key(*name)),
        })
        .map(|(_, provider)| *provider)
}

/// Extracts the allow-listed headers (see `RELEVANT_HEADERS`).
///
/// Only headers present in the response are included.
pub fn extract_other_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    RELEVANT_HEADERS
        .iter()
        .filter_map(|&header_name| {
            headers.get(header_name).map(|value| {
                (
                    header_name.to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
        })
        .collect()
}

/// Assembles [`ServerDetails`] from the page URL, its response headers, and
/// the resolved network info.
pub fn build_server_details(url: &str, headers: &HeaderMap, network: NetworkInfo) -> ServerDetails {
    ServerDetails {
        ip_address: network.ip,
        ipv6_address: network.ipv6,
        hosting_provider: network.provider,
        ip_details: network.details,
        is_hsts_enabled: headers.contains_key(HEADER_STRICT_TRANSPORT_SECURITY),
        server_signature: header_str(headers, HEADER_SERVER)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        cdn_provider: detect_cdn(headers).map(str::to_string),
        ssl_enabled: url.starts_with("https://"),
        other_headers: extract_other_headers(headers),
    }
}
