//! Configuration constants.
//!
//! This module defines the constants used throughout the analyzer: remote
//! endpoints, timeouts, size limits, and the fixed user-facing messages that
//! the pipeline surfaces when a stage fails.

// Network operation timeouts
/// Per-request timeout in seconds for the shared HTTP client.
/// PageSpeed assessments routinely take 15-30s, so this is generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default User-Agent string for HTTP requests.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Response and body size limits
/// Maximum response body size in bytes (2MB)
/// Bodies larger than this are truncated at the limit to prevent memory exhaustion
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Maximum URL length accepted by domain normalization.
pub const MAX_URL_LENGTH: usize = 2048;

/// Capacity of the channel carrying streamed chat fragments.
pub const CHAT_STREAM_BUFFER: usize = 64;

// Remote endpoints
/// DNS-over-HTTPS JSON endpoint.
pub const DEFAULT_DOH_ENDPOINT: &str = "https://cloudflare-dns.com/dns-query";
/// IP intelligence endpoint (the IP is appended as a path segment).
pub const DEFAULT_IP_API_ENDPOINT: &str = "http://ip-api.com/json";
/// PageSpeed Insights v5 endpoint.
pub const DEFAULT_PSI_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";
/// Gemini REST API base URL.
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Gemini model used for both the report and the chat.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Fields requested from the IP intelligence API.
pub const IP_API_FIELDS: &str =
    "status,message,country,countryCode,region,regionName,city,timezone,isp,org,as,query";

// Title extraction
/// Title used when the page has no static title but looks like a client-rendered app.
pub const SPA_TITLE_SENTINEL: &str = "[Title rendered with JavaScript — use SSR or react-helmet]";
/// Markers in the body markup that indicate an SPA mount point.
pub const SPA_ROOT_MARKERS: &[&str] = &["id=\"root\"", "id=\"app\""];
/// Framework names searched for in the raw page source.
pub const SPA_FRAMEWORK_MARKERS: &[&str] = &["react", "vue", "angular"];

// Fatal fetch messages
pub const MSG_NETWORK_FAILURE: &str = "Network request failed. This may be due to a temporary issue with the content gateway or your internet connection.";
pub const MSG_EMPTY_BODY: &str = "Could not retrieve HTML content. The site might require JavaScript to render or is blocking requests.";

// Performance messages
/// Upstream message that Lighthouse returns for pages it cannot load.
pub const PSI_GENERIC_LIGHTHOUSE_ERROR: &str = "Lighthouse returned error: Something went wrong.";
pub const MSG_PSI_LIGHTHOUSE_FAILED: &str = "Lighthouse could not analyze this page. This can happen with pages that have redirects or require authentication.";
pub const MSG_PSI_ALL_FAILED: &str = "Failed to load Performance data. The PageSpeed API may be temporarily unavailable or the site could not be analyzed.";
pub const MSG_PSI_UNKNOWN: &str = "Unknown API error";

// Generative text messages
pub const MSG_SUGGESTIONS_FAILED: &str =
    "There was an error generating SEO suggestions. Please try again later.";
pub const MSG_CHAT_FAILED: &str = "I'm sorry, I encountered a problem processing your request.";
/// The only reply the assistant may give to questions outside the analyzed domain.
pub const OUT_OF_SCOPE_REPLY: &str = "I'm here to assist with your domain and its SEO/design improvements. Please ask questions related to your website.";
/// Display name the assistant introduces itself with.
pub const ASSISTANT_NAME: &str = "SEO Analyzer";
