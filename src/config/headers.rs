//! HTTP header name constants.
//!
//! Header names are lowercase to match `reqwest::header::HeaderMap` lookups.

/// HTTP Strict Transport Security header
pub const HEADER_STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";
/// Server header (identifies server software)
pub const HEADER_SERVER: &str = "server";

// CDN identification
/// Vercel edge request ID
pub const HEADER_X_VERCEL_ID: &str = "x-vercel-id";
/// Fastly backend name
pub const HEADER_X_FASTLY_BACKEND: &str = "x-fastly-backend";
/// X-Served-By header (Fastly server identification)
pub const HEADER_X_SERVED_BY: &str = "x-served-by";

/// Headers copied verbatim into `ServerDetails::other_headers`.
/// To add/remove headers, modify this array.
pub const RELEVANT_HEADERS: &[&str] = &[
    "x-powered-by",
    "x-content-type-options",
    "x-frame-options",
    "x-xss-protection",
    "content-security-policy",
];
