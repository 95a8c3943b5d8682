//! Content-retrieval gateway.
//!
//! The Fetcher/Parser never talks to `reqwest` directly: it asks a
//! [`ContentGateway`] for a URL and gets back status, headers, and body text.
//! [`HttpContentGateway`] is the production implementation; it can route
//! requests through a fetch proxy when direct access to the target is blocked.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::config::MAX_RESPONSE_BODY_SIZE;
use crate::error_handling::GatewayError;

/// What the gateway returns for one fetched URL.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    /// Status of the final response
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body text (lossily decoded, capped at `MAX_RESPONSE_BODY_SIZE`)
    pub body: String,
}

/// Retrieves documents on behalf of the analyzer.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Fetches `url`. Non-success statuses are returned as responses, not errors;
    /// only transport failures are errors.
    async fn fetch(&self, url: &str) -> Result<GatewayResponse, GatewayError>;
}

/// Gateway backed by a shared `reqwest::Client`.
pub struct HttpContentGateway {
    client: Arc<reqwest::Client>,
    proxy_prefix: Option<String>,
}

impl HttpContentGateway {
    /// Creates a gateway that fetches targets directly.
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self {
            client,
            proxy_prefix: None,
        }
    }

    /// Creates a gateway that fetches `<prefix><percent-encoded target>`.
    pub fn with_proxy(client: Arc<reqwest::Client>, proxy_prefix: impl Into<String>) -> Self {
        Self {
            client,
            proxy_prefix: Some(proxy_prefix.into()),
        }
    }

    /// The URL actually requested for `target`.
    pub fn request_url(&self, target: &str) -> String {
        proxied_url(self.proxy_prefix.as_deref(), target)
    }
}

/// Prefixes `target` with the proxy prefix, percent-encoding the target.
pub(crate) fn proxied_url(proxy_prefix: Option<&str>, target: &str) -> String {
    match proxy_prefix {
        Some(prefix) => {
            let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
            format!("{prefix}{encoded}")
        }
        None => target.to_string(),
    }
}

#[async_trait]
impl ContentGateway for HttpContentGateway {
    async fn fetch(&self, url: &str) -> Result<GatewayResponse, GatewayError> {
        let request_url = self.request_url(url);
        reqwest::Url::parse(&request_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{request_url}: {e}")))?;

        log::debug!("Fetching {}", request_url);
        let response = self.client.get(&request_url).send().await?;
        let status = response.status();
        let headers = response.headers().clone();

        // reqwest decodes the charset and decompresses gzip/deflate/br for us
        let mut body = response.text().await?;
        if body.len() > MAX_RESPONSE_BODY_SIZE {
            log::debug!(
                "Truncating {} byte body from {} to {} bytes",
                body.len(),
                url,
                MAX_RESPONSE_BODY_SIZE
            );
            let mut cut = MAX_RESPONSE_BODY_SIZE;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }

        log::debug!("{} answered {} ({} bytes)", url, status, body.len());
        Ok(GatewayResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn test_client() -> Arc<reqwest::Client> {
        Arc::new(
            reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(5))
                .build()
                .expect("Failed to create HTTP client"),
        )
    }

    #[tokio::test]
    async fn test_fetch_returns_status_headers_and_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/"))
                .respond_with(
                    status_code(200)
                        .insert_header("Server", "cloudflare")
                        .body("<html><title>Hi</title></html>"),
                ),
        );

        let gateway = HttpContentGateway::new(test_client());
        let response = gateway
            .fetch(&server.url_str("/"))
            .await
            .expect("fetch should succeed");

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.get("server").and_then(|v| v.to_str().ok()),
            Some("cloudflare")
        );
        assert_eq!(response.body, "<html><title>Hi</title></html>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_not_an_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/robots.txt"))
                .respond_with(status_code(404).body("Not Found")),
        );

        let gateway = HttpContentGateway::new(test_client());
        let response = gateway
            .fetch(&server.url_str("/robots.txt"))
            .await
            .expect("404 is still a response");
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_fetch_through_proxy_prefix() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/proxy/fetch"),
                request::query(url_decoded(contains(("url", "https://example.com/a?b=c")))),
            ])
            .respond_with(status_code(200).body("proxied")),
        );

        let prefix = format!("{}?url=", server.url_str("/proxy/fetch"));
        let gateway = HttpContentGateway::with_proxy(test_client(), prefix);
        let response = gateway
            .fetch("https://example.com/a?b=c")
            .await
            .expect("proxied fetch should succeed");
        assert_eq!(response.body, "proxied");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        // Port 9 (discard) on localhost is not listening in test environments
        let gateway = HttpContentGateway::new(test_client());
        let result = gateway.fetch("http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(GatewayError::Transport(_))));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let gateway = HttpContentGateway::new(test_client());
        let result = gateway.fetch("not a url").await;
        assert!(matches!(result, Err(GatewayError::InvalidUrl(_))));
    }

    #[test]
    fn test_proxied_url_encodes_target() {
        assert_eq!(
            proxied_url(Some("https://p.example/fetch?url="), "https://a.com/?x=1&y=2"),
            "https://p.example/fetch?url=https%3A%2F%2Fa.com%2F%3Fx%3D1%26y%3D2"
        );
        assert_eq!(proxied_url(None, "https://a.com/"), "https://a.com/");
    }
}
