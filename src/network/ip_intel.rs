//! IP intelligence lookups (ISP, organization, location) via ip-api.com.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::IpIntelligence;
use crate::config::IP_API_FIELDS;
use crate::gateway::proxied_url;

/// Address family of a looked-up IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IpKind {
    IPv4,
    IPv6,
}

/// What the IP intelligence API knows about an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpDetails {
    pub ip: String,
    pub kind: IpKind,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub isp: Option<String>,
    pub org: Option<String>,
    pub asn: Option<u32>,
}

impl IpDetails {
    /// Hosting provider label: the ISP, falling back to the organization.
    pub fn provider(&self) -> Option<String> {
        self.isp
            .clone()
            .filter(|isp| !isp.is_empty())
            .or_else(|| self.org.clone().filter(|org| !org.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    region_name: Option<String>,
    city: Option<String>,
    timezone: Option<String>,
    isp: Option<String>,
    org: Option<String>,
    #[serde(rename = "as")]
    autonomous_system: Option<String>,
    query: Option<String>,
}

/// Parses `"AS15133 Edgecast Inc."` into `15133`.
fn parse_asn(autonomous_system: &str) -> Option<u32> {
    autonomous_system
        .split_whitespace()
        .next()?
        .trim_start_matches("AS")
        .parse()
        .ok()
}

impl IpApiResponse {
    fn into_details(self, requested_ip: &str) -> IpDetails {
        let ip = self
            .query
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| requested_ip.to_string());
        let kind = if ip.contains(':') {
            IpKind::IPv6
        } else {
            IpKind::IPv4
        };
        IpDetails {
            ip,
            kind,
            country: self.country,
            country_code: self.country_code,
            region: self.region_name,
            city: self.city,
            timezone: self.timezone,
            isp: self.isp,
            org: self.org,
            asn: self.autonomous_system.as_deref().and_then(parse_asn),
        }
    }
}

/// IP intelligence client for the ip-api.com JSON endpoint.
///
/// The free tier only serves plain HTTP, so a proxy prefix can be supplied to
/// route the call through an HTTPS fetch proxy.
pub struct IpApiLookup {
    client: Arc<reqwest::Client>,
    endpoint: String,
    proxy_prefix: Option<String>,
}

impl IpApiLookup {
    pub fn new(
        client: Arc<reqwest::Client>,
        endpoint: impl Into<String>,
        proxy_prefix: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            proxy_prefix,
        }
    }

    /// Looks up `ip`, reporting why the lookup failed.
    ///
    /// The [`IpIntelligence`] impl wraps this and only logs the reason.
    pub async fn lookup_detailed(&self, ip: &str) -> anyhow::Result<IpDetails> {
        let target = format!(
            "{}/{}?fields={}",
            self.endpoint.trim_end_matches('/'),
            ip,
            IP_API_FIELDS
        );
        let request_url = proxied_url(self.proxy_prefix.as_deref(), &target);

        let response = self
            .client
            .get(&request_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("API request failed with status {}", response.status());
        }

        let data: IpApiResponse = response.json().await?;
        if data.status.as_deref() != Some("success") {
            anyhow::bail!(
                "{}",
                data.message
                    .unwrap_or_else(|| "Invalid IP address or API error.".to_string())
            );
        }
        Ok(data.into_details(ip))
    }
}

#[async_trait]
impl IpIntelligence for IpApiLookup {
    async fn lookup(&self, ip: &str) -> Option<IpDetails> {
        match self.lookup_detailed(ip).await {
            Ok(details) => Some(details),
            Err(e) => {
                log::debug!("IP intelligence lookup for {} failed: {}", ip, e);
                None
            }
        }
    }
}
