//! DNS-over-HTTPS record lookups.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{DnsResolver, RecordType};

/// Resolver that queries a DNS-over-HTTPS JSON endpoint
/// (`?name=<host>&type=A`, `accept: application/dns-json`).
pub struct DohResolver {
    client: Arc<reqwest::Client>,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

impl DohResolver {
    pub fn new(client: Arc<reqwest::Client>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn query(&self, hostname: &str, record: RecordType) -> Result<Option<String>, reqwest::Error> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", hostname), ("type", record.as_str())])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await?
            .error_for_status()?;
        let parsed: DohResponse = response.json().await?;

        // CNAME answers precede the address records for aliased hosts
        Ok(parsed
            .answer
            .into_iter()
            .find(|answer| answer.record_type == record.code())
            .map(|answer| answer.data))
    }
}

#[async_trait]
impl DnsResolver for DohResolver {
    async fn lookup(&self, hostname: &str, record: RecordType) -> Option<String> {
        match self.query(hostname, record).await {
            Ok(Some(address)) => Some(address),
            Ok(None) => {
                log::debug!("No {} record for {}", record.as_str(), hostname);
                None
            }
            Err(e) => {
                log::debug!("{} lookup for {} failed: {}", record.as_str(), hostname, e);
                None
            }
        }
    }
}
