//! PageSpeed Insights v5 client.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{DeviceStrategy, PerformanceApi};
use crate::config::{MSG_PSI_LIGHTHOUSE_FAILED, MSG_PSI_UNKNOWN, PSI_GENERIC_LIGHTHOUSE_ERROR};
use crate::error_handling::PerformanceError;
use crate::models::{PsiDeviceData, PsiMetric};

/// Lighthouse audits reported, in display order: `(audit id, title)`.
pub const TRACKED_METRICS: &[(&str, &str)] = &[
    ("largest-contentful-paint", "Largest Contentful Paint (LCP)"),
    ("cumulative-layout-shift", "Cumulative Layout Shift (CLS)"),
    ("first-contentful-paint", "First Contentful Paint (FCP)"),
    ("total-blocking-time", "Total Blocking Time (TBT)"),
    ("speed-index", "Speed Index"),
    ("interactive", "Time to Interactive (TTI)"),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PsiResponse {
    lighthouse_result: LighthouseResult,
}

#[derive(Debug, Deserialize)]
struct LighthouseResult {
    #[serde(default)]
    categories: Categories,
    #[serde(default)]
    audits: HashMap<String, Audit>,
}

#[derive(Debug, Default, Deserialize)]
struct Categories {
    performance: Option<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Audit {
    display_value: Option<String>,
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Converts a 0-1 Lighthouse score to 0-100; a missing score counts as 0.
fn to_percent(score: Option<f64>) -> u8 {
    (score.unwrap_or(0.0) * 100.0).round().clamp(0.0, 100.0) as u8
}

fn into_device_data(result: LighthouseResult) -> PsiDeviceData {
    let score = to_percent(result.categories.performance.and_then(|c| c.score));
    let mut audits = result.audits;
    let metrics = TRACKED_METRICS
        .iter()
        .filter_map(|(id, title)| {
            audits.remove(*id).map(|audit| PsiMetric {
                id: (*id).to_string(),
                title: (*title).to_string(),
                display_value: audit
                    .display_value
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| "N/A".to_string()),
                score: to_percent(audit.score),
            })
        })
        .collect();
    PsiDeviceData { score, metrics }
}

/// Maps the API's error message to the one shown to users.
///
/// The generic Lighthouse failure is replaced by an explanation; any other
/// message passes through unchanged.
pub fn normalize_error_message(message: Option<&str>) -> String {
    match message {
        Some(PSI_GENERIC_LIGHTHOUSE_ERROR) => MSG_PSI_LIGHTHOUSE_FAILED.to_string(),
        Some(m) if !m.is_empty() => m.to_string(),
        _ => MSG_PSI_UNKNOWN.to_string(),
    }
}

/// [`PerformanceApi`] backed by the PageSpeed Insights REST endpoint.
pub struct PageSpeedClient {
    client: Arc<reqwest::Client>,
    endpoint: String,
    api_key: Option<String>,
}

impl PageSpeedClient {
    pub fn new(client: Arc<reqwest::Client>, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl PerformanceApi for PageSpeedClient {
    async fn assess(&self, url: &str, strategy: DeviceStrategy) -> Result<PsiDeviceData, PerformanceError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("url", url),
            ("strategy", strategy.as_ref()),
            ("category", "performance"),
        ];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }

        log::debug!("Requesting {} PageSpeed assessment for {}", strategy.as_ref(), url);
        let response = self.client.get(&self.endpoint).query(&query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => normalize_error_message(
                    envelope.error.as_ref().and_then(|e| e.message.as_deref()),
                ),
                Err(_) => format!("HTTP error! status: {}", status.as_u16()),
            };
            return Err(PerformanceError::Api(message));
        }

        let body = response.text().await?;
        let parsed: PsiResponse =
            serde_json::from_str(&body).map_err(|e| PerformanceError::Decode(e.to_string()))?;
        Ok(into_device_data(parsed.lighthouse_result))
    }
}
