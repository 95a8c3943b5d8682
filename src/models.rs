//! Analysis data model.
//!
//! These are the fixed internal record shapes every remote response is
//! validated into. They serialize with camelCase keys because the chat
//! priming turn embeds them as JSON.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::network::IpDetails;

/// Where the extracted page title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleSource {
    /// A `<title>` element
    TitleTag,
    /// A `<meta name="title">` element
    MetaNameTitle,
    /// No static title; the page looks client-rendered
    JsRendered,
    /// No title at all
    None,
}

/// Outcome of the robots.txt request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotsTxtStatus {
    /// Fetched successfully
    Found,
    /// The server answered with a non-success status
    NotFound,
    /// The request itself failed
    Error,
}

impl RobotsTxtStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotsTxtStatus::Found => "found",
            RobotsTxtStatus::NotFound => "not_found",
            RobotsTxtStatus::Error => "error",
        }
    }
}

/// robots.txt body and the status of the request that fetched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsTxt {
    pub content: Option<String>,
    pub status: RobotsTxtStatus,
}

/// One `h1`-`h6` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Lowercased tag name (`h1` ... `h6`)
    pub tag: String,
    /// Trimmed text content
    pub text: String,
}

/// Structured page metadata extracted from the primary fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    pub title: String,
    pub title_source: TitleSource,
    /// Empty string when absent, so length checks need no null handling
    pub description: String,
    pub canonical: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub twitter_card: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
    pub headings: Vec<Heading>,
    pub favicon: Option<String>,
    pub robots_txt: Option<String>,
    pub robots_txt_status: RobotsTxtStatus,
}

impl MetaData {
    /// Returns `true` if the title is the client-rendered placeholder rather
    /// than text taken from the page.
    pub fn is_js_rendered_title(&self) -> bool {
        self.title_source == TitleSource::JsRendered
    }

    /// Number of `h1` headings on the page.
    pub fn h1_count(&self) -> usize {
        self.headings.iter().filter(|h| h.tag == "h1").count()
    }
}

/// Hosting and transport details for the analyzed host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDetails {
    pub ip_address: Option<String>,
    pub ipv6_address: Option<String>,
    pub hosting_provider: Option<String>,
    /// Location and network owner of the IPv4 address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_details: Option<IpDetails>,
    pub is_hsts_enabled: bool,
    pub server_signature: Option<String>,
    pub cdn_provider: Option<String>,
    pub ssl_enabled: bool,
    pub other_headers: BTreeMap<String, String>,
}

/// One named Lighthouse metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PsiMetric {
    pub id: String,
    pub title: String,
    pub display_value: String,
    /// 0-100
    pub score: u8,
}

/// Performance results for one device strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PsiDeviceData {
    /// 0-100
    pub score: u8,
    pub metrics: Vec<PsiMetric>,
}

impl PsiDeviceData {
    /// Display value of a metric by id, if the metric was reported.
    pub fn metric_display(&self, id: &str) -> Option<&str> {
        self.metrics
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.display_value.as_str())
    }
}

/// Performance results for both device strategies; either slot may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PsiData {
    pub mobile: Option<PsiDeviceData>,
    pub desktop: Option<PsiDeviceData>,
}

/// The record the orchestrator builds up over one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub url: String,
    pub meta_data: MetaData,
    pub server_details: ServerDetails,
    pub psi_data: Option<PsiData>,
    pub seo_suggestions: Option<String>,
    pub psi_error: Option<String>,
    pub suggestions_error: Option<String>,
}

impl AnalysisResult {
    /// A fresh result holding only the core-stage data.
    pub fn partial(url: String, meta_data: MetaData, server_details: ServerDetails) -> Self {
        AnalysisResult {
            url,
            meta_data,
            server_details,
            psi_data: None,
            seo_suggestions: None,
            psi_error: None,
            suggestions_error: None,
        }
    }
}

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}
