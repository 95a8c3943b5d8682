//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_DOH_ENDPOINT, DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, DEFAULT_IP_API_ENDPOINT,
    DEFAULT_PSI_ENDPOINT, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Every remote endpoint is configurable so the pipeline can be pointed at
/// mock servers in tests or at self-hosted proxies in production.
///
/// # Examples
///
/// ```no_run
/// use seo_analyzer::Config;
///
/// let config = Config {
///     psi_api_key: Some("key".to_string()),
///     gemini_api_key: Some("key".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Optional fetch proxy prefix; the target URL is percent-encoded and
    /// appended (e.g. `https://proxy.example.com/fetch?url=`)
    pub proxy_prefix: Option<String>,

    /// DNS-over-HTTPS JSON endpoint
    pub doh_endpoint: String,

    /// IP intelligence endpoint
    pub ip_api_endpoint: String,

    /// PageSpeed Insights endpoint
    pub psi_endpoint: String,

    /// PageSpeed Insights API key
    pub psi_api_key: Option<String>,

    /// Gemini REST base URL
    pub gemini_endpoint: String,

    /// Gemini model name
    pub gemini_model: String,

    /// Gemini API key
    pub gemini_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy_prefix: None,
            doh_endpoint: DEFAULT_DOH_ENDPOINT.to_string(),
            ip_api_endpoint: DEFAULT_IP_API_ENDPOINT.to_string(),
            psi_endpoint: DEFAULT_PSI_ENDPOINT.to_string(),
            psi_api_key: None,
            gemini_endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_key: None,
        }
    }
}

/// Command-line options for the `seo_analyzer` binary.
#[derive(Debug, Parser)]
#[command(
    name = "seo_analyzer",
    about = "Analyze a site's SEO metadata, hosting, and performance"
)]
pub struct Opt {
    /// Domain or URL to analyze (bare domains are analyzed as https://www.<domain>)
    #[arg(value_parser)]
    pub domain: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Fetch proxy prefix the percent-encoded target URL is appended to
    #[arg(long, env = "SEO_PROXY_PREFIX")]
    pub proxy_prefix: Option<String>,

    /// PageSpeed Insights API key
    #[arg(long, env = "PSI_API_KEY", hide_env_values = true)]
    pub psi_api_key: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Print the final analysis result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// After the analysis, read questions from stdin and stream answers
    #[arg(long)]
    pub chat: bool,
}

impl From<&Opt> for Config {
    fn from(opt: &Opt) -> Self {
        Config {
            log_level: opt.log_level.clone(),
            log_format: opt.log_format.clone(),
            timeout_seconds: opt.timeout_seconds,
            user_agent: opt.user_agent.clone(),
            proxy_prefix: opt.proxy_prefix.clone(),
            psi_api_key: opt.psi_api_key.clone(),
            gemini_api_key: opt.gemini_api_key.clone(),
            gemini_model: opt.gemini_model.clone(),
            ..Default::default()
        }
    }
}
