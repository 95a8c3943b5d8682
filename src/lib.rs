//! seo_analyzer library: staged SEO analysis of a single site
//!
//! One analysis run fetches a page and its robots.txt, resolves the host's
//! addresses and hosting provider, scores the page with PageSpeed Insights
//! for mobile and desktop, asks a generative model for improvement
//! suggestions, and finally opens a chat session seeded with everything
//! that was found. Only the page fetch is fatal; every other stage fails on
//! its own, and results are published progressively as snapshots.
//!
//! # Example
//!
//! ```no_run
//! use seo_analyzer::initialization::build_services;
//! use seo_analyzer::{AnalysisOrchestrator, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
//!     ..Default::default()
//! };
//! let orchestrator = AnalysisOrchestrator::new(build_services(&config)?);
//!
//! let snapshot = orchestrator.start_analysis("example.com").await;
//! if let Some(result) = &snapshot.result {
//!     println!("{}: {}", result.url, result.meta_data.title);
//! }
//! orchestrator.send_chat_message("How can I improve my title?").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod audit;
pub mod chat;
pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod gateway;
pub mod initialization;
pub mod llm;
pub mod models;
pub mod network;
pub mod parse;
pub mod performance;
pub mod pipeline;
pub mod suggestions;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{ChatError, FetchError, PerformanceError, SuggestionError};
pub use models::AnalysisResult;
pub use pipeline::{AnalysisOrchestrator, AnalysisSnapshot, PipelineState, RunPhase, Services};
