//! Application initialization and resource setup.
//!
//! Builds the shared HTTP client, the logger, and the production set of
//! pipeline collaborators from a [`Config`].

mod client;
mod logger;

use std::sync::Arc;

pub use client::init_client;
pub use logger::init_logger_with;

use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::gateway::HttpContentGateway;
use crate::llm::GeminiClient;
use crate::network::{DohResolver, IpApiLookup};
use crate::performance::PageSpeedClient;
use crate::pipeline::Services;

/// Wires the HTTP adapters for every collaborator the pipeline needs.
///
/// All adapters share one client. Missing API keys are not an error here:
/// the stages that need them fail on their own when they run.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the client cannot be built.
pub fn build_services(config: &Config) -> Result<Services, InitializationError> {
    let client = init_client(config)?;

    let gateway = match config.proxy_prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => HttpContentGateway::with_proxy(Arc::clone(&client), prefix),
        _ => HttpContentGateway::new(Arc::clone(&client)),
    };
    let gemini = Arc::new(GeminiClient::new(
        Arc::clone(&client),
        config.gemini_endpoint.clone(),
        config.gemini_model.clone(),
        config.gemini_api_key.clone(),
    ));

    if config.psi_api_key.is_none() {
        log::warn!("PSI_API_KEY is not set; PageSpeed requests may be rate limited");
    }
    if config.gemini_api_key.is_none() {
        log::warn!("GEMINI_API_KEY is not set; suggestions and chat will be unavailable");
    }

    Ok(Services {
        gateway: Arc::new(gateway),
        dns: Arc::new(DohResolver::new(Arc::clone(&client), config.doh_endpoint.clone())),
        intel: Arc::new(IpApiLookup::new(
            Arc::clone(&client),
            config.ip_api_endpoint.clone(),
            config.proxy_prefix.clone(),
        )),
        performance: Arc::new(PageSpeedClient::new(
            Arc::clone(&client),
            config.psi_endpoint.clone(),
            config.psi_api_key.clone(),
        )),
        completion: gemini.clone(),
        chat: gemini,
    })
}
