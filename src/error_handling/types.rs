//! Error type definitions.
//!
//! This module defines the error types used throughout the analyzer. They map
//! onto the pipeline's failure taxonomy:
//! - **Fatal**: [`FetchError`] aborts the whole analysis run
//! - **Stage-scoped**: [`PerformanceError`] and [`SuggestionError`] blank one field
//! - **Streaming**: [`LlmError`] during a chat reply replaces the placeholder turn
//!
//! Best-effort lookups (robots.txt, DNS, IP intelligence) never produce errors;
//! they degrade to `None` inside their own module.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

use crate::config::{MSG_EMPTY_BODY, MSG_NETWORK_FAILURE, MSG_PSI_ALL_FAILED, MSG_SUGGESTIONS_FAILED};

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors raised by a content-retrieval gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request could not be sent or the body could not be read.
    #[error("Gateway transport error: {0}")]
    Transport(#[from] ReqwestError),

    /// The URL handed to the gateway could not be parsed.
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// The gateway could not reach the target for another reason.
    #[error("Gateway unreachable: {0}")]
    Unreachable(String),
}

/// Fatal errors from the primary page fetch.
///
/// Any of these aborts the analysis run; the display string is the single
/// user-facing message the run reports.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The domain could not be turned into a valid http(s) URL.
    #[error("Invalid domain: {0}. Please check the domain and try again.")]
    InvalidUrl(String),

    /// Network or proxy failure before a response arrived.
    #[error("{}", MSG_NETWORK_FAILURE)]
    Network(#[source] GatewayError),

    /// The target answered with a non-success status.
    #[error("Failed to fetch URL. Status: {status} {reason}. The target website may be down or blocking the request.")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase (may be empty)
        reason: String,
    },

    /// The target answered successfully but with an empty body.
    #[error("{}", MSG_EMPTY_BODY)]
    EmptyBody,
}

impl FetchError {
    /// Returns `true` when the failure happened in transport (network/proxy)
    /// rather than because the site blocked us or returned nothing.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

/// Errors from a single performance probe or the probing stage as a whole.
#[derive(Error, Debug)]
pub enum PerformanceError {
    /// The scoring API reported an error (message already normalized).
    #[error("{0}")]
    Api(String),

    /// The request failed before the API answered.
    #[error("PageSpeed request failed: {0}")]
    Transport(#[from] ReqwestError),

    /// The response body did not have the expected shape.
    #[error("Unexpected PageSpeed response: {0}")]
    Decode(String),

    /// Both device probes failed.
    #[error("{}", MSG_PSI_ALL_FAILED)]
    AllProbesFailed,
}

/// Errors from the generative-text and chat APIs.
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API key was configured.
    #[error("No API key configured for the generative-text API")]
    MissingApiKey,

    /// The request failed before the API answered.
    #[error("Generative API request failed: {0}")]
    Transport(#[from] ReqwestError),

    /// The API answered with a non-success status.
    #[error("Generative API returned status {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// The API answered but produced no text.
    #[error("Generative API returned no text")]
    EmptyResponse,
}

/// Suggestion generation failure, wrapped into the user-facing message.
#[derive(Error, Debug)]
pub enum SuggestionError {
    /// The completion request failed.
    #[error("{}", MSG_SUGGESTIONS_FAILED)]
    Generation(#[source] LlmError),
}

/// Errors returned when a chat message cannot be sent at all.
///
/// Failures *during* streaming are not errors; they are written into the
/// placeholder turn and the session stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// No conversation session exists for the current run yet.
    #[error("No conversation session is open")]
    NoSession,

    /// A reply is still streaming.
    #[error("A response is still streaming")]
    Busy,

    /// The session was closed by a newer analysis.
    #[error("The conversation session is closed")]
    Closed,

    /// Empty messages are not sent.
    #[error("Message is empty")]
    EmptyMessage,
}
