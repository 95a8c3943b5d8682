//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoints, timeouts, user-facing messages)
//! - HTTP header name constants
//! - Library configuration and CLI option types

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Config, LogFormat, LogLevel, Opt};
