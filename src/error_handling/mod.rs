//! Error handling.
//!
//! Error types are categorized into:
//! - **Fatal**: the primary page fetch failed, the run aborts
//! - **Stage-scoped**: performance probing or suggestion generation failed,
//!   recorded against that field only
//! - **Streaming**: a chat reply broke off, recorded in the reply turn

mod types;

// Re-export public API
pub use types::{
    ChatError, FetchError, GatewayError, InitializationError, LlmError, PerformanceError,
    SuggestionError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MSG_EMPTY_BODY, MSG_NETWORK_FAILURE, MSG_PSI_ALL_FAILED};

    #[test]
    fn test_fetch_error_distinguishes_transport_from_blocked() {
        let network = FetchError::Network(GatewayError::Unreachable("proxy down".into()));
        assert!(network.is_transport());
        assert_eq!(network.to_string(), MSG_NETWORK_FAILURE);

        let empty = FetchError::EmptyBody;
        assert!(!empty.is_transport());
        assert_eq!(empty.to_string(), MSG_EMPTY_BODY);

        let status = FetchError::HttpStatus {
            status: 403,
            reason: "Forbidden".into(),
        };
        assert!(!status.is_transport());
        assert!(status.to_string().contains("Status: 403 Forbidden"));
    }

    #[test]
    fn test_stage_errors_render_user_facing_messages() {
        assert_eq!(
            PerformanceError::AllProbesFailed.to_string(),
            MSG_PSI_ALL_FAILED
        );
        assert_eq!(
            PerformanceError::Api("quota exceeded".into()).to_string(),
            "quota exceeded"
        );
        let suggestion = SuggestionError::Generation(LlmError::EmptyResponse);
        assert!(suggestion.to_string().starts_with("There was an error"));
    }
}
