//! Domain input normalization.

use log::warn;

use crate::config::MAX_URL_LENGTH;
use crate::error_handling::FetchError;

/// Turns user input into the URL the analysis runs against.
///
/// Input that already carries an http(s) scheme is kept as is. A bare domain
/// gets `https://www.` prepended (or just `https://` when it already starts
/// with `www.`). The result must parse as an http(s) URL with a host and stay
/// within `MAX_URL_LENGTH`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] for empty, overlong, or unparseable input.
pub fn normalize_domain(domain: &str) -> Result<String, FetchError> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(FetchError::InvalidUrl("empty input".to_string()));
    }

    let lowered = domain.to_ascii_lowercase();
    let normalized = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        domain.to_string()
    } else if lowered.starts_with("www.") {
        format!("https://{domain}")
    } else {
        format!("https://www.{domain}")
    };

    // Checked after normalization since the prefix adds length
    if normalized.len() > MAX_URL_LENGTH {
        warn!(
            "Rejecting URL exceeding maximum length ({} > {}): {}...",
            normalized.len(),
            MAX_URL_LENGTH,
            normalized.chars().take(50).collect::<String>()
        );
        return Err(FetchError::InvalidUrl(format!(
            "URL longer than {MAX_URL_LENGTH} characters"
        )));
    }

    match url::Url::parse(&normalized) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            Ok(normalized)
        }
        Ok(_) => {
            warn!("Rejecting unsupported URL: {domain}");
            Err(FetchError::InvalidUrl(domain.to_string()))
        }
        Err(e) => {
            warn!("Rejecting invalid URL {domain}: {e}");
            Err(FetchError::InvalidUrl(domain.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_domain;
    use crate::error_handling::FetchError;

    #[test]
    fn test_normalize_domain_adds_https_www() {
        let result = normalize_domain("example.com").ok();
        assert_eq!(result, Some("https://www.example.com".to_string()));
    }

    #[test]
    fn test_normalize_domain_does_not_double_www() {
        let result = normalize_domain("www.example.com").ok();
        assert_eq!(result, Some("https://www.example.com".to_string()));
    }

    #[test]
    fn test_normalize_domain_preserves_scheme() {
        assert_eq!(
            normalize_domain("https://example.com").ok(),
            Some("https://example.com".to_string())
        );
        assert_eq!(
            normalize_domain("http://example.com").ok(),
            Some("http://example.com".to_string())
        );
    }

    #[test]
    fn test_normalize_domain_trims_whitespace() {
        assert_eq!(
            normalize_domain("  example.com \n").ok(),
            Some("https://www.example.com".to_string())
        );
    }

    #[test]
    fn test_normalize_domain_with_path_and_port() {
        assert_eq!(
            normalize_domain("example.com/path?query=value").ok(),
            Some("https://www.example.com/path?query=value".to_string())
        );
        assert_eq!(
            normalize_domain("example.com:8080").ok(),
            Some("https://www.example.com:8080".to_string())
        );
    }

    #[test]
    fn test_normalize_domain_rejects_invalid_input() {
        assert!(matches!(
            normalize_domain("not a valid url!!!"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(normalize_domain(""), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(normalize_domain("   "), Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_normalize_domain_rejects_overlong_input() {
        let long = format!("example.com/{}", "a".repeat(2048));
        assert!(matches!(normalize_domain(&long), Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_normalize_domain_error_message_is_user_facing() {
        let err = normalize_domain("bad domain").unwrap_err();
        assert!(err.to_string().starts_with("Invalid domain:"));
    }
}
