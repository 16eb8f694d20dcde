//! Command-line URL validation.

use log::warn;

use crate::config::MAX_URL_LENGTH;

/// Validates a URL given on the command line.
///
/// Adds an `https://` prefix when no scheme is given, then checks that the
/// result parses and uses `http` or `https`. The returned string is the input
/// as typed (plus any added prefix), not the parser's normalized form, so the
/// throttling key matches what the user passed.
///
/// Logs a warning and returns `None` for anything unusable.
pub fn validate_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    if candidate.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping URL exceeding maximum length ({} > {MAX_URL_LENGTH})",
            candidate.len()
        );
        return None;
    }

    match url::Url::parse(&candidate) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Some(candidate)
        }
        Ok(parsed) => {
            warn!("Skipping URL with unsupported scheme {}: {raw}", parsed.scheme());
            None
        }
        Err(e) => {
            warn!("Skipping invalid URL {raw}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_adds_https() {
        assert_eq!(
            validate_url("example.com/items?page=2"),
            Some("https://example.com/items?page=2".to_string())
        );
    }

    #[test]
    fn test_validate_url_keeps_input_form() {
        // No trailing slash added, so the throttling key is unchanged
        assert_eq!(
            validate_url("http://example.com"),
            Some("http://example.com".to_string())
        );
        assert_eq!(
            validate_url("  https://example.com:8080/a  "),
            Some("https://example.com:8080/a".to_string())
        );
    }

    #[test]
    fn test_validate_url_rejects_other_schemes() {
        assert_eq!(validate_url("ftp://example.com"), None);
        assert_eq!(validate_url("file:///etc/passwd"), None);
    }

    #[test]
    fn test_validate_url_rejects_garbage() {
        assert_eq!(validate_url(""), None);
        assert_eq!(validate_url("not a url at all!!!"), None);
    }

    #[test]
    fn test_validate_url_rejects_overlong() {
        let long = format!("example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert_eq!(validate_url(&long), None);
    }
}
