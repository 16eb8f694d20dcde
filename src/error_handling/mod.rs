//! Error handling.
//!
//! Errors are split by layer:
//! - **Configuration**: out-of-range throttler settings
//! - **Transport**: failures of the injected request function, with
//!   cancellation distinguishable from everything else
//! - **Fetch**: what callers of the request wrapper see, where a local
//!   throttling decision is its own kind and never a transport error
//! - **Initialization**: logger and HTTP client setup

mod types;

// Re-export public API
pub use types::{ConfigError, FetchError, InitializationError, TransportError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttled_error_is_distinct() {
        let err = FetchError::Throttled {
            key: "http://test".to_string(),
        };
        assert!(err.is_throttled());
        assert!(!err.is_cancelled());
        assert_eq!(err.to_string(), "the request to http://test was throttled");
    }

    #[test]
    fn test_transport_cancellation_maps_to_cancelled() {
        let err = FetchError::from(TransportError::Cancelled);
        assert!(err.is_cancelled());
        assert!(!err.is_throttled());
    }

    #[test]
    fn test_transport_error_passes_through_unchanged() {
        let err = FetchError::from(TransportError::Other("connection reset".into()));
        match err {
            FetchError::Transport(TransportError::Other(msg)) => {
                assert_eq!(msg, "connection reset")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transport_error_is_cancelled() {
        assert!(TransportError::Cancelled.is_cancelled());
        assert!(!TransportError::Other("x".into()).is_cancelled());
    }

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::InvalidK(-1.0).to_string(),
            "K must be a finite number greater than 0, got -1"
        );
        assert_eq!(
            ConfigError::InvalidWindowLength.to_string(),
            "window length must be at least 1 second"
        );
    }
}
