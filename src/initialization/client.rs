//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Opt, TCP_CONNECT_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used by the CLI transport.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from options
/// - Overall timeout from options
/// - TCP connect timeout of `TCP_CONNECT_TIMEOUT_SECS`
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(opt: &Opt) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(opt.timeout_seconds))
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .user_agent(opt.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
