//! Throttled request wrapper.

use std::sync::Arc;

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use super::transport::{ResponseStatus, Transport};
use crate::adaptive_throttler::{AdaptiveThrottler, Completion};
use crate::config::{RequestOptions, RequestSettings};
use crate::error_handling::{FetchError, TransportError};
use crate::utils::strip_query_params;

/// Sends requests through a [`Transport`], gated by an [`AdaptiveThrottler`].
///
/// Cloning is cheap; clones share the throttler and the transport.
#[derive(Debug)]
pub struct ThrottledClient<T> {
    throttler: Arc<AdaptiveThrottler>,
    transport: Arc<T>,
}

impl<T> Clone for ThrottledClient<T> {
    fn clone(&self) -> Self {
        ThrottledClient {
            throttler: Arc::clone(&self.throttler),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> ThrottledClient<T> {
    /// Creates a client from a throttler and a transport.
    pub fn new(throttler: Arc<AdaptiveThrottler>, transport: T) -> Self {
        ThrottledClient {
            throttler,
            transport: Arc::new(transport),
        }
    }

    /// The throttler gating this client.
    pub fn throttler(&self) -> &AdaptiveThrottler {
        &self.throttler
    }

    /// Sends a request to `url` unless the throttler rejects it.
    ///
    /// - A rejected request fails with [`FetchError::Throttled`] and never
    ///   reaches the transport.
    /// - A response is returned unchanged; it is recorded as accepted when its
    ///   status is below the configured failure threshold.
    /// - A transport error is recorded as a failure and returned.
    /// - A cancelled request is returned as [`FetchError::Cancelled`] and not
    ///   recorded.
    ///
    /// # Errors
    ///
    /// See above.
    pub async fn request(
        &self,
        url: &str,
        options: &RequestOptions,
        settings: RequestSettings,
    ) -> Result<T::Response, FetchError> {
        self.request_with_cancel(url, options, settings, None).await
    }

    /// Like [`request`](Self::request), aborting the transport call when
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn request_with_cancel(
        &self,
        url: &str,
        options: &RequestOptions,
        settings: RequestSettings,
        cancel: Option<&CancellationToken>,
    ) -> Result<T::Response, FetchError> {
        let completion = if settings.apply_throttling {
            Some(self.admit(url, settings)?)
        } else {
            None
        };

        let send = self.transport.send(url, options);
        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(TransportError::Cancelled),
                result = send => result,
            },
            None => send.await,
        };

        match result {
            Ok(response) => {
                let status = response.status_code();
                if let Some(completion) = completion {
                    completion.complete(settings.failure_threshold.is_success(status));
                }
                Ok(response)
            }
            Err(TransportError::Cancelled) => {
                debug!("Request to {url} cancelled");
                if let Some(completion) = completion {
                    completion.abandon();
                }
                Err(FetchError::Cancelled)
            }
            Err(e) => {
                warn!("Request to {url} failed: {e}");
                if let Some(completion) = completion {
                    completion.complete(false);
                }
                Err(FetchError::Transport(e))
            }
        }
    }

    fn admit(&self, url: &str, settings: RequestSettings) -> Result<Completion, FetchError> {
        let key = if settings.strip_query_params {
            strip_query_params(url)
        } else {
            url
        };

        let admission = self.throttler.check(key);
        if admission.is_throttled() {
            return Err(FetchError::Throttled {
                key: key.to_string(),
            });
        }
        Ok(admission.into_completion())
    }
}
