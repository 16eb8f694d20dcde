//! Transport abstraction for the request wrapper.
//!
//! The throttler never performs I/O itself. Requests go through a
//! [`Transport`], which is either the bundled [`ReqwestTransport`] or any
//! async function wrapped with [`transport_fn`].

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RequestOptions;
use crate::error_handling::TransportError;

/// Exposes the HTTP status code of a transport response.
pub trait ResponseStatus {
    /// The numeric HTTP status code.
    fn status_code(&self) -> u16;
}

impl ResponseStatus for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

impl ResponseStatus for u16 {
    fn status_code(&self) -> u16 {
        *self
    }
}

/// Performs a single request.
///
/// Implementations report deliberate aborts as [`TransportError::Cancelled`]
/// so they are not counted against the destination.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Response type handed back to the caller unchanged.
    type Response: ResponseStatus + Send;

    /// Sends one request to `url`.
    async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Self::Response, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Arc<reqwest::Client>,
}

impl ReqwestTransport {
    /// Wraps an existing client.
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    type Response = reqwest::Response;

    async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Self::Response, TransportError> {
        let method = options.method.clone().unwrap_or(reqwest::Method::GET);
        let mut builder = self.client.request(method, url);
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.send().await?)
    }
}

/// [`Transport`] that delegates to an async function.
///
/// Created with [`transport_fn`].
#[derive(Clone)]
pub struct FnTransport<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnTransport<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransport").finish_non_exhaustive()
    }
}

/// Wraps `f(url, options)` as a [`Transport`].
///
/// # Examples
///
/// ```
/// use throttled_fetch::{transport_fn, RequestOptions, TransportError};
///
/// let transport = transport_fn(|_url: String, _options: RequestOptions| async move {
///     Ok::<u16, TransportError>(200)
/// });
/// # let _ = transport;
/// ```
pub fn transport_fn<F, Fut, R>(f: F) -> FnTransport<F>
where
    F: Fn(String, RequestOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, TransportError>> + Send + 'static,
    R: ResponseStatus + Send + 'static,
{
    FnTransport { f }
}

#[async_trait]
impl<F, Fut, R> Transport for FnTransport<F>
where
    F: Fn(String, RequestOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, TransportError>> + Send + 'static,
    R: ResponseStatus + Send + 'static,
{
    type Response = R;

    async fn send(&self, url: &str, options: &RequestOptions) -> Result<R, TransportError> {
        (self.f)(url.to_string(), options.clone()).await
    }
}
