//! HTTP Interceptor interfaces
//!
//! A single interceptor is installed on each [`ApiClient`](crate::ApiClient).
//! It can observe or tweak the request builder before send, observe
//! successful responses, and is notified of every failure before the error is
//! returned to the caller. Hooks are best-effort and should stay cheap.

use crate::error::ClientError;

/// Context passed to interceptors describing the request.
#[derive(Clone, Debug)]
pub struct HttpRequestContext {
    /// Unique id for this request, useful to correlate log lines.
    pub request_id: String,
    pub method: reqwest::Method,
    pub url: String,
}

impl HttpRequestContext {
    pub fn new(method: reqwest::Method, url: impl Into<String>) -> Self {
        Self {
            request_id: generate_request_id(),
            method,
            url: url.into(),
        }
    }
}

/// Generate a request id (UUID v4)
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// HTTP interceptor trait
pub trait HttpInterceptor: Send + Sync {
    /// Called before sending a request. Return the (possibly modified)
    /// builder, or an error to short-circuit the request.
    fn on_before_send(
        &self,
        _ctx: &HttpRequestContext,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        Ok(builder)
    }

    /// Called after a successful (2xx) response is received.
    fn on_response(&self, _ctx: &HttpRequestContext, _response: &reqwest::Response) {}

    /// Called when sending fails or the server returns a non-success status.
    fn on_error(&self, _ctx: &HttpRequestContext, _error: &ClientError) {}
}

/// Pass-through interceptor that logs through `tracing` (no bodies).
#[derive(Clone, Debug, Default)]
pub struct LoggingInterceptor;

impl HttpInterceptor for LoggingInterceptor {
    fn on_before_send(
        &self,
        ctx: &HttpRequestContext,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        tracing::debug!(request_id=%ctx.request_id, method=%ctx.method, url=%ctx.url, "sending request");
        Ok(builder)
    }

    fn on_response(&self, ctx: &HttpRequestContext, response: &reqwest::Response) {
        tracing::debug!(request_id=%ctx.request_id, method=%ctx.method, url=%ctx.url, status=%response.status().as_u16(), "response received");
    }

    fn on_error(&self, ctx: &HttpRequestContext, error: &ClientError) {
        tracing::error!(request_id=%ctx.request_id, method=%ctx.method, url=%ctx.url, err=%error, "request failed");
    }
}

/// Interceptor that does nothing, for callers that do their own logging.
#[derive(Clone, Debug, Default)]
pub struct NoopInterceptor;

impl HttpInterceptor for NoopInterceptor {}
