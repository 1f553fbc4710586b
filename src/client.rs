//! HTTP client facade
//!
//! [`ApiClient`] is the single access point to the image service. It joins
//! every path onto the configured base URL, applies the configured timeout,
//! runs the installed interceptor, and hands back only the response body.
//! Failures are reported to the interceptor and returned unchanged; there is
//! no retry.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::interceptor::{HttpInterceptor, HttpRequestContext, LoggingInterceptor};
use crate::multipart::MultipartPayload;
use crate::utils::url::join_url;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Request body variants
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(MultipartPayload),
}

/// Per-call overrides
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Replaces the client-wide timeout for this call.
    pub timeout: Option<Duration>,
    /// Extra headers for this call.
    pub headers: HashMap<String, String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Body of a successful response. Status and headers are not exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody {
    bytes: Bytes,
    content_type: Option<String>,
}

impl ResponseBody {
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// `Content-Type` reported by the server, if any
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Body as UTF-8 text (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Decode the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.bytes)?)
    }
}

/// Client facade over `reqwest` with shared configuration
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    base_url: String,
    http_client: reqwest::Client,
    interceptor: Arc<dyn HttpInterceptor>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client with its own connection pool and the logging interceptor.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = build_http_client(&config)?;
        Self::with_http_client(config, http_client)
    }

    /// Build a client on top of an existing `reqwest::Client`.
    ///
    /// The supplied client's own timeout and default headers are used as-is;
    /// only the base URL is taken from `config`.
    pub fn with_http_client(
        config: ClientConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, ClientError> {
        let base_url = config.base_url()?;
        Ok(Self {
            config: Arc::new(config),
            base_url,
            http_client,
            interceptor: Arc::new(LoggingInterceptor),
        })
    }

    /// Replace the installed interceptor.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Origin plus base path, e.g. `http://127.0.0.1:5001/api`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Issue one request and return the body of a 2xx response.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<RequestBody>,
        options: Option<RequestOptions>,
    ) -> Result<ResponseBody, ClientError> {
        let ctx = HttpRequestContext::new(method, self.url(path));
        let result = self.execute(&ctx, body, options.unwrap_or_default()).await;
        if let Err(error) = &result {
            self.interceptor.on_error(&ctx, error);
        }
        result
    }

    pub async fn get(&self, path: &str) -> Result<ResponseBody, ClientError> {
        self.request(reqwest::Method::GET, path, None, None).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<ResponseBody, ClientError> {
        self.request(reqwest::Method::POST, path, Some(RequestBody::Json(body)), None)
            .await
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        payload: MultipartPayload,
        options: Option<RequestOptions>,
    ) -> Result<ResponseBody, ClientError> {
        self.request(
            reqwest::Method::POST,
            path,
            Some(RequestBody::Multipart(payload)),
            options,
        )
        .await
    }

    async fn execute(
        &self,
        ctx: &HttpRequestContext,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> Result<ResponseBody, ClientError> {
        let mut rb = self.http_client.request(ctx.method.clone(), &ctx.url);
        if let Some(timeout) = options.timeout {
            rb = rb.timeout(timeout);
        }
        if !options.headers.is_empty() {
            rb = rb.headers(header_map(&options.headers)?);
        }
        rb = match body {
            Some(RequestBody::Json(json)) => rb.json(&json),
            // reqwest sets multipart/form-data with the boundary
            Some(RequestBody::Multipart(payload)) => rb.multipart(payload.to_form()?),
            None => rb,
        };
        rb = self.interceptor.on_before_send(ctx, rb)?;

        let resp = rb.send().await.map_err(|source| ClientError::Transport {
            url: ctx.url.clone(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = read_error_body(ctx, resp).await;
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                url: ctx.url.clone(),
                body,
            });
        }

        self.interceptor.on_response(ctx, &resp);

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().await.map_err(|source| ClientError::Transport {
            url: ctx.url.clone(),
            source,
        })?;
        Ok(ResponseBody::new(bytes, content_type))
    }
}

/// Text of a non-2xx response. A failed read keeps its cause in the body.
async fn read_error_body(ctx: &HttpRequestContext, resp: reqwest::Response) -> String {
    match resp.text().await {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(request_id=%ctx.request_id, url=%ctx.url, err=%e, "failed to read error response body");
            format!("Failed to read error response: {e}")
        }
    }
}

fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client, ClientError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }
    if !config.headers.is_empty() {
        builder = builder.default_headers(header_map(&config.headers)?);
    }
    builder
        .build()
        .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, ClientError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ClientError::Config(format!("invalid header name {key:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Config(format!("invalid value for header {key:?}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct RecordingInterceptor {
        errors: Mutex<Vec<String>>,
        responses: Mutex<u32>,
    }

    impl HttpInterceptor for RecordingInterceptor {
        fn on_response(&self, _ctx: &HttpRequestContext, _response: &reqwest::Response) {
            *self.responses.lock().unwrap() += 1;
        }

        fn on_error(&self, _ctx: &HttpRequestContext, error: &ClientError) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    struct RejectingInterceptor;

    impl HttpInterceptor for RejectingInterceptor {
        fn on_before_send(
            &self,
            _ctx: &HttpRequestContext,
            _builder: reqwest::RequestBuilder,
        ) -> Result<reqwest::RequestBuilder, ClientError> {
            Err(ClientError::Config("blocked".into()))
        }
    }

    fn client_for(server: &mockito::Server) -> ApiClient {
        ApiClient::new(ClientConfig::builder().origin(server.url()).build()).unwrap()
    }

    #[tokio::test]
    async fn success_returns_body_only() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/test/alice")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-extra", "ignored")
            .with_body(r#"{"name":"alice"}"#)
            .create_async()
            .await;

        let body = client_for(&server).get("/test/alice").await.unwrap();
        assert_eq!(body.content_type(), Some("application/json"));
        let json: serde_json::Value = body.json().unwrap();
        assert_eq!(json, serde_json::json!({"name": "alice"}));
    }

    #[tokio::test]
    async fn non_success_is_http_status_and_reaches_interceptor() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/echo")
            .with_status(400)
            .with_body(r#"{"error":"bad"}"#)
            .expect(1)
            .create_async()
            .await;

        let recorder = Arc::new(RecordingInterceptor::default());
        let client = client_for(&server).with_interceptor(recorder.clone());
        let err = client
            .post_json("/echo", serde_json::json!({"a": 1}))
            .await
            .unwrap_err();

        match &err {
            ClientError::HttpStatus { status, body, url } => {
                assert_eq!(*status, 400);
                assert_eq!(body, r#"{"error":"bad"}"#);
                assert!(url.ends_with("/api/echo"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
        assert_eq!(err.server_message().as_deref(), Some("bad"));
        assert_eq!(recorder.errors.lock().unwrap().len(), 1);
        assert_eq!(*recorder.responses.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn success_notifies_on_response_only() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/ping")
            .with_status(204)
            .create_async()
            .await;

        let recorder = Arc::new(RecordingInterceptor::default());
        let client = client_for(&server).with_interceptor(recorder.clone());
        let body = client.get("ping").await.unwrap();

        assert!(body.bytes().is_empty());
        assert_eq!(*recorder.responses.lock().unwrap(), 1);
        assert!(recorder.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn config_and_request_headers_are_sent() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/api/headers")
            .match_header("x-client", "ui")
            .match_header("x-call", "42")
            .match_header("user-agent", crate::defaults::http::USER_AGENT)
            .with_status(200)
            .create_async()
            .await;

        let config = ClientConfig::builder()
            .origin(server.url())
            .header("x-client", "ui")
            .build();
        let client = ApiClient::new(config).unwrap();
        client
            .request(
                reqwest::Method::GET,
                "/headers",
                None,
                Some(RequestOptions::new().with_header("x-call", "42")),
            )
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn interceptor_can_short_circuit() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/api/never")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server).with_interceptor(Arc::new(RejectingInterceptor));
        let err = client.get("/never").await.unwrap_err();
        assert!(matches!(err, ClientError::Config(ref msg) if msg == "blocked"));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn invalid_request_header_is_config_error() {
        let server = mockito::Server::new_async().await;
        let err = client_for(&server)
            .request(
                reqwest::Method::GET,
                "/x",
                None,
                Some(RequestOptions::new().with_header("bad header", "v")),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn invalid_default_header_fails_construction() {
        let config = ClientConfig::builder().header("x-ok", "line\nbreak").build();
        assert!(matches!(ApiClient::new(config), Err(ClientError::Config(_))));
    }

    #[test]
    fn urls_are_joined_on_base() {
        let client = ApiClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:5001/api");
        assert_eq!(client.url("/upload"), "http://127.0.0.1:5001/api/upload");
    }

    #[tokio::test]
    #[traced_test]
    async fn unreadable_error_body_keeps_cause() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Promises 100 body bytes, sends 5, then hangs up
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\nshort")
                .await;
        });

        let client =
            ApiClient::new(ClientConfig::builder().origin(format!("http://{addr}")).build()).unwrap();
        let err = client.get("/broken").await.unwrap_err();

        match &err {
            ClientError::HttpStatus { status, body, .. } => {
                assert_eq!(*status, 500);
                assert!(body.starts_with("Failed to read error response: "), "{body}");
                assert!(body.len() > "Failed to read error response: ".len());
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
        assert!(logs_contain("failed to read error response body"));
    }

    #[tokio::test]
    #[traced_test]
    async fn failures_are_logged() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/broken")
            .with_status(500)
            .with_body("server error")
            .create_async()
            .await;

        let err = client_for(&server).get("/broken").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(logs_contain("request failed"));
        assert!(logs_contain("HTTP 500"));
    }
}
