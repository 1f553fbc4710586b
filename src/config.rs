//! Client configuration.
//!
//! `ClientConfig` is immutable once built and is held by [`ApiClient`](crate::ApiClient).
//! Use [`ClientConfig::builder`] to construct one, or [`ClientConfig::from_env`]
//! to pick up overrides from the process environment.

use crate::defaults;
use crate::error::ClientError;
use crate::utils::url::{join_url, normalize_base_path};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for the image service client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host and port of the service, e.g. `http://127.0.0.1:5001`
    pub origin: String,
    /// Path prefix applied to every request
    pub base_path: String,
    /// Request timeout
    #[serde(with = "duration_option_serde")]
    pub timeout: Option<Duration>,
    /// Connection timeout
    #[serde(with = "duration_option_serde")]
    pub connect_timeout: Option<Duration>,
    /// Headers sent with every request
    pub headers: HashMap<String, String>,
    /// User agent
    pub user_agent: Option<String>,
}

/// Builder for `ClientConfig`
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    origin: Option<String>,
    base_path: Option<String>,
    timeout: Option<Option<Duration>>,
    connect_timeout: Option<Option<Duration>>,
    headers: HashMap<String, String>,
    user_agent: Option<Option<String>>,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin<S: Into<String>>(mut self, origin: S) -> Self {
        self.origin = Some(origin.into());
        self
    }
    pub fn base_path<S: Into<String>>(mut self, base_path: S) -> Self {
        self.base_path = Some(base_path.into());
        self
    }
    /// `None` disables the request timeout.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }
    pub fn user_agent<S: Into<String>>(mut self, user_agent: Option<S>) -> Self {
        self.user_agent = Some(user_agent.map(|s| s.into()));
        self
    }
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Build the configuration, filling unset fields with defaults
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            origin: self.origin.unwrap_or(defaults.origin),
            base_path: self.base_path.unwrap_or(defaults.base_path),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            headers: self.headers,
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        }
    }
}

impl ClientConfig {
    /// Returns a builder for constructing `ClientConfig`
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Defaults overlaid with `IMGCROP_API_ORIGIN` and `IMGCROP_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(origin) = lookup(defaults::env::ORIGIN).filter(|v| !v.trim().is_empty()) {
            config.origin = origin.trim().to_string();
        }
        if let Some(raw) = lookup(defaults::env::TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!(
                    "{} must be a whole number of seconds, got {raw:?}",
                    defaults::env::TIMEOUT_SECS
                ))
            })?;
            // 0 disables the timeout
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Origin joined with the normalized base path, e.g. `http://127.0.0.1:5001/api`.
    ///
    /// Fails when the origin is not an absolute http(s) URL.
    pub fn base_url(&self) -> Result<String, ClientError> {
        let parsed = reqwest::Url::parse(&self.origin)
            .map_err(|e| ClientError::Config(format!("invalid origin {:?}: {e}", self.origin)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "origin must use http or https, got {:?}",
                parsed.scheme()
            )));
        }
        Ok(join_url(&self.origin, &normalize_base_path(&self.base_path)))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: defaults::http::ORIGIN.to_string(),
            base_path: defaults::http::BASE_PATH.to_string(),
            timeout: Some(defaults::http::REQUEST_TIMEOUT),
            connect_timeout: Some(defaults::http::CONNECT_TIMEOUT),
            headers: HashMap::new(),
            user_agent: Some(defaults::http::USER_AGENT.to_string()),
        }
    }
}

// Durations are (de)serialized as whole seconds
mod duration_option_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_secs().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
