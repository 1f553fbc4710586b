//! Telemetry and tracing utilities
//!
//! Installs a `tracing-subscriber` fmt subscriber for applications embedding
//! the client. Libraries should not call this; leave subscriber setup to the
//! binary.
//!
//! ## Example
//!
//! ```rust,ignore
//! use imgcrop_client::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let _guard = init_subscriber(
//!     SubscriberConfig::builder()
//!         .log_level(tracing::Level::DEBUG)
//!         .output_format(OutputFormat::Json)
//!         .build(),
//! )?;
//! ```

use crate::error::ClientError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON, one object per line
    Json,
    /// JSON without span lists and with flattened fields
    JsonCompact,
}

/// Configuration for tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Write to a file instead of stderr
    pub log_file: Option<std::path::PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// Debug-level text output
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    fn filter(&self) -> String {
        let level = self.log_level.as_str().to_lowercase();
        format!("imgcrop_client={level}")
    }
}

/// Builder for SubscriberConfig
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    log_file: Option<std::path::PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string (`trace`, `debug`, `info`, `warn`, `error`)
    pub fn log_level_str(mut self, level: &str) -> Result<Self, ClientError> {
        let parsed = level.trim().parse::<tracing::Level>().map_err(|_| {
            ClientError::Config(format!(
                "invalid log level: {level}. Valid options: trace, debug, info, warn, error"
            ))
        })?;
        self.log_level = Some(parsed);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn log_file(mut self, path: std::path::PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            log_file: self.log_file,
        }
    }
}

/// Install the global subscriber.
///
/// Console output goes straight to stderr and `Ok(None)` is returned. When
/// logging to a file, writes go through a non-blocking appender and the
/// returned guard must be kept alive for the lifetime of the program or
/// buffered lines are lost. An already-installed global subscriber is left in
/// place and `Ok(None)` is returned.
#[must_use = "dropping the guard stops file logging"]
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>, ClientError> {
    // RUST_LOG takes precedence when set
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter()));

    let (writer, guard, ansi) = match &config.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().ok_or_else(|| {
                ClientError::Config(format!("log file path has no file name: {}", path.display()))
            })?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), None, true),
    };

    match build_subscriber(config.output_format, filter, writer, ansi).try_init() {
        Ok(()) => Ok(guard),
        Err(e) if e.to_string().contains("already been set") => Ok(None),
        Err(e) => Err(ClientError::Config(format!("failed to initialize tracing: {e}"))),
    }
}

fn build_subscriber(
    format: OutputFormat,
    filter: EnvFilter,
    writer: BoxMakeWriter,
    ansi: bool,
) -> Box<dyn tracing::Subscriber + Send + Sync> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);
    match format {
        OutputFormat::Text => Box::new(builder.finish()),
        OutputFormat::Json => Box::new(builder.json().finish()),
        OutputFormat::JsonCompact => Box::new(
            builder
                .json()
                .flatten_event(true)
                .with_span_list(false)
                .finish(),
        ),
    }
}
