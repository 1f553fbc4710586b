//! Error types for imgcrop-client
//!
//! Wire failures come in two kinds: [`ClientError::Transport`] when no usable
//! response was received, and [`ClientError::HttpStatus`] when the server
//! answered with a non-success status. Both are logged by the installed
//! interceptor and handed to the caller unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to the image service
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or connection failure (DNS, refused connection, timeout,
    /// interrupted body).
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server responded with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        status: u16,
        url: String,
        /// Raw error body as returned by the server.
        body: String,
    },

    /// Invalid client configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a local file failed
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A response body could not be decoded into the requested type.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status for [`ClientError::HttpStatus`], or the status attached to
    /// a transport error if reqwest recorded one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }

    /// The backend reports failures as `{"error": "..."}`. Returns that message
    /// when the error body has this shape.
    pub fn server_message(&self) -> Option<String> {
        let Self::HttpStatus { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("error")?
            .as_str()
            .map(str::to_string)
    }
}

/// Result type for imgcrop-client operations
pub type Result<T> = std::result::Result<T, ClientError>;
