//! Default Configuration Values
//!
//! Centralizes the defaults used by the client so they can be adjusted in
//! one place.

use std::time::Duration;

/// HTTP client defaults
pub mod http {
    use super::*;

    /// Default origin of the image service (the backend listens on port 5001).
    pub const ORIGIN: &str = "http://127.0.0.1:5001";

    /// Path prefix applied to every API request.
    pub const BASE_PATH: &str = "/api";

    /// Request timeout applied to every call unless overridden.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(60_000);

    /// Timeout for establishing a connection.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string for HTTP requests
    pub const USER_AGENT: &str = concat!("imgcrop-client/", env!("CARGO_PKG_VERSION"));
}

/// Image service endpoints
pub mod endpoints {
    /// Upload endpoint, relative to the base path.
    pub const UPLOAD: &str = "/upload";

    /// Download prefix. Download links are built, never fetched.
    pub const DOWNLOAD_PREFIX: &str = "/download/";

    /// Multipart field name used for every uploaded file.
    pub const UPLOAD_FIELD: &str = "files";
}

/// Environment variables read by `ClientConfig::from_env`
pub mod env {
    pub const ORIGIN: &str = "IMGCROP_API_ORIGIN";
    pub const TIMEOUT_SECS: &str = "IMGCROP_API_TIMEOUT_SECS";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_timeout_is_sixty_seconds() {
        assert_eq!(http::REQUEST_TIMEOUT.as_millis(), 60_000);
    }
}
