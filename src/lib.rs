//! imgcrop-client
//!
//! HTTP client for the image border cropping service. An [`ApiClient`] holds
//! the shared configuration (origin, `/api` base path, 60 s timeout) and a
//! logging interceptor; [`ImageApi`] uploads batches of images as
//! `multipart/form-data` and builds download links.
//!
//! ```rust,ignore
//! use imgcrop_client::prelude::*;
//!
//! let api = ImageApi::new(ApiClient::new(ClientConfig::from_env()?)?);
//! let body = api.upload_images(vec![ImageFile::from_path("scan.png").await?]).await?;
//! let link = download_url("processed_scan.png");
//! ```
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod defaults;
pub mod error;
pub mod images;
pub mod interceptor;
pub mod multipart;
pub mod telemetry;
pub mod utils;

pub use client::{ApiClient, RequestBody, RequestOptions, ResponseBody};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::ClientError;
pub use images::{ImageApi, ImageUploader, ProcessedImage, UploadResponse, download_url};
pub use interceptor::{HttpInterceptor, HttpRequestContext, LoggingInterceptor, NoopInterceptor};
pub use multipart::{ImageFile, MultipartPayload, PayloadPart};

/// Common imports
pub mod prelude {
    pub use crate::client::{ApiClient, RequestOptions, ResponseBody};
    pub use crate::config::ClientConfig;
    pub use crate::error::ClientError;
    pub use crate::images::{ImageApi, ImageUploader, UploadResponse, download_url};
    pub use crate::multipart::ImageFile;
}
