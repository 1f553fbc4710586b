//! Image processing API
//!
//! Upload a batch of images for border cropping, and build download links for
//! the results.

use crate::client::{ApiClient, RequestOptions, ResponseBody};
use crate::defaults::endpoints;
use crate::error::ClientError;
use crate::multipart::{ImageFile, MultipartPayload};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Build the download link for a stored file: `"/download/" + filename`.
///
/// The filename is used verbatim; it is neither validated nor escaped.
pub fn download_url(filename: &str) -> String {
    format!("{}{filename}", endpoints::DOWNLOAD_PREFIX)
}

/// One processed image as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedImage {
    /// Stored name of the uploaded original (timestamp and id prefixed)
    pub original_name: String,
    /// Name the file was uploaded with
    pub display_name: String,
    /// Stored name of the cropped image
    pub processed_name: String,
    pub download_url: String,
    pub original_url: String,
}

/// Successful upload payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<ProcessedImage>,
}

/// Image operations UI layers depend on
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload files under the `files` field and return the raw response body.
    async fn upload_images(&self, files: Vec<ImageFile>) -> Result<ResponseBody, ClientError>;

    /// Download link for a stored file.
    fn download_url(&self, filename: &str) -> String {
        download_url(filename)
    }
}

/// [`ImageUploader`] backed by an [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ImageApi {
    client: ApiClient,
}

impl ImageApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Upload with per-call overrides, e.g. a longer timeout for large batches.
    pub async fn upload_images_with_options(
        &self,
        files: Vec<ImageFile>,
        options: RequestOptions,
    ) -> Result<ResponseBody, ClientError> {
        let payload = MultipartPayload::from_files(files);
        tracing::debug!(files = payload.len(), "uploading images");
        self.client
            .post_multipart(endpoints::UPLOAD, payload, Some(options))
            .await
    }

    /// Upload and decode the service's result listing.
    pub async fn upload_images_typed(
        &self,
        files: Vec<ImageFile>,
    ) -> Result<UploadResponse, ClientError> {
        self.upload_images(files).await?.json()
    }
}

#[async_trait]
impl ImageUploader for ImageApi {
    async fn upload_images(&self, files: Vec<ImageFile>) -> Result<ResponseBody, ClientError> {
        self.upload_images_with_options(files, RequestOptions::default())
            .await
    }
}
