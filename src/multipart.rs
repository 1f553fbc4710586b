//! In-memory files and the multipart payload built from them.

use crate::defaults;
use crate::error::ClientError;
use crate::utils::mime::guess_mime;
use bytes::Bytes;
use std::path::Path;

/// A named binary blob supplied by the caller.
///
/// Contents are held in memory; cloning is cheap because the bytes are
/// reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    bytes: Bytes,
    mime_type: Option<String>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            mime_type: None,
        }
    }

    /// Use an explicit MIME type instead of guessing one.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk. The file name (without directories) becomes the
    /// part's file name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Explicit MIME type if set, otherwise guessed from content and name.
    pub fn mime_type(&self) -> String {
        self.mime_type
            .clone()
            .unwrap_or_else(|| guess_mime(&self.bytes, &self.name))
    }
}

/// One named entry of a multipart payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    pub field: String,
    pub file: ImageFile,
}

/// Ordered (field name, file) pairs, encoded as `multipart/form-data` on send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    parts: Vec<PayloadPart>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every file under the upload field name, in input order.
    pub fn from_files(files: impl IntoIterator<Item = ImageFile>) -> Self {
        let mut payload = Self::new();
        for file in files {
            payload.append(defaults::endpoints::UPLOAD_FIELD, file);
        }
        payload
    }

    pub fn append(&mut self, field: impl Into<String>, file: ImageFile) {
        self.parts.push(PayloadPart {
            field: field.into(),
            file,
        });
    }

    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Encode as a reqwest multipart form. The form owns its boundary-based
    /// `Content-Type` header.
    pub fn to_form(&self) -> Result<reqwest::multipart::Form, ClientError> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            let mime = part.file.mime_type();
            let file_part = reqwest::multipart::Part::bytes(part.file.bytes.to_vec())
                .file_name(part.file.name.clone())
                .mime_str(&mime)
                .map_err(|e| ClientError::Config(format!("invalid MIME type {mime:?}: {e}")))?;
            form = form.part(part.field.clone(), file_part);
        }
        Ok(form)
    }
}
