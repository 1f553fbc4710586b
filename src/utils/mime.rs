//! MIME Type Detection Utilities
//!
//! Magic number detection via `infer`, falling back to the file extension via
//! `mime_guess`.

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| k.mime_type().to_string())
}

/// Guess MIME from a file name's extension
pub fn guess_mime_from_name(name: &str) -> Option<String> {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Combined guess: prefer bytes, fall back to extension, otherwise octet-stream
pub fn guess_mime(bytes: &[u8], name: &str) -> String {
    guess_mime_from_bytes(bytes)
        .or_else(|| guess_mime_from_name(name))
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}
