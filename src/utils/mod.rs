//! Utility modules for imgcrop-client

pub mod mime;
pub mod url;

pub use url::*;
