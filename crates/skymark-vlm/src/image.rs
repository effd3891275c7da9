//! Image embedding as base64 data URLs

use crate::VlmError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::Path;

/// MIME type used when the file extension is unknown
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Build a `data:` URL from image bytes, deriving the MIME type from `path`'s extension
pub fn encode_data_url(path: &Path, bytes: &[u8]) -> String {
    let mime = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MIME);
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Read an image from disk and encode it as a `data:` URL
pub async fn read_data_url(path: &Path) -> Result<String, VlmError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            VlmError::Image(format!("{} not found", path.display()))
        } else {
            VlmError::Image(format!("{}: {}", path.display(), e))
        }
    })?;
    Ok(encode_data_url(path, &bytes))
}
