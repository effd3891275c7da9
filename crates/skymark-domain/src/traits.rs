//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates. All of them are async
//! and return `Send` futures so they can be driven from a multi-threaded runtime.

use crate::{ExtractionResult, TextFragment, VisionRequest};
use std::future::Future;
use std::path::Path;

/// Trait for vision-language model providers
///
/// Implemented by the infrastructure layer (skymark-vlm)
pub trait VisionModel {
    /// Error type for model calls
    type Error;

    /// Send one request and return the raw text of the first completion
    fn complete(
        &self,
        request: &VisionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Trait for OCR providers
///
/// Implemented by the infrastructure layer (skymark-ocr)
pub trait TextRecognizer {
    /// Error type for recognition calls
    type Error;

    /// Recognize every text region in the image, in provider order
    fn recognize(
        &self,
        image: &[u8],
    ) -> impl Future<Output = Result<Vec<TextFragment>, Self::Error>> + Send;
}

/// Trait for access-token holders
///
/// The holder owns expiry state; callers only ever ask for a usable token.
/// Implemented by the infrastructure layer (skymark-ocr)
pub trait TokenSource {
    /// Error type for token acquisition
    type Error;

    /// Return a token that is valid for at least the holder's safety margin
    fn valid_token(&self) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Forget the current token after the service has rejected it
    fn invalidate(&self) -> impl Future<Output = ()> + Send;
}

/// Trait for extracting watermark metadata from an image on disk
///
/// Implemented by the application layer (skymark-extractor)
pub trait MetadataExtractor {
    /// Error type for extraction
    type Error;

    /// Process one image and return its metadata
    fn extract(
        &self,
        image_path: &Path,
    ) -> impl Future<Output = Result<ExtractionResult, Self::Error>> + Send;
}
