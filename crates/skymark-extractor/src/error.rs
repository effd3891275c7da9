//! Error types for the Extractor

use skymark_ocr::OcrError;
use skymark_vlm::VlmError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while processing one image
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Vision model call failed
    #[error("VLM error: {0}")]
    Vlm(#[from] VlmError),

    /// OCR call failed
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image file could not be read
    #[error("Failed to read image {}: {source}", path.display())]
    ImageRead {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Model reply could not be turned into a structured answer
    #[error("Invalid model reply at {stage} stage: {message} (raw: {raw})")]
    InvalidReply {
        /// Parsing stage that failed
        stage: &'static str,
        /// What went wrong
        message: String,
        /// Excerpt of the offending reply text
        raw: String,
    },

    /// Provider call exceeded the configured timeout
    #[error("Extraction timeout after {0}s")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
