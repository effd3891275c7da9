//! Skymark OCR Provider Layer
//!
//! OCR implementations of the `TextRecognizer` trait from `skymark-domain`.
//! OCR providers only find text; deciding which fragment is the timestamp and
//! which is the location happens in `skymark-extractor`.
//!
//! # Providers
//!
//! - `MockRecognizer`: Deterministic mock for testing
//! - `BaiduOcrClient`: Baidu AIP general OCR with positions, authenticated through a
//!   cached access token (`TokenCache`)

#![warn(missing_docs)]

pub mod baidu;
pub mod token;

use skymark_domain::traits::TextRecognizer;
use skymark_domain::TextFragment;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub use baidu::{BaiduOcrClient, BaiduTokenFetcher};
pub use token::{CachedToken, IssuedToken, TokenCache, TokenFetcher};

/// Errors that can occur during OCR operations
#[derive(Error, Debug)]
pub enum OcrError {
    /// Network or transport failure (connect, timeout, body read)
    #[error("Communication error: {0}")]
    Communication(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code returned by the endpoint
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// Access token could not be obtained
    #[error("Token fetch failed: {0}")]
    Token(String),

    /// Error code reported by the provider inside the response body
    #[error("Provider error {code}: {message}")]
    Api {
        /// Provider error code
        code: i64,
        /// Provider error message
        message: String,
    },

    /// Response body is not the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Mock OCR provider for deterministic testing
///
/// Every call returns the same fragments (or the same error). No network calls.
///
/// # Examples
///
/// ```
/// use skymark_ocr::MockRecognizer;
/// use skymark_domain::TextFragment;
///
/// let recognizer = MockRecognizer::new(vec![TextFragment::unpositioned("北京市")]);
/// assert_eq!(recognizer.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    fragments: Vec<TextFragment>,
    failure: Option<(i64, String)>,
    call_count: Arc<AtomicUsize>,
}

impl MockRecognizer {
    /// Create a mock that always recognizes `fragments`
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        Self {
            fragments,
            failure: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock that always fails with a provider error
    pub fn failing(code: i64, message: impl Into<String>) -> Self {
        Self {
            fragments: Vec::new(),
            failure: Some((code, message.into())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of recognition calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl TextRecognizer for MockRecognizer {
    type Error = OcrError;

    async fn recognize(&self, _image: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some((code, message)) => Err(OcrError::Api {
                code: *code,
                message: message.clone(),
            }),
            None => Ok(self.fragments.clone()),
        }
    }
}
