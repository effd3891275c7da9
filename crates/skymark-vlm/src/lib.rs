//! Skymark VLM Provider Layer
//!
//! Vision-language model implementations of the `VisionModel` trait from
//! `skymark-domain`.
//!
//! # Providers
//!
//! - `MockVisionModel`: Deterministic mock for testing
//! - `QwenVlProvider`: OpenAI-compatible chat-completions API (DashScope Qwen-VL)
//!
//! # Examples
//!
//! ```
//! use skymark_vlm::MockVisionModel;
//! use skymark_domain::{traits::VisionModel, VisionRequest};
//!
//! let model = MockVisionModel::new(r#"{"time":"2024-01-15 14:30","location":"北京市"}"#);
//! let request = VisionRequest {
//!     system_instruction: "sys".to_string(),
//!     user_instruction: "read the watermark".to_string(),
//!     image_data_url: "data:image/jpeg;base64,AAAA".to_string(),
//! };
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let reply = rt.block_on(model.complete(&request)).unwrap();
//! assert!(reply.contains("北京市"));
//! ```

#![warn(missing_docs)]

pub mod image;
pub mod qwen;

use skymark_domain::traits::VisionModel;
use skymark_domain::VisionRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use image::encode_data_url;
pub use qwen::QwenVlProvider;

/// Errors that can occur during vision model calls
#[derive(Error, Debug)]
pub enum VlmError {
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

    /// Error object reported by the provider inside the response body
    #[error("Provider error: {0}")]
    Api(String),

    /// Response body is not the expected chat-completions shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Response carried no choices
    #[error("Model returned no choices")]
    EmptyChoices,

    /// First choice carried no text
    #[error("Model returned empty content")]
    EmptyContent,

    /// Image could not be read for embedding
    #[error("Failed to read image: {0}")]
    Image(String),
}

/// Mock vision model for deterministic testing
///
/// Returns queued replies first, then the default reply. No network calls.
///
/// # Examples
///
/// ```
/// use skymark_vlm::MockVisionModel;
///
/// let mut model = MockVisionModel::new("fallback");
/// model.push_reply("first");
/// model.push_error("second");
/// assert_eq!(model.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockVisionModel {
    default_reply: String,
    queued: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<VisionRequest>>>,
}

impl MockVisionModel {
    /// Create a mock that answers every request with `reply`
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            default_reply: reply.into(),
            queued: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a reply for the next unanswered request
    pub fn push_reply(&mut self, reply: impl Into<String>) {
        self.queued.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue a provider error for the next unanswered request
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.queued.lock().unwrap().push_back(Err(message.into()));
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Most recent request, if any
    pub fn last_request(&self) -> Option<VisionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockVisionModel {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl VisionModel for MockVisionModel {
    type Error = VlmError;

    async fn complete(&self, request: &VisionRequest) -> Result<String, VlmError> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self.queued.lock().unwrap().pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(VlmError::Api(message)),
            None => Ok(self.default_reply.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> VisionRequest {
        VisionRequest {
            system_instruction: "system".to_string(),
            user_instruction: "user".to_string(),
            image_data_url: "data:image/png;base64,AA==".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_default_reply() {
        let model = MockVisionModel::new("hello");
        assert_eq!(model.complete(&request()).await.unwrap(), "hello");
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_queued_replies_then_default() {
        let mut model = MockVisionModel::new("default");
        model.push_reply("one");
        model.push_error("quota exceeded");

        assert_eq!(model.complete(&request()).await.unwrap(), "one");
        let err = model.complete(&request()).await.unwrap_err();
        assert!(matches!(err, VlmError::Api(ref m) if m == "quota exceeded"));
        assert_eq!(model.complete(&request()).await.unwrap(), "default");
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_records_request() {
        let model = MockVisionModel::default();
        model.complete(&request()).await.unwrap();
        let seen = model.last_request().unwrap();
        assert_eq!(seen.user_instruction, "user");
    }

    #[test]
    fn test_mock_clone_shares_state() {
        let model1 = MockVisionModel::new("x");
        let model2 = model1.clone();
        model1.requests.lock().unwrap().push(request());
        assert_eq!(model2.call_count(), 1);
    }
}
