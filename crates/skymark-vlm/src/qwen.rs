//! Qwen-VL Provider Implementation
//!
//! Talks to an OpenAI-compatible chat-completions endpoint (DashScope's
//! compatible mode by default) with one system turn and one image-bearing
//! user turn.
//!
//! # Features
//!
//! - Bearer-token authentication
//! - Optional extended reasoning (`enable_thinking` / `thinking_budget`)
//! - Fixed overall request timeout, no retries
//!
//! # Examples
//!
//! ```no_run
//! use skymark_vlm::QwenVlProvider;
//! use std::time::Duration;
//!
//! let provider = QwenVlProvider::new(
//!     "sk-...",
//!     skymark_vlm::qwen::DEFAULT_ENDPOINT,
//!     skymark_vlm::qwen::DEFAULT_MODEL,
//!     Duration::from_secs(60),
//! )
//! .unwrap()
//! .with_thinking(Some(2048));
//! ```

use crate::VlmError;
use serde::{Deserialize, Serialize};
use skymark_domain::traits::VisionModel;
use skymark_domain::VisionRequest;
use std::time::Duration;
use tracing::debug;

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";

/// Default vision model
pub const DEFAULT_MODEL: &str = "qwen3-vl-plus";

/// Default timeout for one request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Qwen-VL chat-completions provider
pub struct QwenVlProvider {
    endpoint: String,
    model: String,
    api_key: String,
    thinking: Option<ThinkingOptions>,
    client: reqwest::Client,
}

/// Extended reasoning options passed through to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkingOptions {
    /// Upper bound on reasoning tokens; provider default when `None`
    pub budget: Option<u32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_thinking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_budget: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl QwenVlProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `api_key`: bearer token for the endpoint
    /// - `endpoint`: full chat-completions URL
    /// - `model`: model identifier (e.g., "qwen3-vl-plus")
    /// - `timeout`: overall timeout for one request
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            thinking: None,
            client,
        })
    }

    /// Enable extended reasoning with an optional token budget
    pub fn with_thinking(mut self, budget: Option<u32>) -> Self {
        self.thinking = Some(ThinkingOptions {
            budget: budget.filter(|b| *b > 0),
        });
        self
    }

    /// Model identifier sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, request: &'a VisionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: vec![ContentPart::Text {
                        text: &request.system_instruction,
                    }],
                },
                ChatMessage {
                    role: "user",
                    content: vec![
                        ContentPart::Text {
                            text: &request.user_instruction,
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: &request.image_data_url,
                            },
                        },
                    ],
                },
            ],
            enable_thinking: self.thinking.map(|_| true),
            thinking_budget: self.thinking.and_then(|t| t.budget),
        }
    }

    /// Send one request and return the first completion's text
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint is unreachable or the request times out
    /// - The endpoint answers with a non-success status
    /// - The body carries a provider error object
    /// - The body has no choices, or the first choice has no text
    pub async fn chat(&self, request: &VisionRequest) -> Result<String, VlmError> {
        let body = self.build_request(request);
        debug!(
            "Sending VLM request to {} (model {}, image payload {} bytes)",
            self.endpoint,
            self.model,
            request.image_data_url.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VlmError::Communication(format!("Request timed out: {}", e))
                } else {
                    VlmError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| VlmError::Communication(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(VlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_chat_response(&text)
    }
}

/// Pull the first completion's text out of a chat-completions body
fn parse_chat_response(body: &str) -> Result<String, VlmError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| VlmError::InvalidResponse(format!("Failed to decode response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(VlmError::Api(match error.code {
            Some(code) => format!("{} (code {})", error.message, code),
            None => error.message,
        }));
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(VlmError::EmptyChoices)?;

    let content = choice.message.content.unwrap_or_default();
    let content = content.trim();
    if content.is_empty() {
        return Err(VlmError::EmptyContent);
    }

    Ok(content.to_string())
}

impl VisionModel for QwenVlProvider {
    type Error = VlmError;

    async fn complete(&self, request: &VisionRequest) -> Result<String, VlmError> {
        self.chat(request).await
    }
}
