//! Configuration for the Extractor
//!
//! Loaded from a TOML file or from the process environment (after reading a
//! `.env` file if present). Blank values count as unset. A configuration with
//! no credentials is valid: it yields a disabled pipeline, not an error.

use crate::layout::LayoutConfig;
use serde::{Deserialize, Serialize};
use skymark_ocr::{baidu, token};
use skymark_vlm::qwen;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Which provider extracts the watermark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Vision-language model
    #[default]
    Vlm,
    /// Cloud OCR with layout heuristics
    Ocr,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Vlm => write!(f, "vlm"),
            ProviderKind::Ocr => write!(f, "ocr"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vlm" => Ok(ProviderKind::Vlm),
            "ocr" => Ok(ProviderKind::Ocr),
            other => Err(format!("Unknown provider '{}' (expected 'vlm' or 'ocr')", other)),
        }
    }
}

/// Vision model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VlmSettings {
    /// Bearer token; extraction is skipped when unset
    pub api_key: Option<String>,

    /// Full chat-completions URL
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Ask the model for extended reasoning
    pub enable_thinking: bool,

    /// Reasoning token budget; provider default when unset
    pub thinking_budget: Option<u32>,

    /// Overall timeout for one call (seconds)
    pub timeout_secs: u64,
}

impl Default for VlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: qwen::DEFAULT_ENDPOINT.to_string(),
            model: qwen::DEFAULT_MODEL.to_string(),
            enable_thinking: false,
            thinking_budget: None,
            timeout_secs: qwen::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl VlmSettings {
    /// True when an API key is present
    pub fn is_configured(&self) -> bool {
        is_present(&self.api_key)
    }

    /// Get the call timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// OCR settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// API key (client id); extraction is skipped when unset
    pub api_key: Option<String>,

    /// Secret key (client secret); extraction is skipped when unset
    pub secret_key: Option<String>,

    /// API host
    pub base_url: String,

    /// Overall timeout for one call (seconds)
    pub timeout_secs: u64,

    /// Refresh the access token this long before it expires (seconds)
    pub token_refresh_margin_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            secret_key: None,
            base_url: baidu::DEFAULT_BASE_URL.to_string(),
            timeout_secs: baidu::DEFAULT_TIMEOUT_SECS,
            token_refresh_margin_secs: token::DEFAULT_REFRESH_MARGIN_SECS,
        }
    }
}

impl OcrSettings {
    /// True when both keys are present
    pub fn is_configured(&self) -> bool {
        is_present(&self.api_key) && is_present(&self.secret_key)
    }

    /// Get the call timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the token refresh margin as a Duration
    pub fn refresh_margin(&self) -> Duration {
        Duration::from_secs(self.token_refresh_margin_secs)
    }
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Selected provider
    pub provider: ProviderKind,

    /// Vision model settings
    pub vlm: VlmSettings,

    /// OCR settings
    pub ocr: OcrSettings,

    /// OCR layout heuristics
    pub layout: LayoutConfig,
}

/// Per-provider configuration summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigStatus {
    /// Selected provider
    pub provider: ProviderKind,
    /// Whether the vision model has credentials
    pub vlm_configured: bool,
    /// Whether OCR has credentials
    pub ocr_configured: bool,
    /// Model identifier (vision model)
    pub vlm_model: String,
    /// API host (OCR)
    pub ocr_base_url: String,
}

impl ConfigStatus {
    /// Whether the selected provider will run
    pub fn selected_configured(&self) -> bool {
        match self.provider {
            ProviderKind::Vlm => self.vlm_configured,
            ProviderKind::Ocr => self.ocr_configured,
        }
    }
}

/// Environment keys read by [`ExtractorConfig::from_env`]
pub mod env_keys {
    /// `vlm` or `ocr`
    pub const PROVIDER: &str = "WATERMARK_PROVIDER";
    /// Vision model bearer token
    pub const VLM_API_KEY: &str = "QWEN_VLM_API_KEY";
    /// Vision model chat-completions URL
    pub const VLM_BASE_URL: &str = "QWEN_VLM_BASE_URL";
    /// Vision model identifier
    pub const VLM_MODEL: &str = "QWEN_VLM_MODEL";
    /// `true` (any case) enables extended reasoning
    pub const VLM_ENABLE_THINKING: &str = "QWEN_VLM_ENABLE_THINKING";
    /// Integer reasoning budget
    pub const VLM_THINKING_BUDGET: &str = "QWEN_VLM_THINKING_BUDGET";
    /// OCR API key
    pub const OCR_API_KEY: &str = "BAIDU_OCR_API_KEY";
    /// OCR secret key
    pub const OCR_SECRET_KEY: &str = "BAIDU_OCR_SECRET_KEY";
    /// OCR API host
    pub const OCR_BASE_URL: &str = "BAIDU_OCR_BASE_URL";
}

impl ExtractorConfig {
    /// Vision model preset with the given API key
    pub fn vlm(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::Vlm,
            vlm: VlmSettings {
                api_key: Some(api_key.into()),
                ..VlmSettings::default()
            },
            ..Self::default()
        }
    }

    /// OCR preset with the given key pair
    pub fn ocr(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::Ocr,
            ocr: OcrSettings {
                api_key: Some(api_key.into()),
                secret_key: Some(secret_key.into()),
                ..OcrSettings::default()
            },
            ..Self::default()
        }
    }

    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory (or a parent) is read first;
    /// variables already set in the environment take precedence over it.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Blank values count as unset. Unparseable values log a warning and fall
    /// back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(raw) = get(env_keys::PROVIDER) {
            match raw.parse() {
                Ok(provider) => config.provider = provider,
                Err(e) => warn!("Ignoring {}: {}", env_keys::PROVIDER, e),
            }
        }

        config.vlm.api_key = get(env_keys::VLM_API_KEY);
        if let Some(url) = get(env_keys::VLM_BASE_URL) {
            config.vlm.base_url = url;
        }
        if let Some(model) = get(env_keys::VLM_MODEL) {
            config.vlm.model = model;
        }
        config.vlm.enable_thinking = get(env_keys::VLM_ENABLE_THINKING)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        if let Some(raw) = get(env_keys::VLM_THINKING_BUDGET) {
            match raw.parse::<u32>() {
                Ok(budget) => config.vlm.thinking_budget = Some(budget),
                Err(e) => warn!(
                    "Invalid {} value {:?}: {}, using provider default",
                    env_keys::VLM_THINKING_BUDGET,
                    raw,
                    e
                ),
            }
        }

        config.ocr.api_key = get(env_keys::OCR_API_KEY);
        config.ocr.secret_key = get(env_keys::OCR_SECRET_KEY);
        if let Some(url) = get(env_keys::OCR_BASE_URL) {
            config.ocr.base_url = url;
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.vlm.timeout_secs == 0 {
            return Err("vlm.timeout_secs must be greater than 0".to_string());
        }
        if self.ocr.timeout_secs == 0 {
            return Err("ocr.timeout_secs must be greater than 0".to_string());
        }
        if self.vlm.base_url.trim().is_empty() {
            return Err("vlm.base_url must not be empty".to_string());
        }
        if self.vlm.model.trim().is_empty() {
            return Err("vlm.model must not be empty".to_string());
        }
        if self.ocr.base_url.trim().is_empty() {
            return Err("ocr.base_url must not be empty".to_string());
        }
        self.layout.validate()
    }

    /// Summarize which providers are usable
    pub fn status(&self) -> ConfigStatus {
        ConfigStatus {
            provider: self.provider,
            vlm_configured: self.vlm.is_configured(),
            ocr_configured: self.ocr.is_configured(),
            vlm_model: self.vlm.model.clone(),
            ocr_base_url: self.ocr.base_url.clone(),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml(&contents)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
