//! Extraction orchestrators
//!
//! [`VlmExtractor`] and [`OcrExtractor`] each drive one provider for one image.
//! [`Pipeline`] picks between them from configuration and stands in with a
//! skipped result when the selected provider has no credentials.

use crate::config::{ExtractorConfig, ProviderKind};
use crate::error::ExtractorError;
use crate::layout::{extract_fields, LayoutConfig};
use crate::normalize::{clean_location_text, normalize_time};
use crate::parser::parse_structured_reply;
use crate::prompt::PromptBuilder;
use skymark_domain::traits::{MetadataExtractor, TextRecognizer, VisionModel};
use skymark_domain::{ExtractionResult, StructuredReply};
use skymark_ocr::{BaiduOcrClient, BaiduTokenFetcher, OcrError, TokenCache};
use skymark_vlm::{image, QwenVlProvider, VlmError};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turn a decoded model reply into an extraction result
///
/// A non-blank time is normalized and a non-blank location is cleaned; blank
/// fields stay empty.
pub fn reply_to_result(reply: &StructuredReply) -> ExtractionResult {
    let time = if reply.has_time() {
        normalize_time(&reply.time)
    } else {
        String::new()
    };
    let location = if reply.has_location() {
        clean_location_text(&reply.location)
    } else {
        String::new()
    };
    ExtractionResult::new(time, location)
}

/// Extracts metadata with a vision-language model
pub struct VlmExtractor<V> {
    model: V,
    timeout: Duration,
}

impl<V> VlmExtractor<V>
where
    V: VisionModel<Error = VlmError> + Sync,
{
    /// Create a new VlmExtractor
    pub fn new(model: V, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Ask the model about one image and decode its reply, without normalizing
    pub async fn read_reply(&self, image_path: &Path) -> Result<StructuredReply, ExtractorError> {
        let data_url = image::read_data_url(image_path).await?;
        let request = PromptBuilder::new(data_url).build();

        debug!("Image data URL length: {} chars", request.image_data_url.len());

        let response = timeout(self.timeout, self.model.complete(&request))
            .await
            .map_err(|_| ExtractorError::Timeout(self.timeout.as_secs()))??;

        debug!("VLM response length: {} chars", response.len());

        parse_structured_reply(&response)
    }
}

impl<V> MetadataExtractor for VlmExtractor<V>
where
    V: VisionModel<Error = VlmError> + Sync,
{
    type Error = ExtractorError;

    async fn extract(&self, image_path: &Path) -> Result<ExtractionResult, ExtractorError> {
        let reply = self.read_reply(image_path).await?;
        let result = reply_to_result(&reply);

        info!(
            "VLM result - time: {}, location: {}, confidence: {:.2}, is_standard: {}",
            result.time(),
            result.location(),
            reply.confidence,
            result.is_standard()
        );

        Ok(result)
    }
}

/// Extracts metadata with OCR plus layout heuristics
pub struct OcrExtractor<R> {
    recognizer: R,
    layout: LayoutConfig,
    timeout: Duration,
}

impl<R> OcrExtractor<R>
where
    R: TextRecognizer<Error = OcrError> + Sync,
{
    /// Create a new OcrExtractor
    pub fn new(recognizer: R, layout: LayoutConfig, timeout: Duration) -> Self {
        Self {
            recognizer,
            layout,
            timeout,
        }
    }
}

impl<R> MetadataExtractor for OcrExtractor<R>
where
    R: TextRecognizer<Error = OcrError> + Sync,
{
    type Error = ExtractorError;

    async fn extract(&self, image_path: &Path) -> Result<ExtractionResult, ExtractorError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|source| ExtractorError::ImageRead {
                path: image_path.to_path_buf(),
                source,
            })?;

        debug!("Read {} image bytes from {}", bytes.len(), image_path.display());

        let fragments = timeout(self.timeout, self.recognizer.recognize(&bytes))
            .await
            .map_err(|_| ExtractorError::Timeout(self.timeout.as_secs()))??;

        let result = extract_fields(&fragments, &self.layout);

        info!(
            "OCR result - time: {}, location: {}, fragments: {}, is_standard: {}",
            result.time(),
            result.location(),
            fragments.len(),
            result.is_standard()
        );

        Ok(result)
    }
}

/// Configured extraction entry point
pub enum Pipeline {
    /// Vision model pipeline
    Vlm(VlmExtractor<QwenVlProvider>),
    /// OCR pipeline with a cached access token
    Ocr(OcrExtractor<BaiduOcrClient<TokenCache<BaiduTokenFetcher>>>),
    /// Selected provider has no credentials; every image yields a skipped result
    Disabled {
        /// Provider that was selected
        provider: ProviderKind,
    },
}

impl Pipeline {
    /// Build the pipeline for the selected provider
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation or an HTTP client
    /// cannot be built. Missing credentials are not an error.
    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        match config.provider {
            ProviderKind::Vlm if config.vlm.is_configured() => {
                let settings = &config.vlm;
                let api_key = settings.api_key.clone().unwrap_or_default();
                let mut provider = QwenVlProvider::new(
                    api_key,
                    settings.base_url.clone(),
                    settings.model.clone(),
                    settings.timeout(),
                )?;
                if settings.enable_thinking {
                    provider = provider.with_thinking(settings.thinking_budget);
                }
                Ok(Pipeline::Vlm(VlmExtractor::new(provider, settings.timeout())))
            }
            ProviderKind::Ocr if config.ocr.is_configured() => {
                let settings = &config.ocr;
                let client = BaiduOcrClient::with_credentials(
                    settings.base_url.clone(),
                    settings.api_key.clone().unwrap_or_default(),
                    settings.secret_key.clone().unwrap_or_default(),
                    settings.timeout(),
                    settings.refresh_margin(),
                )?;
                Ok(Pipeline::Ocr(OcrExtractor::new(
                    client,
                    config.layout.clone(),
                    settings.timeout(),
                )))
            }
            provider => Ok(Pipeline::Disabled { provider }),
        }
    }

    /// Provider this pipeline was built for
    pub fn provider(&self) -> ProviderKind {
        match self {
            Pipeline::Vlm(_) => ProviderKind::Vlm,
            Pipeline::Ocr(_) => ProviderKind::Ocr,
            Pipeline::Disabled { provider } => *provider,
        }
    }

    /// Whether images are actually sent to a provider
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Pipeline::Disabled { .. })
    }

    /// Process one image
    ///
    /// Returns a skipped result (both fields empty, not standard) when the
    /// provider is not configured.
    pub async fn process_image(&self, image_path: &Path) -> Result<ExtractionResult, ExtractorError> {
        match self {
            Pipeline::Vlm(extractor) => extractor.extract(image_path).await,
            Pipeline::Ocr(extractor) => extractor.extract(image_path).await,
            Pipeline::Disabled { provider } => {
                warn!(
                    "{} provider not configured, skipping extraction for {}",
                    provider,
                    image_path.display()
                );
                Ok(ExtractionResult::skipped())
            }
        }
    }
}

impl MetadataExtractor for Pipeline {
    type Error = ExtractorError;

    async fn extract(&self, image_path: &Path) -> Result<ExtractionResult, ExtractorError> {
        self.process_image(image_path).await
    }
}
