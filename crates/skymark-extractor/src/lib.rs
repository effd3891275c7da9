//! Skymark Extractor
//!
//! Extracts the capture timestamp and station location from the watermark of a
//! weather-monitoring photograph.
//!
//! # Overview
//!
//! Two front-ends feed one normalization core:
//!
//! - **VLM**: a vision-language model reads the watermark and answers with a
//!   JSON object; the reply is sanitized (code fences, surrounding prose) and decoded
//! - **OCR**: a cloud OCR service returns positioned text fragments; layout
//!   heuristics pick the timestamp (top band) and the location (bottom band)
//!
//! Either way the time goes through [`normalize::normalize_time`] and the
//! location through [`normalize::clean_location_text`].
//!
//! # Architecture
//!
//! ```text
//! image path → Pipeline → VlmExtractor | OcrExtractor → normalizers → ExtractionResult
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use skymark_extractor::{ExtractorConfig, Pipeline};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig::from_env();
//! let pipeline = Pipeline::from_config(&config)?;
//!
//! let result = pipeline.process_image(Path::new("uploads/station-42.jpg")).await?;
//! println!("time={} location={} standard={}", result.time(), result.location(), result.is_standard());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
pub mod layout;
pub mod normalize;
mod parser;
mod prompt;
mod types;


pub use config::{env_keys, ConfigStatus, ExtractorConfig, OcrSettings, ProviderKind, VlmSettings};
pub use error::ExtractorError;
pub use extractor::{reply_to_result, OcrExtractor, Pipeline, VlmExtractor};
pub use layout::{LayoutConfig, SpatialBands};
pub use parser::{parse_structured_reply, sanitize_json_block};
pub use prompt::{PromptBuilder, SYSTEM_INSTRUCTION, USER_INSTRUCTION};
