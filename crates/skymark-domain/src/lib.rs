//! Skymark Domain Layer
//!
//! This crate contains the value types and trait seams shared by every other
//! Skymark crate. It has ZERO external dependencies: providers, parsers and the
//! orchestrator all live in other crates and depend on this one.
//!
//! ## Key Concepts
//!
//! - **ExtractionResult**: the pipeline output, a timestamp and a location plus the
//!   `is_standard` flag (both fields present)
//! - **StructuredReply**: what a vision model claims it read, before normalization
//! - **TextFragment**: one OCR-detected text region with its pixel bounding box
//! - **VisionRequest**: a single-turn, image-bearing request to a vision model
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions (see [`traits`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fragment;
pub mod reply;
pub mod result;
pub mod traits;

// Re-exports for convenience
pub use fragment::{BoundingBox, TextFragment};
pub use reply::{StructuredReply, VisionRequest};
pub use result::ExtractionResult;
