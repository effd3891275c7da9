//! Spatial heuristics for OCR output
//!
//! OCR only finds text. Which fragment is the timestamp and which is the
//! station location is decided here, assuming the usual watermark layout:
//! the timestamp near the top of the image and the location near the bottom.

use crate::normalize::{clean_location_text, normalize_time};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use skymark_domain::{ExtractionResult, TextFragment};
use tracing::debug;

/// Default band divisor: each band covers a third of the vertical range
pub const DEFAULT_BAND_DIVISOR: u32 = 3;

/// Default place-name suffixes that mark a fragment as a location
pub const DEFAULT_LOCATION_KEYWORDS: [&str; 10] =
    ["省", "市", "县", "区", "站", "路", "街", "镇", "乡", "村"];

// Ordered by priority. Separators may be `-`, `/` or CJK glyphs.
static OCR_TIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Full precision
        r"[0-9]{4}[-/年][0-9]{1,2}[-/月][0-9]{1,2}日?\s*[0-9]{1,2}:[0-9]{2}:[0-9]{2}",
        // No seconds
        r"[0-9]{4}[-/年][0-9]{1,2}[-/月][0-9]{1,2}日?\s*[0-9]{1,2}:[0-9]{2}",
        // Compact, with seconds
        r"[0-9]{8}\s?[0-9]{6}",
        // Compact, minutes only
        r"[0-9]{8}\s?[0-9]{4}",
        // Loose date only
        r"[0-9]{4}[-/年][0-9]{1,2}[-/月][0-9]{1,2}日?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Tunable layout heuristics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fraction of the vertical range (1/divisor) covered by each band
    pub band_divisor: u32,

    /// Substrings that mark a fragment as a location
    pub location_keywords: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            band_divisor: DEFAULT_BAND_DIVISOR,
            location_keywords: DEFAULT_LOCATION_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl LayoutConfig {
    /// Validate the layout settings
    pub fn validate(&self) -> Result<(), String> {
        if self.band_divisor == 0 {
            return Err("layout.band_divisor must be greater than 0".to_string());
        }
        if self.location_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err("layout.location_keywords must contain at least one keyword".to_string());
        }
        Ok(())
    }
}

/// Top and bottom bands of one image's fragments
///
/// With `range = maxTop - minTop`, a fragment is in the top band when
/// `top <= minTop + range / divisor` and in the bottom band when
/// `top >= maxTop - range / divisor` (integer division). When every fragment
/// shares one `top`, both bands hold all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialBands<'a> {
    /// Fragments near the top edge, in provider order
    pub top: Vec<&'a TextFragment>,
    /// Fragments near the bottom edge, in provider order
    pub bottom: Vec<&'a TextFragment>,
}

impl<'a> SpatialBands<'a> {
    /// Partition `fragments` by their top coordinate
    ///
    /// A zero divisor is treated as 1.
    pub fn partition(fragments: &'a [TextFragment], divisor: u32) -> Self {
        let tops = fragments.iter().map(|f| i64::from(f.top()));
        let (Some(min_top), Some(max_top)) = (tops.clone().min(), tops.max()) else {
            return Self {
                top: Vec::new(),
                bottom: Vec::new(),
            };
        };

        let band = (max_top - min_top) / i64::from(divisor.max(1));
        let top_limit = min_top + band;
        let bottom_limit = max_top - band;

        let top = fragments
            .iter()
            .filter(|f| i64::from(f.top()) <= top_limit)
            .collect();
        let bottom = fragments
            .iter()
            .filter(|f| i64::from(f.top()) >= bottom_limit)
            .collect();

        Self { top, bottom }
    }
}

fn find_time<'a>(fragments: impl IntoIterator<Item = &'a TextFragment>) -> Option<String> {
    fragments.into_iter().find_map(|fragment| {
        OCR_TIME_PATTERNS
            .iter()
            .find_map(|pattern| pattern.find(&fragment.text))
            .map(|m| normalize_time(m.as_str()))
    })
}

fn find_location<'a>(
    fragments: impl IntoIterator<Item = &'a TextFragment>,
    keywords: &[String],
) -> Option<String> {
    fragments
        .into_iter()
        .find(|fragment| {
            keywords
                .iter()
                .filter(|k| !k.is_empty())
                .any(|k| fragment.text.contains(k.as_str()))
        })
        .map(|fragment| clean_location_text(&fragment.text))
}

/// Pick the timestamp: top band first, then the whole image
///
/// Within a fragment the patterns are tried in priority order; the first
/// fragment with any match wins. The match is normalized.
pub fn extract_time(fragments: &[TextFragment], bands: &SpatialBands<'_>) -> Option<String> {
    find_time(bands.top.iter().copied()).or_else(|| find_time(fragments))
}

/// Pick the location: bottom band first, then the whole image
pub fn extract_location(
    fragments: &[TextFragment],
    bands: &SpatialBands<'_>,
    keywords: &[String],
) -> Option<String> {
    find_location(bands.bottom.iter().copied(), keywords)
        .or_else(|| find_location(fragments, keywords))
}

/// Turn one image's OCR fragments into an extraction result
pub fn extract_fields(fragments: &[TextFragment], layout: &LayoutConfig) -> ExtractionResult {
    let bands = SpatialBands::partition(fragments, layout.band_divisor);
    debug!(
        "OCR layout: {} fragments, {} in top band, {} in bottom band",
        fragments.len(),
        bands.top.len(),
        bands.bottom.len()
    );

    let time = extract_time(fragments, &bands).unwrap_or_default();
    let location = extract_location(fragments, &bands, &layout.location_keywords).unwrap_or_default();
    ExtractionResult::new(time, location)
}
