//! Extraction result value object

/// Metadata extracted from one watermarked photograph
///
/// `is_standard` is derived from the two fields and cannot be set directly:
/// a photo is "standard" only when both a timestamp and a location were found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionResult {
    time: String,
    location: String,
    is_standard: bool,
}

impl ExtractionResult {
    /// Create a result from already-normalized fields
    pub fn new(time: impl Into<String>, location: impl Into<String>) -> Self {
        let time = time.into();
        let location = location.into();
        let is_standard = !time.is_empty() && !location.is_empty();
        Self {
            time,
            location,
            is_standard,
        }
    }

    /// Result used when extraction is not configured: both fields empty
    pub fn skipped() -> Self {
        Self::default()
    }

    /// Canonical `YYYY-MM-DD HH:MM:SS` timestamp, or the unclassified original text
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Cleaned free-text station location
    pub fn location(&self) -> &str {
        &self.location
    }

    /// True when both time and location are non-empty
    pub fn is_standard(&self) -> bool {
        self.is_standard
    }
}
