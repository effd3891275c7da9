//! OCR text fragments (per-region recognition output)

/// Pixel-space rectangle reported by an OCR provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    /// Distance from the left edge of the image
    pub left: i32,
    /// Distance from the top edge of the image
    pub top: i32,
    /// Region width
    pub width: i32,
    /// Region height
    pub height: i32,
}

impl BoundingBox {
    /// Create a bounding box
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// One OCR-detected text region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    /// Recognized text
    pub text: String,
    /// Where the text sits in the image
    pub bounding_box: BoundingBox,
}

impl TextFragment {
    /// Create a positioned fragment
    pub fn new(text: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bounding_box,
        }
    }

    /// Create a fragment whose provider reported no position
    ///
    /// All such fragments share `top == 0`, so they collapse into a single row.
    pub fn unpositioned(text: impl Into<String>) -> Self {
        Self::new(text, BoundingBox::default())
    }

    /// Top coordinate of the fragment
    pub fn top(&self) -> i32 {
        self.bounding_box.top
    }
}
