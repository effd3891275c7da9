//! Vision model request and structured reply

/// Single-turn request to a vision-capable chat model
///
/// There is no conversation state: one system instruction, one user
/// instruction and one embedded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionRequest {
    /// Role-setting instruction (extraction goal, strict JSON output)
    pub system_instruction: String,
    /// Task instruction sent alongside the image
    pub user_instruction: String,
    /// Image encoded as a `data:<mime>;base64,<payload>` URL
    pub image_data_url: String,
}

/// The model's claimed answer, decoded from its free-text completion
///
/// Values are raw: the time has not been canonicalized and the location
/// has not been cleaned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredReply {
    /// Timestamp as the model wrote it
    pub time: String,
    /// Location as the model wrote it
    pub location: String,
    /// Self-reported confidence in [0.0, 1.0]
    pub confidence: f64,
    /// Optional reasoning notes
    pub notes: Option<String>,
}

impl StructuredReply {
    /// True when the model reported a non-blank time
    pub fn has_time(&self) -> bool {
        !self.time.trim().is_empty()
    }

    /// True when the model reported a non-blank location
    pub fn has_location(&self) -> bool {
        !self.location.trim().is_empty()
    }
}
