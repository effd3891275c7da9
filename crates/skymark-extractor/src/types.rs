//! Wire shape of the model's JSON answer

use serde::{Deserialize, Serialize};
use skymark_domain::StructuredReply;

/// JSON object the model is instructed to return
///
/// Every field is optional on the wire; models regularly emit `null` or
/// drop fields they could not determine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ReplyPayload {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ReplyPayload {
    /// Convert to the domain reply, clamping confidence into [0.0, 1.0]
    pub fn into_reply(self) -> StructuredReply {
        StructuredReply {
            time: self.time.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            confidence: self.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        }
    }
}
