//! Parse model completions into structured replies

use crate::error::ExtractorError;
use crate::types::ReplyPayload;
use skymark_domain::StructuredReply;

const FENCE: &str = "```";
const RAW_EXCERPT_CHARS: usize = 200;

/// Parse a model completion into a structured reply
///
/// The completion is sanitized with [`sanitize_json_block`] and decoded.
/// A completion with no JSON candidate, or one that does not decode into the
/// expected object, is an error that carries an excerpt of the raw text.
pub fn parse_structured_reply(response: &str) -> Result<StructuredReply, ExtractorError> {
    let json_str = sanitize_json_block(response);
    if json_str.is_empty() {
        return Err(invalid_reply("sanitize", "No JSON block found in reply", response));
    }

    let payload: ReplyPayload = serde_json::from_str(json_str)
        .map_err(|e| invalid_reply("decode", format!("JSON parse error: {}", e), response))?;

    Ok(payload.into_reply())
}

/// Cut the JSON candidate out of a completion
///
/// LLMs sometimes wrap JSON in markdown code blocks or add commentary around
/// it. A leading fence (bare or `json`-tagged) is stripped along with the last
/// closing fence, then the span from the first `{` to the last `}` is taken.
/// Without such a span, the trimmed text is returned as-is.
pub fn sanitize_json_block(response: &str) -> &str {
    let mut trimmed = response.trim();

    if trimmed.starts_with(FENCE) {
        trimmed = trimmed.strip_prefix("```json").unwrap_or(trimmed);
        trimmed = trimmed.strip_prefix(FENCE).unwrap_or(trimmed);
        trimmed = trimmed.trim();
        if let Some(idx) = trimmed.rfind(FENCE) {
            trimmed = &trimmed[..idx];
        }
        trimmed = trimmed.trim();
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn invalid_reply(stage: &'static str, message: impl Into<String>, raw: &str) -> ExtractorError {
    let mut excerpt: String = raw.chars().take(RAW_EXCERPT_CHARS).collect();
    if raw.chars().count() > RAW_EXCERPT_CHARS {
        excerpt.push_str("...");
    }
    ExtractorError::InvalidReply {
        stage,
        message: message.into(),
        raw: excerpt,
    }
}
