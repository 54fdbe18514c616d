//! Parsing the JSON verdict embedded in a chat completion.

use reviewlens_core::SentimentLabel;
use serde::Deserialize;

/// A validated chat judgment of one review.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatAssessment {
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub reasoning: String,
    pub key_points: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatVerdict {
    Parsed(ChatAssessment),
    /// The completion held no usable verdict; the reason is for logging.
    Malformed(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    sentiment: String,
    confidence: f64,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    key_points: Option<Vec<String>>,
    #[serde(default)]
    pros: Option<Vec<String>>,
    #[serde(default)]
    cons: Option<Vec<String>>,
}

/// Locate the JSON object in a completion: a fenced block when present,
/// otherwise the span from the first `{` to the last `}`.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return Some(after_fence[..end].trim());
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            let block = after_fence[..end].trim();
            if block.starts_with('{') {
                return Some(block);
            }
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&trimmed[start..=end]),
        _ => None,
    }
}

pub fn parse_verdict(text: &str) -> ChatVerdict {
    let Some(block) = extract_json_block(text) else {
        return ChatVerdict::Malformed("no JSON object in completion".into());
    };
    let raw: RawVerdict = match serde_json::from_str(block) {
        Ok(raw) => raw,
        Err(e) => return ChatVerdict::Malformed(format!("invalid verdict JSON: {e}")),
    };
    let Some(sentiment) = SentimentLabel::parse(&raw.sentiment) else {
        return ChatVerdict::Malformed(format!("unknown sentiment {:?}", raw.sentiment));
    };
    if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
        return ChatVerdict::Malformed(format!("confidence {} outside [0, 1]", raw.confidence));
    }
    ChatVerdict::Parsed(ChatAssessment {
        sentiment,
        confidence: raw.confidence,
        reasoning: raw.reasoning.unwrap_or_default(),
        key_points: raw.key_points.unwrap_or_default(),
        pros: raw.pros.unwrap_or_default(),
        cons: raw.cons.unwrap_or_default(),
    })
}
