//! Sentiment labels, providers and the per-review sentiment record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::review::Review;

/// One of the two upstream sentiment providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// Structured cloud NLP service returning a three-way score distribution.
    TextAnalytics,
    /// Chat-completion model returning free text with an embedded JSON verdict.
    Chat,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextAnalytics => "text-analytics",
            Self::Chat => "chat",
        }
    }

    /// Name used in recommendations and CLI output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TextAnalytics => "Text Analytics",
            Self::Chat => "Chat model",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Parse a provider label case-insensitively. Returns `None` for anything
    /// outside the three-way label set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-specific payload carried alongside the uniform label/confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProviderScores {
    #[serde(rename_all = "camelCase")]
    TextAnalytics {
        positive: f64,
        negative: f64,
        neutral: f64,
    },
    #[serde(rename_all = "camelCase")]
    Chat {
        reasoning: String,
        key_points: Vec<String>,
        pros: Vec<String>,
        cons: Vec<String>,
    },
}

/// A single provider's judgment of a single review.
///
/// Immutable once created. Re-running an analysis produces new records with
/// new ids rather than updating old ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentRecord {
    pub id: String,
    pub review_id: String,
    pub location: String,
    pub provider: Provider,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub review_content: String,
    pub author_name: String,
    pub star_rating: u8,
    pub scores: ProviderScores,
    pub analysis_date: DateTime<Utc>,
}

impl SentimentRecord {
    /// Build a record for `review`, copying its identity and display fields.
    pub fn for_review(
        review: &Review,
        provider: Provider,
        sentiment: SentimentLabel,
        confidence: f64,
        scores: ProviderScores,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            review_id: review.id.clone(),
            location: review.location.clone(),
            provider,
            sentiment,
            confidence,
            review_content: review.content.clone(),
            author_name: review.author.clone(),
            star_rating: review.star_rating,
            scores,
            analysis_date: Utc::now(),
        }
    }

    pub fn pros(&self) -> &[String] {
        match &self.scores {
            ProviderScores::Chat { pros, .. } => pros,
            ProviderScores::TextAnalytics { .. } => &[],
        }
    }

    pub fn cons(&self) -> &[String] {
        match &self.scores {
            ProviderScores::Chat { cons, .. } => cons,
            ProviderScores::TextAnalytics { .. } => &[],
        }
    }
}
