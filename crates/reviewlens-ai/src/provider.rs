//! Contracts for the two upstream sentiment providers.
//!
//! The analyzers only ever talk to these traits; the HTTP implementations
//! live in [`crate::http`] and tests substitute in-process fakes.

use async_trait::async_trait;
use reviewlens_core::SentimentLabel;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("completion contained no text")]
    EmptyCompletion,
}

// ── Text analytics ──

#[derive(Debug, Clone, PartialEq)]
pub struct TextDocument {
    pub id: String,
    pub text: String,
    pub language: String,
}

/// Three-way confidence distribution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreTriple {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl ScoreTriple {
    pub fn max(&self) -> f64 {
        self.positive.max(self.negative).max(self.neutral)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub text: String,
    pub label: SentimentLabel,
    pub scores: ScoreTriple,
}

/// A mined opinion: an aspect of the review and what was said about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Opinion {
    pub target: String,
    pub assessments: Vec<Assessment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSentiment {
    pub id: String,
    pub label: SentimentLabel,
    pub scores: ScoreTriple,
    /// Empty unless opinion mining was requested.
    pub opinions: Vec<Opinion>,
}

/// Per-document result; one document failing does not fail the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Analyzed(DocumentSentiment),
    Failed { id: String, message: String },
}

/// Map a provider document label onto the three-way label set. The
/// provider's "mixed" becomes `Neutral`.
pub fn document_label(raw: &str) -> Option<SentimentLabel> {
    if raw.eq_ignore_ascii_case("mixed") {
        return Some(SentimentLabel::Neutral);
    }
    SentimentLabel::parse(raw)
}

#[async_trait]
pub trait TextAnalytics: Send + Sync {
    async fn analyze_sentiment(
        &self,
        documents: &[TextDocument],
        opinion_mining: bool,
    ) -> Result<Vec<DocumentOutcome>, ProviderError>;
}

// ── Chat completion ──

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Return the text of the first completion choice.
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError>;
}
