//! Sentiment providers and the adapters that turn their output into
//! [`SentimentRecord`](reviewlens_core::SentimentRecord)s and summaries.
//!
//! - [`TextAnalyticsAnalyzer`]: structured three-way scores plus opinion
//!   mining for pros and cons.
//! - [`ChatAnalyzer`]: a chat model asked for a JSON verdict per review and
//!   a narrative per location.
//!
//! HTTP clients for both services are behind the `http` feature.

mod analyzer;
pub mod chat;
pub mod prompts;
pub mod provider;
pub mod structured;
pub mod verdict;
pub mod wire;

#[cfg(feature = "http")]
pub mod http;

pub use analyzer::SentimentAnalyzer;
pub use chat::ChatAnalyzer;
pub use provider::{ChatCompletion, ProviderError, TextAnalytics};
pub use structured::TextAnalyticsAnalyzer;
pub use verdict::{ChatAssessment, ChatVerdict, parse_verdict};

#[cfg(feature = "http")]
pub use http::{ChatClient, TextAnalyticsClient};
