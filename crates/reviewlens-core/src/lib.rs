//! Core types and pure algorithms: reviews, sentiment records, opinion
//! normalisation, location summaries and provider comparison metrics.

pub mod metrics;
pub mod opinion;
pub mod review;
pub mod sentiment;
pub mod status;
pub mod summary;
pub mod text;

pub use metrics::{ComparisonInputs, ComparisonMetrics, ComparisonResult, CostModel};
pub use opinion::{OpinionNormalizer, OpinionPhrase, OpinionVocabulary, VocabularyError};
pub use review::{ProcessedTag, Review};
pub use sentiment::{Provider, ProviderScores, SentimentLabel, SentimentRecord};
pub use status::{NullSink, ProcessedUpdate, StatusSink};
pub use summary::{LocationSummary, ScoreAverages, summarize_records};
pub use text::clean_text;
