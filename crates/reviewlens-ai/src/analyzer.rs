use async_trait::async_trait;
use reviewlens_core::{LocationSummary, Provider, Review, SentimentRecord};

/// A provider adapter the comparison engine can drive without knowing
/// which service sits behind it.
///
/// Both operations are infallible: per-review and per-batch failures are
/// logged and skipped, so a run always yields whatever succeeded.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    fn provider(&self) -> Provider;

    async fn analyze(&self, reviews: &[Review]) -> Vec<SentimentRecord>;

    async fn summarize(&self, location: &str, records: &[SentimentRecord]) -> LocationSummary;
}
