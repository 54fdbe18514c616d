use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};

use reviewlens_ai::SentimentAnalyzer;
use reviewlens_core::{
    ComparisonInputs, ComparisonMetrics, ComparisonResult, CostModel, LocationSummary,
    ProviderScores, Review, SentimentRecord,
};
use reviewlens_store::ReviewRepository;

/// Output of a single-provider run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub records: Vec<SentimentRecord>,
    pub summary: LocationSummary,
    pub elapsed: Duration,
}

/// Structured analysis from the first provider with a narrative written by
/// the second over the same records.
#[derive(Debug, Clone)]
pub struct HybridReport {
    pub records: Vec<SentimentRecord>,
    pub summary: LocationSummary,
    pub narrative_summary: LocationSummary,
}

/// Drives the text-analytics and chat analyzers over a location's reviews.
///
/// Results are persisted through the repository after each run. Storage
/// failures are logged and never change what the caller gets back.
pub struct ComparisonEngine {
    text_analytics: Arc<dyn SentimentAnalyzer>,
    chat: Arc<dyn SentimentAnalyzer>,
    repo: ReviewRepository,
    costs: CostModel,
}

impl ComparisonEngine {
    pub fn new(
        text_analytics: Arc<dyn SentimentAnalyzer>,
        chat: Arc<dyn SentimentAnalyzer>,
        repo: ReviewRepository,
    ) -> Self {
        Self {
            text_analytics,
            chat,
            repo,
            costs: CostModel::default(),
        }
    }

    pub fn with_costs(mut self, costs: CostModel) -> Self {
        self.costs = costs;
        self
    }

    async fn run(
        analyzer: &dyn SentimentAnalyzer,
        location: &str,
        reviews: &[Review],
    ) -> AnalysisRun {
        let started = Instant::now();
        let records = analyzer.analyze(reviews).await;
        let summary = analyzer.summarize(location, &records).await;
        AnalysisRun {
            records,
            summary,
            elapsed: started.elapsed(),
        }
    }

    /// Analyze and summarize with the text-analytics provider only.
    pub async fn analyze_location(&self, location: &str, reviews: &[Review]) -> AnalysisRun {
        info!(location, count = reviews.len(), "starting single-provider analysis");
        let run = Self::run(self.text_analytics.as_ref(), location, reviews).await;
        self.persist_records(&run.records).await;
        self.persist_summary(&run.summary).await;
        run
    }

    /// Run both providers in turn over the same reviews and compare them.
    pub async fn compare(&self, location: &str, reviews: &[Review]) -> ComparisonResult {
        info!(location, count = reviews.len(), "starting provider comparison");

        let a = Self::run(self.text_analytics.as_ref(), location, reviews).await;
        info!(
            provider = %self.text_analytics.provider(),
            records = a.records.len(),
            elapsed_ms = a.elapsed.as_millis() as u64,
            "provider finished"
        );
        let b = Self::run(self.chat.as_ref(), location, reviews).await;
        info!(
            provider = %self.chat.provider(),
            records = b.records.len(),
            elapsed_ms = b.elapsed.as_millis() as u64,
            "provider finished"
        );

        let metrics = ComparisonMetrics::compute(
            &ComparisonInputs {
                text_analytics_records: &a.records,
                chat_records: &b.records,
                text_analytics_summary: &a.summary,
                chat_summary: &b.summary,
                text_analytics_elapsed: a.elapsed,
                chat_elapsed: b.elapsed,
            },
            &self.costs,
        );
        let result = ComparisonResult::new(location, a.summary, b.summary, metrics);

        self.persist_records(&a.records).await;
        self.persist_records(&b.records).await;
        self.persist_summary(&result.text_analytics_results).await;
        self.persist_summary(&result.chat_results).await;
        if let Err(e) = self.repo.store_comparison(&result).await {
            error!(location, error = %e, "failed to store comparison");
        }

        info!(
            location,
            agreement = result.comparison_metrics.sentiment_agreement,
            "comparison complete"
        );
        result
    }

    /// Text-analytics records and summary, plus a chat narrative over those
    /// same records instead of a second per-review pass.
    pub async fn hybrid(&self, location: &str, reviews: &[Review]) -> HybridReport {
        info!(location, count = reviews.len(), "starting hybrid analysis");
        let run = Self::run(self.text_analytics.as_ref(), location, reviews).await;

        let relabelled: Vec<SentimentRecord> = run
            .records
            .iter()
            .map(|r| SentimentRecord {
                provider: self.chat.provider(),
                scores: ProviderScores::Chat {
                    reasoning: String::new(),
                    key_points: Vec::new(),
                    pros: Vec::new(),
                    cons: Vec::new(),
                },
                ..r.clone()
            })
            .collect();
        let narrative_summary = self.chat.summarize(location, &relabelled).await;

        self.persist_records(&run.records).await;
        self.persist_summary(&run.summary).await;
        self.persist_summary(&narrative_summary).await;

        HybridReport {
            records: run.records,
            summary: run.summary,
            narrative_summary,
        }
    }

    async fn persist_records(&self, records: &[SentimentRecord]) {
        if records.is_empty() {
            return;
        }
        let outcome = self.repo.store_records(records).await;
        if !outcome.is_complete() {
            error!(
                written = outcome.written,
                failed = outcome.failed,
                "some sentiment records were not stored"
            );
        }
    }

    async fn persist_summary(&self, summary: &LocationSummary) {
        if let Err(e) = self.repo.store_summary(summary).await {
            error!(location = %summary.location, provider = %summary.provider, error = %e, "failed to store summary");
        }
    }
}
