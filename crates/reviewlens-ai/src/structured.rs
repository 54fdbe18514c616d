//! Adapter for the structured text-analytics provider.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use reviewlens_core::opinion::rank_phrases;
use reviewlens_core::{
    LocationSummary, OpinionNormalizer, OpinionPhrase, ProcessedUpdate, Provider, ProviderScores,
    Review, SentimentLabel, SentimentRecord, StatusSink, clean_text, summarize_records,
};

use crate::analyzer::SentimentAnalyzer;
use crate::provider::{DocumentOutcome, TextAnalytics, TextDocument};

/// Documents per provider request.
pub const BATCH_SIZE: usize = 10;

pub struct TextAnalyticsAnalyzer {
    client: Arc<dyn TextAnalytics>,
    sink: Arc<dyn StatusSink>,
    normalizer: OpinionNormalizer,
    language: String,
}

impl TextAnalyticsAnalyzer {
    pub fn new(
        client: Arc<dyn TextAnalytics>,
        sink: Arc<dyn StatusSink>,
        normalizer: OpinionNormalizer,
        language: impl Into<String>,
    ) -> Self {
        Self {
            client,
            sink,
            normalizer,
            language: language.into(),
        }
    }

    fn document(&self, id: &str, raw: &str) -> Option<TextDocument> {
        clean_text(raw).map(|text| TextDocument {
            id: id.to_string(),
            text,
            language: self.language.clone(),
        })
    }

    async fn analyze_batch(&self, batch_no: usize, batch: &[Review]) -> Vec<SentimentRecord> {
        let by_id: HashMap<&str, &Review> = batch.iter().map(|r| (r.id.as_str(), r)).collect();
        let documents: Vec<TextDocument> = batch
            .iter()
            .filter_map(|r| {
                let doc = self.document(&r.id, &r.content);
                if doc.is_none() {
                    warn!(review_id = %r.id, "skipping review with too little text");
                }
                doc
            })
            .collect();
        if documents.is_empty() {
            return Vec::new();
        }

        let outcomes = match self.client.analyze_sentiment(&documents, false).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                error!(batch = batch_no, count = documents.len(), error = %e, "text analytics batch failed");
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                DocumentOutcome::Analyzed(doc) => {
                    let Some(review) = by_id.get(doc.id.as_str()) else {
                        warn!(id = %doc.id, "provider returned an unknown document id");
                        continue;
                    };
                    records.push(SentimentRecord::for_review(
                        review,
                        Provider::TextAnalytics,
                        doc.label,
                        doc.scores.max(),
                        ProviderScores::TextAnalytics {
                            positive: doc.scores.positive,
                            negative: doc.scores.negative,
                            neutral: doc.scores.neutral,
                        },
                    ));
                }
                DocumentOutcome::Failed { id, message } => {
                    warn!(review_id = %id, error = %message, "document analysis failed");
                }
            }
        }

        self.mark_processed(&records).await;
        debug!(batch = batch_no, analyzed = records.len(), "text analytics batch done");
        records
    }

    async fn mark_processed(&self, records: &[SentimentRecord]) {
        let updates = records.iter().map(|r| {
            let update = ProcessedUpdate {
                review_id: r.review_id.clone(),
                tag: r.sentiment.into(),
            };
            async move {
                if let Err(e) = self.sink.mark_processed(&update).await {
                    warn!(review_id = %update.review_id, error = %e, "failed to mark review processed");
                }
            }
        });
        join_all(updates).await;
    }

    /// Mine opinions from the records' review text and return up to five
    /// ranked phrases.
    pub async fn extract_top_phrases(&self, records: &[SentimentRecord]) -> Vec<String> {
        let mut phrases: Vec<OpinionPhrase> = Vec::new();

        for (batch_no, batch) in records.chunks(BATCH_SIZE).enumerate() {
            let documents: Vec<TextDocument> = batch
                .iter()
                .filter_map(|r| self.document(&r.id, &r.review_content))
                .collect();
            if documents.is_empty() {
                continue;
            }

            let outcomes = match self.client.analyze_sentiment(&documents, true).await {
                Ok(outcomes) => outcomes,
                Err(e) => {
                    error!(batch = batch_no, error = %e, "opinion mining batch failed");
                    continue;
                }
            };

            for outcome in outcomes {
                let DocumentOutcome::Analyzed(doc) = outcome else {
                    continue;
                };
                for opinion in &doc.opinions {
                    for assessment in &opinion.assessments {
                        let intensity = assessment.scores.positive + assessment.scores.negative;
                        if let Some(p) = self.normalizer.opinion(
                            &opinion.target,
                            &assessment.text,
                            assessment.label,
                            intensity,
                        ) {
                            phrases.push(p);
                        }
                    }
                }
            }
        }

        debug!(opinions = phrases.len(), "ranking mined opinions");
        rank_phrases(&phrases)
    }
}

#[async_trait]
impl SentimentAnalyzer for TextAnalyticsAnalyzer {
    fn provider(&self) -> Provider {
        Provider::TextAnalytics
    }

    async fn analyze(&self, reviews: &[Review]) -> Vec<SentimentRecord> {
        if reviews.is_empty() {
            warn!("no reviews to analyze");
            return Vec::new();
        }
        info!(count = reviews.len(), "starting text analytics sentiment analysis");

        let mut records = Vec::with_capacity(reviews.len());
        for (batch_no, batch) in reviews.chunks(BATCH_SIZE).enumerate() {
            records.extend(self.analyze_batch(batch_no, batch).await);
        }

        info!(analyzed = records.len(), "text analytics sentiment analysis complete");
        records
    }

    async fn summarize(&self, location: &str, records: &[SentimentRecord]) -> LocationSummary {
        let mut summary = summarize_records(location, Provider::TextAnalytics, records);
        if summary.is_empty() {
            warn!(location, "no text analytics records for location");
            return summary;
        }

        let subset = |label: SentimentLabel| -> Vec<SentimentRecord> {
            records
                .iter()
                .filter(|r| r.sentiment == label && r.location.to_lowercase() == location.to_lowercase())
                .cloned()
                .collect()
        };
        summary.top_pros = self.extract_top_phrases(&subset(SentimentLabel::Positive)).await;
        summary.top_cons = self.extract_top_phrases(&subset(SentimentLabel::Negative)).await;

        info!(
            location,
            sentiment = %summary.overall_sentiment,
            total = summary.total_reviews,
            "text analytics summary generated"
        );
        summary
    }
}
