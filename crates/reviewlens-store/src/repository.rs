//! Typed access to reviews and analysis results over any [`DocumentStore`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Months, NaiveDateTime};
use futures::future::join_all;
use tracing::{debug, info, warn};

use reviewlens_core::{
    ComparisonResult, LocationSummary, ProcessedUpdate, Provider, Review, SentimentRecord,
    StatusSink,
};

use crate::{Document, DocumentKind, DocumentQuery, DocumentStore, StoreError};

/// Reviews written per batch by [`ReviewRepository::store_reviews`].
pub const WRITE_BATCH: usize = 100;

/// Recency window applied when reading reviews back for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewWindow {
    pub max_months: u32,
    pub max_reviews: usize,
}

impl Default for ReviewWindow {
    fn default() -> Self {
        Self {
            max_months: 12,
            max_reviews: 1000,
        }
    }
}

/// Result of a bulk write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOutcome {
    pub written: usize,
    pub failed: usize,
}

impl WriteOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Clone)]
pub struct ReviewRepository {
    store: Arc<dyn DocumentStore>,
}

impl ReviewRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // ── Writes ──

    /// Write reviews in batches of [`WRITE_BATCH`]. Writes within a batch run
    /// concurrently; an existing id is overwritten.
    pub async fn store_reviews(&self, reviews: &[Review]) -> WriteOutcome {
        let docs: Vec<Result<Document, StoreError>> = reviews
            .iter()
            .map(|r| Document::encode(DocumentKind::Review, &r.id, r.partition_key(), r))
            .collect();
        let outcome = self.write_all(docs).await;
        info!(
            written = outcome.written,
            failed = outcome.failed,
            "stored reviews"
        );
        outcome
    }

    /// Write sentiment records with the same batching as reviews.
    pub async fn store_records(&self, records: &[SentimentRecord]) -> WriteOutcome {
        let docs: Vec<Result<Document, StoreError>> = records
            .iter()
            .map(|r| Document::encode(DocumentKind::SentimentRecord, &r.id, &r.location, r))
            .collect();
        let outcome = self.write_all(docs).await;
        info!(
            written = outcome.written,
            failed = outcome.failed,
            "stored sentiment records"
        );
        outcome
    }

    pub async fn store_summary(&self, summary: &LocationSummary) -> Result<(), StoreError> {
        let doc = Document::encode(
            DocumentKind::LocationSummary,
            &summary.id,
            &summary.location,
            summary,
        )?;
        self.store.upsert(doc).await
    }

    pub async fn store_comparison(&self, comparison: &ComparisonResult) -> Result<(), StoreError> {
        let doc = Document::encode(
            DocumentKind::Comparison,
            &comparison.id,
            &comparison.location,
            comparison,
        )?;
        self.store.upsert(doc).await
    }

    async fn write_all(&self, docs: Vec<Result<Document, StoreError>>) -> WriteOutcome {
        let written = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let (ok_count, err_count) = (&written, &failed);

        for (i, batch) in docs.chunks(WRITE_BATCH).enumerate() {
            let writes = batch.iter().map(|doc| async move {
                let result = match doc {
                    Ok(doc) => self.put_or_replace(doc.clone()).await,
                    Err(e) => Err(StoreError::Other(e.to_string())),
                };
                match result {
                    Ok(()) => {
                        ok_count.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        warn!(error = %e, "document write failed");
                        err_count.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
            join_all(writes).await;
            debug!(batch = i, size = batch.len(), "wrote batch");
        }

        WriteOutcome {
            written: written.into_inner(),
            failed: failed.into_inner(),
        }
    }

    async fn put_or_replace(&self, doc: Document) -> Result<(), StoreError> {
        match self.store.put(doc.clone()).await {
            Err(StoreError::Conflict { .. }) => self.store.upsert(doc).await,
            other => other,
        }
    }

    // ── Reads ──

    /// All reviews, optionally restricted to one location, in import order.
    pub async fn reviews(&self, location: Option<&str>) -> Result<Vec<Review>, StoreError> {
        let query = match location {
            Some(loc) => DocumentQuery::partition(DocumentKind::Review, loc),
            None => DocumentQuery::all(DocumentKind::Review),
        };
        decode_all(self.store.query(&query).await?)
    }

    /// Reviews for `location` dated within `window.max_months` of `now`,
    /// newest first, at most `window.max_reviews`. Undated reviews and
    /// reviews whose date does not parse are dropped.
    pub async fn reviews_within(
        &self,
        location: &str,
        window: ReviewWindow,
        now: NaiveDateTime,
    ) -> Result<Vec<Review>, StoreError> {
        let cutoff = now
            .checked_sub_months(Months::new(window.max_months))
            .unwrap_or(NaiveDateTime::MIN);

        let mut dated: Vec<(NaiveDateTime, Review)> = self
            .reviews(Some(location))
            .await?
            .into_iter()
            .filter_map(|r| match r.parsed_date() {
                Some(d) => Some((d, r)),
                None => {
                    debug!(review_id = %r.id, date = %r.review_date, "dropping undated review");
                    None
                }
            })
            .filter(|(d, _)| *d >= cutoff)
            .collect();

        dated.sort_by(|a, b| b.0.cmp(&a.0));
        dated.truncate(window.max_reviews);
        Ok(dated.into_iter().map(|(_, r)| r).collect())
    }

    pub async fn records(
        &self,
        provider: Provider,
        location: Option<&str>,
    ) -> Result<Vec<SentimentRecord>, StoreError> {
        let query = match location {
            Some(loc) => DocumentQuery::partition(DocumentKind::SentimentRecord, loc),
            None => DocumentQuery::all(DocumentKind::SentimentRecord),
        };
        let records: Vec<SentimentRecord> = decode_all(self.store.query(&query).await?)?;
        Ok(records.into_iter().filter(|r| r.provider == provider).collect())
    }

    pub async fn summary(
        &self,
        provider: Provider,
        location: &str,
    ) -> Result<Option<LocationSummary>, StoreError> {
        let id = LocationSummary::document_id(provider, location);
        self.store
            .get(DocumentKind::LocationSummary, &id)
            .await?
            .map(|d| d.decode())
            .transpose()
    }

    pub async fn comparison(&self, location: &str) -> Result<Option<ComparisonResult>, StoreError> {
        let id = ComparisonResult::document_id(location);
        self.store
            .get(DocumentKind::Comparison, &id)
            .await?
            .map(|d| d.decode())
            .transpose()
    }

    pub async fn review_count(&self) -> Result<usize, StoreError> {
        self.store.count(DocumentKind::Review).await
    }

    pub async fn has_reviews(&self) -> Result<bool, StoreError> {
        Ok(self.review_count().await? > 0)
    }

    /// Distinct review locations in first-seen order.
    pub async fn locations(&self) -> Result<Vec<String>, StoreError> {
        let mut out: Vec<String> = Vec::new();
        for review in self.reviews(None).await? {
            if !out.contains(&review.location) {
                out.push(review.location);
            }
        }
        Ok(out)
    }
}

fn decode_all<T: serde::de::DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>, StoreError> {
    docs.iter().map(Document::decode).collect()
}

#[async_trait]
impl StatusSink for ReviewRepository {
    async fn mark_processed(&self, update: &ProcessedUpdate) -> anyhow::Result<()> {
        let doc = self
            .store
            .get(DocumentKind::Review, &update.review_id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                kind: DocumentKind::Review.as_str(),
                id: update.review_id.clone(),
            })?;
        let mut review: Review = doc.decode()?;
        review.processed = true;
        review.sentiment_result = Some(update.tag);
        let doc = Document::encode(DocumentKind::Review, &review.id, review.partition_key(), &review)?;
        self.store.upsert(doc).await?;
        Ok(())
    }
}
