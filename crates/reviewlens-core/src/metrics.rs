//! Agreement, overlap and cost metrics between the two providers.
//!
//! Everything here is a pure function of the two record sets and summaries
//! handed in; nothing is read from the store.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment::{Provider, SentimentRecord};
use crate::summary::LocationSummary;

/// Rough per-provider pricing used for cost estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostModel {
    /// USD per 1000 text-analytics transactions (one per review).
    pub text_analytics_per_1k_transactions: f64,
    /// Estimated prompt+completion tokens per chat review.
    pub chat_tokens_per_review: u64,
    /// USD per 1000 chat tokens.
    pub chat_per_1k_tokens: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            text_analytics_per_1k_transactions: 1.00,
            chat_tokens_per_review: 100,
            chat_per_1k_tokens: 0.002,
        }
    }
}

impl CostModel {
    pub fn text_analytics_cost(&self, review_count: usize) -> f64 {
        review_count as f64 / 1000.0 * self.text_analytics_per_1k_transactions
    }

    pub fn chat_cost(&self, review_count: usize) -> f64 {
        let tokens = review_count as u64 * self.chat_tokens_per_review;
        tokens as f64 / 1000.0 * self.chat_per_1k_tokens
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetrics {
    /// Percentage of shared reviews on which both providers agree.
    pub sentiment_agreement: f64,
    /// Mean absolute confidence difference over shared reviews.
    pub confidence_difference: f64,
    pub pros_overlap: f64,
    pub cons_overlap: f64,
    /// Wall-clock milliseconds, kept fractional.
    pub processing_time_text_analytics_ms: f64,
    pub processing_time_chat_ms: f64,
    pub text_analytics_cost_estimate: f64,
    pub chat_cost_estimate: f64,
    pub total_cost_estimate: f64,
    pub recommendations: Vec<String>,
}

/// Everything [`ComparisonMetrics::compute`] needs.
pub struct ComparisonInputs<'a> {
    pub text_analytics_records: &'a [SentimentRecord],
    pub chat_records: &'a [SentimentRecord],
    pub text_analytics_summary: &'a LocationSummary,
    pub chat_summary: &'a LocationSummary,
    pub text_analytics_elapsed: Duration,
    pub chat_elapsed: Duration,
}

impl ComparisonMetrics {
    pub fn compute(inputs: &ComparisonInputs<'_>, costs: &CostModel) -> Self {
        let text_analytics_cost = costs.text_analytics_cost(inputs.text_analytics_records.len());
        let chat_cost = costs.chat_cost(inputs.chat_records.len());

        let mut metrics = Self {
            sentiment_agreement: sentiment_agreement(
                inputs.text_analytics_records,
                inputs.chat_records,
            ),
            confidence_difference: confidence_delta(
                inputs.text_analytics_records,
                inputs.chat_records,
            ),
            pros_overlap: overlap(
                &inputs.text_analytics_summary.top_pros,
                &inputs.chat_summary.top_pros,
            ),
            cons_overlap: overlap(
                &inputs.text_analytics_summary.top_cons,
                &inputs.chat_summary.top_cons,
            ),
            processing_time_text_analytics_ms: millis(inputs.text_analytics_elapsed),
            processing_time_chat_ms: millis(inputs.chat_elapsed),
            text_analytics_cost_estimate: text_analytics_cost,
            chat_cost_estimate: chat_cost,
            total_cost_estimate: text_analytics_cost + chat_cost,
            recommendations: Vec::new(),
        };
        metrics.recommendations = recommendations(&metrics);
        metrics
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

/// Side-by-side outcome of running both providers over one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub id: String,
    pub location: String,
    pub text_analytics_results: LocationSummary,
    pub chat_results: LocationSummary,
    pub comparison_metrics: ComparisonMetrics,
    pub analysis_date: DateTime<Utc>,
}

impl ComparisonResult {
    pub fn new(
        location: &str,
        text_analytics_results: LocationSummary,
        chat_results: LocationSummary,
        comparison_metrics: ComparisonMetrics,
    ) -> Self {
        Self {
            id: Self::document_id(location),
            location: location.to_string(),
            text_analytics_results,
            chat_results,
            comparison_metrics,
            analysis_date: Utc::now(),
        }
    }

    pub fn document_id(location: &str) -> String {
        format!("comparison:{}", location.to_lowercase())
    }
}

/// Pair each A record with the first B record for the same review id.
fn aligned<'a>(
    a: &'a [SentimentRecord],
    b: &'a [SentimentRecord],
) -> Vec<(&'a SentimentRecord, &'a SentimentRecord)> {
    let mut by_id: HashMap<&str, &SentimentRecord> = HashMap::with_capacity(b.len());
    for r in b {
        by_id.entry(r.review_id.as_str()).or_insert(r);
    }
    a.iter()
        .filter_map(|ra| by_id.get(ra.review_id.as_str()).map(|rb| (ra, *rb)))
        .collect()
}

/// Percentage of shared review ids with identical labels.
///
/// Ids present on only one side are ignored. Returns 0 when either side is
/// empty or nothing is shared.
pub fn sentiment_agreement(a: &[SentimentRecord], b: &[SentimentRecord]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let pairs = aligned(a, b);
    if pairs.is_empty() {
        return 0.0;
    }
    let agreed = pairs.iter().filter(|(x, y)| x.sentiment == y.sentiment).count();
    agreed as f64 / pairs.len() as f64 * 100.0
}

/// Mean absolute confidence difference over shared review ids.
pub fn confidence_delta(a: &[SentimentRecord], b: &[SentimentRecord]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let pairs = aligned(a, b);
    if pairs.is_empty() {
        return 0.0;
    }
    let total: f64 = pairs
        .iter()
        .map(|(x, y)| (x.confidence - y.confidence).abs())
        .sum();
    total / pairs.len() as f64
}

/// Jaccard similarity of two case-folded string sets, as a percentage.
pub fn overlap(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a: HashSet<String> = a.iter().map(|s| s.to_lowercase()).collect();
    let b: HashSet<String> = b.iter().map(|s| s.to_lowercase()).collect();
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64 * 100.0
}

/// Threshold rules, evaluated independently in a fixed order.
pub fn recommendations(m: &ComparisonMetrics) -> Vec<String> {
    let fast = Provider::TextAnalytics.display_name();
    let slow = Provider::Chat.display_name();
    let mut out = Vec::new();

    if m.sentiment_agreement > 80.0 {
        out.push("High sentiment agreement between models - results are reliable".to_string());
    } else if m.sentiment_agreement < 60.0 {
        out.push("Low sentiment agreement - consider manual review of conflicting cases".to_string());
    }

    if m.processing_time_chat_ms > m.processing_time_text_analytics_ms * 2.0 {
        out.push(format!(
            "{slow} processing is significantly slower - consider {fast} for real-time needs"
        ));
    }

    if m.chat_cost_estimate > m.text_analytics_cost_estimate * 2.0 {
        out.push(format!(
            "{slow} costs are higher - {fast} may be more cost-effective for large volumes"
        ));
    }

    if m.confidence_difference > 0.3 {
        out.push(
            "Significant confidence differences - models may have different sensitivity levels"
                .to_string(),
        );
    }

    if m.pros_overlap < 50.0 {
        out.push("Low pros overlap - models identify different positive aspects".to_string());
    }
    if m.cons_overlap < 50.0 {
        out.push("Low cons overlap - models identify different negative aspects".to_string());
    }

    if m.sentiment_agreement > 75.0 && m.pros_overlap > 60.0 && m.cons_overlap > 60.0 {
        out.push("Both models show good agreement - either can be used reliably".to_string());
    } else {
        out.push("Consider using both models for comprehensive analysis".to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::Review;
    use crate::sentiment::{ProviderScores, SentimentLabel};

    fn record(provider: Provider, id: &str, label: SentimentLabel, confidence: f64) -> SentimentRecord {
        let review = Review::new(id, "NYC", 4, "Perfectly ordinary review");
        let scores = match provider {
            Provider::TextAnalytics => ProviderScores::TextAnalytics {
                positive: confidence,
                negative: 0.0,
                neutral: 0.0,
            },
            Provider::Chat => ProviderScores::Chat {
                reasoning: String::new(),
                key_points: vec![],
                pros: vec![],
                cons: vec![],
            },
        };
        SentimentRecord::for_review(&review, provider, label, confidence, scores)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn agreement_eight_of_ten() {
        use SentimentLabel::*;
        let a: Vec<_> = (0..10)
            .map(|i| record(Provider::TextAnalytics, &i.to_string(), Positive, 0.9))
            .collect();
        let b: Vec<_> = (0..10)
            .map(|i| {
                let label = if i < 8 { Positive } else { Negative };
                record(Provider::Chat, &i.to_string(), label, 0.9)
            })
            .collect();
        assert!((sentiment_agreement(&a, &b) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn agreement_ignores_unshared_ids() {
        use SentimentLabel::*;
        let a = vec![
            record(Provider::TextAnalytics, "1", Positive, 0.9),
            record(Provider::TextAnalytics, "2", Negative, 0.9),
        ];
        let b = vec![
            record(Provider::Chat, "1", Positive, 0.7),
            record(Provider::Chat, "3", Negative, 0.7),
        ];
        assert_eq!(sentiment_agreement(&a, &b), 100.0);
        assert!((confidence_delta(&a, &b) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn empty_sides_are_zero() {
        let a = vec![record(Provider::TextAnalytics, "1", SentimentLabel::Positive, 0.9)];
        assert_eq!(sentiment_agreement(&a, &[]), 0.0);
        assert_eq!(sentiment_agreement(&[], &a), 0.0);
        assert_eq!(confidence_delta(&[], &[]), 0.0);
        assert_eq!(confidence_delta(&a, &[]), 0.0);

        let disjoint = vec![record(Provider::Chat, "9", SentimentLabel::Positive, 0.1)];
        assert_eq!(sentiment_agreement(&a, &disjoint), 0.0);
        assert_eq!(confidence_delta(&a, &disjoint), 0.0);
    }

    #[test]
    fn jaccard_overlap() {
        let x = strings(&["Friendly staff", "Clean store"]);
        assert_eq!(overlap(&x, &x), 100.0);
        assert_eq!(overlap(&x, &strings(&["friendly STAFF", "clean store"])), 100.0);
        assert_eq!(overlap(&x, &strings(&["Long wait"])), 0.0);
        let partial = overlap(&x, &strings(&["friendly staff", "Long wait"]));
        assert!((partial - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(overlap(&x, &[]), 0.0);
        assert_eq!(overlap(&[], &[]), 0.0);
    }

    #[test]
    fn cost_is_linear() {
        let costs = CostModel::default();
        assert!((costs.text_analytics_cost(1000) - 1.0).abs() < 1e-12);
        assert!((costs.chat_cost(1000) - 0.2).abs() < 1e-12);
        for n in [1usize, 7, 250, 1000] {
            assert!((costs.text_analytics_cost(2 * n) - 2.0 * costs.text_analytics_cost(n)).abs() < 1e-12);
            assert!((costs.chat_cost(2 * n) - 2.0 * costs.chat_cost(n)).abs() < 1e-12);
        }
        assert_eq!(costs.chat_cost(0), 0.0);
    }

    #[test]
    fn recommendations_for_strong_agreement() {
        let m = ComparisonMetrics {
            sentiment_agreement: 90.0,
            confidence_difference: 0.1,
            pros_overlap: 80.0,
            cons_overlap: 70.0,
            processing_time_text_analytics_ms: 100.0,
            processing_time_chat_ms: 150.0,
            text_analytics_cost_estimate: 1.0,
            chat_cost_estimate: 0.2,
            ..Default::default()
        };
        assert_eq!(
            recommendations(&m),
            vec![
                "High sentiment agreement between models - results are reliable",
                "Both models show good agreement - either can be used reliably",
            ]
        );
    }

    #[test]
    fn recommendations_fire_independently_in_order() {
        let m = ComparisonMetrics {
            sentiment_agreement: 40.0,
            confidence_difference: 0.5,
            pros_overlap: 10.0,
            cons_overlap: 20.0,
            processing_time_text_analytics_ms: 100.0,
            processing_time_chat_ms: 900.0,
            text_analytics_cost_estimate: 0.01,
            chat_cost_estimate: 0.05,
            ..Default::default()
        };
        let recs = recommendations(&m);
        assert_eq!(recs.len(), 7);
        assert!(recs[0].starts_with("Low sentiment agreement"));
        assert!(recs[1].contains("significantly slower"));
        assert!(recs[2].contains("more cost-effective"));
        assert!(recs[3].contains("sensitivity"));
        assert!(recs[4].starts_with("Low pros overlap"));
        assert!(recs[5].starts_with("Low cons overlap"));
        assert_eq!(recs[6], "Consider using both models for comprehensive analysis");
    }

    #[test]
    fn middling_agreement_adds_no_agreement_note() {
        let m = ComparisonMetrics {
            sentiment_agreement: 70.0,
            pros_overlap: 100.0,
            cons_overlap: 100.0,
            ..Default::default()
        };
        assert_eq!(
            recommendations(&m),
            vec!["Consider using both models for comprehensive analysis"]
        );
    }

    #[test]
    fn compute_assembles_everything() {
        use SentimentLabel::*;
        let a = vec![
            record(Provider::TextAnalytics, "1", Positive, 0.9),
            record(Provider::TextAnalytics, "2", Negative, 0.8),
        ];
        let b = vec![
            record(Provider::Chat, "1", Positive, 0.9),
            record(Provider::Chat, "2", Neutral, 0.6),
        ];
        let mut sa = LocationSummary::empty("NYC", Provider::TextAnalytics);
        sa.top_pros = strings(&["battery life is excellent"]);
        let mut sb = LocationSummary::empty("NYC", Provider::Chat);
        sb.top_pros = strings(&["Battery life is excellent"]);

        let inputs = ComparisonInputs {
            text_analytics_records: &a,
            chat_records: &b,
            text_analytics_summary: &sa,
            chat_summary: &sb,
            text_analytics_elapsed: Duration::from_millis(120),
            chat_elapsed: Duration::from_millis(2400),
        };
        let m = ComparisonMetrics::compute(&inputs, &CostModel::default());
        assert_eq!(m.sentiment_agreement, 50.0);
        assert!((m.confidence_difference - 0.1).abs() < 1e-9);
        assert_eq!(m.pros_overlap, 100.0);
        assert_eq!(m.cons_overlap, 0.0);
        assert!((m.processing_time_chat_ms - 2400.0).abs() < 1e-9);
        assert!((m.text_analytics_cost_estimate - 0.002).abs() < 1e-12);
        assert!((m.chat_cost_estimate - 0.0004).abs() < 1e-12);
        assert!((m.total_cost_estimate - 0.0024).abs() < 1e-12);
        assert_eq!(m.recommendations.len(), 4);
    }

    #[test]
    fn sub_millisecond_slowdown_is_reported() {
        let sa = LocationSummary::empty("NYC", Provider::TextAnalytics);
        let sb = LocationSummary::empty("NYC", Provider::Chat);
        let inputs = ComparisonInputs {
            text_analytics_records: &[],
            chat_records: &[],
            text_analytics_summary: &sa,
            chat_summary: &sb,
            text_analytics_elapsed: Duration::from_micros(300),
            chat_elapsed: Duration::from_micros(900),
        };
        let m = ComparisonMetrics::compute(&inputs, &CostModel::default());
        assert!((m.processing_time_text_analytics_ms - 0.3).abs() < 1e-9);
        assert!((m.processing_time_chat_ms - 0.9).abs() < 1e-9);
        assert!(m.recommendations.iter().any(|r| r.contains("significantly slower")));

        let m = ComparisonMetrics {
            processing_time_text_analytics_ms: 1.0,
            processing_time_chat_ms: 2.9,
            ..Default::default()
        };
        assert!(recommendations(&m).iter().any(|r| r.contains("significantly slower")));
    }
}
