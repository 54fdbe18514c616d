//! Folding per-review records into a location-level summary.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment::{Provider, ProviderScores, SentimentLabel, SentimentRecord};

/// Number of pros/cons kept on a summary.
pub const TOP_ASPECTS: usize = 5;

/// Mean three-way scores, only meaningful for text-analytics records.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreAverages {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

/// Aggregated sentiment for one location as judged by one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub id: String,
    pub location: String,
    pub provider: Provider,
    pub overall_sentiment: SentimentLabel,
    pub total_reviews: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub average_confidence: f64,
    pub average_star_rating: f64,
    #[serde(default)]
    pub average_scores: Option<ScoreAverages>,
    pub top_pros: Vec<String>,
    pub top_cons: Vec<String>,
    /// Free-text synthesis, produced by the chat provider only.
    #[serde(default)]
    pub narrative: Option<String>,
    pub summary_date: DateTime<Utc>,
}

impl LocationSummary {
    /// A summary with no records behind it.
    pub fn empty(location: &str, provider: Provider) -> Self {
        Self {
            id: Self::document_id(provider, location),
            location: location.to_string(),
            provider,
            overall_sentiment: SentimentLabel::Neutral,
            total_reviews: 0,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
            average_confidence: 0.0,
            average_star_rating: 0.0,
            average_scores: None,
            top_pros: Vec::new(),
            top_cons: Vec::new(),
            narrative: None,
            summary_date: Utc::now(),
        }
    }

    /// Stable id so a later run for the same location overwrites this one.
    pub fn document_id(provider: Provider, location: &str) -> String {
        format!("summary:{}:{}", provider.as_str(), location.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.total_reviews == 0
    }
}

/// Overall label by strict plurality. Any tie, including the three-way tie
/// and the all-zero case, resolves to `Neutral`.
pub fn overall_label(positive: usize, negative: usize, neutral: usize) -> SentimentLabel {
    if positive > negative && positive > neutral {
        SentimentLabel::Positive
    } else if negative > positive && negative > neutral {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Fold `records` for `location` into a summary.
///
/// Records for other locations (compared case-insensitively) are ignored.
/// With no matching records the result is [`LocationSummary::empty`].
/// Pros and cons are the most frequent entries across chat records; the
/// text-analytics adapter replaces them with opinion-mined phrases.
pub fn summarize_records(
    location: &str,
    provider: Provider,
    records: &[SentimentRecord],
) -> LocationSummary {
    let matched: Vec<&SentimentRecord> = records
        .iter()
        .filter(|r| r.location.to_lowercase() == location.to_lowercase())
        .collect();

    let mut summary = LocationSummary::empty(location, provider);
    if matched.is_empty() {
        return summary;
    }

    let n = matched.len() as f64;
    let count = |label: SentimentLabel| matched.iter().filter(|r| r.sentiment == label).count();

    summary.total_reviews = matched.len();
    summary.positive_count = count(SentimentLabel::Positive);
    summary.negative_count = count(SentimentLabel::Negative);
    summary.neutral_count = count(SentimentLabel::Neutral);
    summary.overall_sentiment = overall_label(
        summary.positive_count,
        summary.negative_count,
        summary.neutral_count,
    );
    summary.average_confidence = matched.iter().map(|r| r.confidence).sum::<f64>() / n;
    summary.average_star_rating = matched.iter().map(|r| r.star_rating as f64).sum::<f64>() / n;
    summary.average_scores = average_scores(&matched);
    summary.top_pros = top_by_frequency(matched.iter().flat_map(|r| r.pros()), TOP_ASPECTS);
    summary.top_cons = top_by_frequency(matched.iter().flat_map(|r| r.cons()), TOP_ASPECTS);
    summary
}

fn average_scores(records: &[&SentimentRecord]) -> Option<ScoreAverages> {
    let mut sum = ScoreAverages::default();
    let mut n = 0usize;
    for r in records {
        if let ProviderScores::TextAnalytics {
            positive,
            negative,
            neutral,
        } = r.scores
        {
            sum.positive += positive;
            sum.negative += negative;
            sum.neutral += neutral;
            n += 1;
        }
    }
    if n == 0 {
        return None;
    }
    let n = n as f64;
    Some(ScoreAverages {
        positive: sum.positive / n,
        negative: sum.negative / n,
        neutral: sum.neutral / n,
    })
}

/// Most frequent strings, grouped case-insensitively.
///
/// Groups are ordered by size descending (ties keep first-seen order) and
/// each emits the first spelling seen, so one casing survives per cluster.
pub fn top_by_frequency<'a, I>(items: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(&'a String, usize)> = Vec::new();

    for item in items {
        let key = item.to_lowercase();
        match index.get(&key) {
            Some(&slot) => groups[slot].1 += 1,
            None => {
                index.insert(key, groups.len());
                groups.push((item, 1));
            }
        }
    }

    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
        .into_iter()
        .take(limit)
        .map(|(first, _)| first.clone())
        .collect()
}
