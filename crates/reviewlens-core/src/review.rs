//! Imported customer reviews.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::sentiment::SentimentLabel;

/// Date-time layouts tried, in order, by [`Review::parsed_date`].
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y", "%b %d, %Y"];

/// Simplified sentiment tag written back onto a review once analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessedTag {
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "-")]
    Negative,
    #[serde(rename = "mixed")]
    Mixed,
}

impl ProcessedTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "+",
            Self::Negative => "-",
            Self::Mixed => "mixed",
        }
    }
}

impl From<SentimentLabel> for ProcessedTag {
    fn from(label: SentimentLabel) -> Self {
        match label {
            SentimentLabel::Positive => Self::Positive,
            SentimentLabel::Negative => Self::Negative,
            SentimentLabel::Neutral => Self::Mixed,
        }
    }
}

/// A customer review as imported.
///
/// Everything except `processed` and `sentiment_result` is fixed at import;
/// those two change only through a [`ProcessedUpdate`](crate::ProcessedUpdate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    /// Free text as found in the source; see [`parsed_date`](Self::parsed_date).
    #[serde(default)]
    pub review_date: String,
    #[serde(default, rename = "authorName")]
    pub author: String,
    pub star_rating: u8,
    #[serde(rename = "reviewContent")]
    pub content: String,
    pub location: String,
    #[serde(default)]
    pub processed: bool,
    #[serde(default)]
    pub sentiment_result: Option<ProcessedTag>,
}

impl Review {
    pub fn new(id: &str, location: &str, star_rating: u8, content: &str) -> Self {
        Self {
            id: id.to_string(),
            review_date: String::new(),
            author: String::new(),
            star_rating,
            content: content.to_string(),
            location: location.to_string(),
            processed: false,
            sentiment_result: None,
        }
    }

    /// Partition key used by the document store.
    pub fn partition_key(&self) -> &str {
        &self.location
    }

    /// Parse the free-text review date. Returns `None` when no known layout
    /// matches; the review is then treated as undated.
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        let raw = self.review_date.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        for fmt in DATE_TIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt);
            }
        }
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}
