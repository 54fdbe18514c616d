//! Review file loading for the `import` command.
//!
//! Two formats are accepted: the store's CSV export (`Review date`,
//! `Author name`, `Star rating`, `Review content` columns) and JSON, either
//! an array or one object per line. `.csv` files are read as CSV, anything
//! else as JSON.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{info, warn};

use reviewlens_core::Review;

const FILE_PREFIX: &str = "apple-";

/// A review as it appears in an import file. Only the star rating and the
/// content are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedReview {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "Review date")]
    review_date: String,
    #[serde(default, alias = "Author name")]
    author_name: String,
    #[serde(alias = "Star rating")]
    star_rating: u8,
    #[serde(alias = "Review content")]
    review_content: String,
    #[serde(default)]
    location: Option<String>,
}

impl ImportedReview {
    fn into_review(self, default_location: &str) -> Review {
        Review {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            review_date: self.review_date,
            author: self.author_name,
            star_rating: self.star_rating,
            content: self.review_content,
            location: self
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| default_location.to_string()),
            processed: false,
            sentiment_result: None,
        }
    }
}

/// Location named by a file such as `Apple-Fifth Avenue.csv`: the stem with
/// everything up to and including `Apple-` removed. Empty names become
/// `Unknown`.
pub fn location_from_file_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match stem.to_ascii_lowercase().find(FILE_PREFIX) {
        Some(at) => &stem[at + FILE_PREFIX.len()..],
        None => stem.as_str(),
    };
    let name = name.trim();
    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name.to_string()
    }
}

/// Location used for reviews that carry none.
pub fn default_location(path: &Path, explicit: Option<&str>) -> String {
    match explicit {
        Some(loc) => loc.to_string(),
        None => location_from_file_name(path),
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Parse a JSON array, or one JSON object per line.
pub fn parse_reviews(content: &str, default_location: &str) -> Result<Vec<Review>> {
    let trimmed = content.trim_start();
    let raw: Vec<ImportedReview> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).context("parsing review array")?
    } else {
        let mut out = Vec::new();
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let review = serde_json::from_str(line)
                .with_context(|| format!("parsing review on line {}", n + 1))?;
            out.push(review);
        }
        out
    };
    Ok(into_reviews(raw, default_location))
}

/// Parse a CSV export with a header row.
pub fn parse_csv_reviews(content: &str, default_location: &str) -> Result<Vec<Review>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let mut raw = Vec::new();
    for (n, result) in reader.deserialize().enumerate() {
        let review: ImportedReview =
            result.with_context(|| format!("parsing CSV record {}", n + 1))?;
        raw.push(review);
    }
    Ok(into_reviews(raw, default_location))
}

fn into_reviews(raw: Vec<ImportedReview>, default_location: &str) -> Vec<Review> {
    let mut reviews = Vec::with_capacity(raw.len());
    for r in raw {
        if !(1..=5).contains(&r.star_rating) {
            warn!(rating = r.star_rating, "skipping review with out-of-range star rating");
            continue;
        }
        reviews.push(r.into_review(default_location));
    }
    reviews
}

pub fn read_reviews(path: &Path, location: Option<&str>) -> Result<Vec<Review>> {
    if !path.exists() {
        bail!("review file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let location = default_location(path, location);
    info!(file = %path.display(), location = %location, "reading reviews");

    if is_csv(path) {
        parse_csv_reviews(&content, &location)
    } else {
        parse_reviews(&content, &location)
    }
}
