//! Opinion-target normalisation for pros/cons extraction.
//!
//! Providers that support opinion mining return `(target, assessment)` pairs
//! such as `("queue", "awful")`. Before they are ranked, pairs go through
//! three steps driven by an [`OpinionVocabulary`]:
//!
//! 1. Discard noise targets: staff-role nouns ("associate", "cashier") and
//!    generic terms ("store", "experience") say nothing actionable.
//! 2. Map targets and assessments onto canonical terms
//!    ("queue" → "wait time", "awful" → "poor"), otherwise lower-case them.
//! 3. Build a readable phrase ("wait time is poor") and drop phrases
//!    shorter than [`MIN_PHRASE_CHARS`].

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sentiment::SentimentLabel;

/// Phrases shorter than this carry no information ("fix ok").
pub const MIN_PHRASE_CHARS: usize = 8;

/// Number of phrases emitted by [`rank_phrases`].
pub const TOP_PHRASES: usize = 5;

const PERSON_WORDS: &[&str] = &[
    "girl", "guy", "lady", "man", "woman", "person", "people", "staff", "employee", "worker",
    "associate", "rep", "technician", "manager", "supervisor", "clerk", "cashier",
];

const GENERIC_TERMS: &[&str] = &[
    "store", "time", "place", "experience", "thing", "day", "week", "month", "year", "help",
    "issue", "problem", "lot", "everything", "stuff", "service", "customer",
];

const TARGET_SYNONYMS: &[(&str, &str)] = &[
    ("staff", "staff"),
    ("associate", "staff"),
    ("rep", "staff"),
    ("employee", "staff"),
    ("wait", "wait time"),
    ("queue", "wait time"),
    ("line", "wait time"),
    ("price", "pricing"),
    ("cost", "pricing"),
    ("money", "pricing"),
    ("device", "device"),
    ("phone", "device"),
    ("product", "device"),
    ("battery", "battery life"),
    ("charge", "battery life"),
    ("repair", "repair service"),
    ("fix", "repair service"),
    ("service", "repair service"),
    ("return", "return policy"),
    ("refund", "return policy"),
];

const ASSESSMENT_SYNONYMS: &[(&str, &str)] = &[
    ("nice", "good"),
    ("great", "excellent"),
    ("awesome", "excellent"),
    ("terrible", "poor"),
    ("awful", "poor"),
    ("horrible", "poor"),
    ("fast", "quick"),
    ("slow", "slow"),
    ("quick", "quick"),
];

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("reading vocabulary file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("vocabulary JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Word lists and synonym tables used by [`OpinionNormalizer`].
///
/// Loaded once at startup and shared read-only. All keys are stored
/// lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpinionVocabulary {
    pub person_words: HashSet<String>,
    pub generic_terms: HashSet<String>,
    pub target_synonyms: HashMap<String, String>,
    pub assessment_synonyms: HashMap<String, String>,
}

impl Default for OpinionVocabulary {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        let table = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        Self {
            person_words: words(PERSON_WORDS),
            generic_terms: words(GENERIC_TERMS),
            target_synonyms: table(TARGET_SYNONYMS),
            assessment_synonyms: table(ASSESSMENT_SYNONYMS),
        }
    }
}

impl OpinionVocabulary {
    /// Parse a vocabulary from JSON with the same field names as the
    /// serialized form (`personWords`, `genericTerms`, `targetSynonyms`,
    /// `assessmentSynonyms`).
    pub fn from_json_str(json: &str) -> Result<Self, VocabularyError> {
        let vocab: Self = serde_json::from_str(json)?;
        Ok(vocab.folded())
    }

    pub fn from_json_file(path: &Path) -> Result<Self, VocabularyError> {
        let json = std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Lower-case every lookup key.
    fn folded(self) -> Self {
        let fold_set = |set: HashSet<String>| set.into_iter().map(|s| s.to_lowercase()).collect();
        let fold_map = |map: HashMap<String, String>| {
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect()
        };
        Self {
            person_words: fold_set(self.person_words),
            generic_terms: fold_set(self.generic_terms),
            target_synonyms: fold_map(self.target_synonyms),
            assessment_synonyms: fold_map(self.assessment_synonyms),
        }
    }
}

/// A normalised opinion ready for ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct OpinionPhrase {
    pub phrase: String,
    pub target: String,
    pub assessment: String,
    pub polarity: SentimentLabel,
    /// Positive + negative assessment score: intensity regardless of polarity.
    pub confidence: f64,
}

/// Applies an [`OpinionVocabulary`] to raw opinion pairs.
#[derive(Debug, Clone, Default)]
pub struct OpinionNormalizer {
    vocab: Arc<OpinionVocabulary>,
}

impl OpinionNormalizer {
    pub fn new(vocab: Arc<OpinionVocabulary>) -> Self {
        Self { vocab }
    }

    /// True for empty, person-word and generic targets.
    pub fn is_noise(&self, target: &str) -> bool {
        let key = target.trim().to_lowercase();
        key.is_empty()
            || self.vocab.person_words.contains(&key)
            || self.vocab.generic_terms.contains(&key)
    }

    pub fn normalize_target(&self, target: &str) -> String {
        lookup_or_lower(&self.vocab.target_synonyms, target)
    }

    pub fn normalize_assessment(&self, assessment: &str) -> String {
        lookup_or_lower(&self.vocab.assessment_synonyms, assessment)
    }

    /// Compose a readable phrase from already-normalised terms.
    pub fn phrase(&self, target: &str, assessment: &str, polarity: SentimentLabel) -> Option<String> {
        let phrase = match polarity {
            SentimentLabel::Positive | SentimentLabel::Negative => {
                format!("{target} is {assessment}")
            }
            SentimentLabel::Neutral => format!("{target} {assessment}"),
        };
        (phrase.chars().count() >= MIN_PHRASE_CHARS).then_some(phrase)
    }

    /// Run the full filter → normalise → phrase pipeline on one raw pair.
    pub fn opinion(
        &self,
        raw_target: &str,
        raw_assessment: &str,
        polarity: SentimentLabel,
        confidence: f64,
    ) -> Option<OpinionPhrase> {
        let raw_target = raw_target.trim();
        let raw_assessment = raw_assessment.trim();
        if self.is_noise(raw_target) || raw_assessment.is_empty() {
            return None;
        }
        let target = self.normalize_target(raw_target);
        let assessment = self.normalize_assessment(raw_assessment);
        let phrase = self.phrase(&target, &assessment, polarity)?;
        Some(OpinionPhrase {
            phrase,
            target,
            assessment,
            polarity,
            confidence,
        })
    }
}

fn lookup_or_lower(table: &HashMap<String, String>, raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    match table.get(&key) {
        Some(canonical) => canonical.clone(),
        None => key,
    }
}

/// Rank opinions and return up to [`TOP_PHRASES`] representative phrases.
///
/// Opinions are grouped by lower-cased `"{target} {assessment}"`; groups are
/// ordered by `count × mean(confidence)` descending, ties keeping the order
/// in which groups were first seen. The first phrase of each group is emitted.
pub fn rank_phrases(phrases: &[OpinionPhrase]) -> Vec<String> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<&OpinionPhrase>> = Vec::new();

    for op in phrases {
        let key = format!("{} {}", op.target, op.assessment).to_lowercase();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(op);
    }

    let mut scored: Vec<(f64, &OpinionPhrase)> = groups
        .iter()
        .map(|g| {
            let count = g.len() as f64;
            let mean = g.iter().map(|op| op.confidence).sum::<f64>() / count;
            (count * mean, g[0])
        })
        .collect();

    // Stable sort keeps first-seen order between equal scores.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(TOP_PHRASES)
        .map(|(_, op)| op.phrase.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> OpinionNormalizer {
        OpinionNormalizer::default()
    }

    fn op(target: &str, assessment: &str, confidence: f64) -> OpinionPhrase {
        normalizer()
            .opinion(target, assessment, SentimentLabel::Positive, confidence)
            .unwrap()
    }

    #[test]
    fn default_tables_pin_entries() {
        let v = OpinionVocabulary::default();
        assert_eq!(v.person_words.len(), 17);
        assert_eq!(v.generic_terms.len(), 17);
        assert_eq!(v.target_synonyms.len(), 20);
        assert_eq!(v.assessment_synonyms.len(), 9);
        assert!(v.person_words.contains("cashier"));
        assert!(v.generic_terms.contains("experience"));
        assert_eq!(v.target_synonyms["associate"], "staff");
        assert_eq!(v.target_synonyms["queue"], "wait time");
        assert_eq!(v.target_synonyms["refund"], "return policy");
        assert_eq!(v.assessment_synonyms["awesome"], "excellent");
        assert_eq!(v.assessment_synonyms["horrible"], "poor");
    }

    #[test]
    fn person_and_generic_targets_are_noise() {
        let n = normalizer();
        for target in ["staff", "Staff", "associate", "rep", "employee", "cashier"] {
            assert!(n.is_noise(target), "{target} should be filtered");
        }
        for target in ["store", "Experience", "service", "time"] {
            assert!(n.is_noise(target), "{target} should be filtered");
        }
        assert!(n.is_noise("   "));
        assert!(!n.is_noise("queue"));
        assert!(!n.is_noise("battery"));
    }

    #[test]
    fn staff_phrase_never_generated_from_bare_person_target() {
        let n = normalizer();
        // "staff" normalises to itself, but it is a person word and is
        // discarded before normalisation runs.
        assert_eq!(n.normalize_target("staff"), "staff");
        assert!(n.opinion("staff", "great", SentimentLabel::Positive, 0.9).is_none());
        assert!(n.opinion("associate", "awesome", SentimentLabel::Positive, 0.9).is_none());
        // "service" is both generic and a synonym key; the filter wins.
        assert!(n.opinion("service", "slow", SentimentLabel::Negative, 0.9).is_none());
    }

    #[test]
    fn normalises_targets_and_assessments() {
        let n = normalizer();
        assert_eq!(n.normalize_target("Queue"), "wait time");
        assert_eq!(n.normalize_target("Phone"), "device");
        assert_eq!(n.normalize_target("Genius Bar"), "genius bar");
        assert_eq!(n.normalize_assessment("AWESOME"), "excellent");
        assert_eq!(n.normalize_assessment("Helpful"), "helpful");
    }

    #[test]
    fn phrase_shape_and_minimum_length() {
        let n = normalizer();
        assert_eq!(
            n.phrase("wait time", "poor", SentimentLabel::Negative).as_deref(),
            Some("wait time is poor")
        );
        assert_eq!(
            n.phrase("layout", "open", SentimentLabel::Neutral).as_deref(),
            Some("layout open")
        );
        // "fix is ok" is 9 chars and survives; "ui ok" does not.
        assert!(n.phrase("fix", "ok", SentimentLabel::Positive).is_some());
        assert!(n.phrase("ui", "ok", SentimentLabel::Neutral).is_none());
    }

    #[test]
    fn opinion_builds_full_phrase() {
        let o = normalizer()
            .opinion(" queue ", "awful", SentimentLabel::Negative, 0.8)
            .unwrap();
        assert_eq!(o.phrase, "wait time is poor");
        assert_eq!(o.target, "wait time");
        assert_eq!(o.assessment, "poor");
        assert_eq!(o.confidence, 0.8);
    }

    #[test]
    fn rank_orders_by_count_times_mean_confidence() {
        let phrases = vec![
            op("battery", "great", 0.9),   // battery life is excellent: 1 × 0.9
            op("queue", "fast", 0.6),      // wait time is quick: 2 × 0.6
            op("line", "quick", 0.6),
            op("price", "fair", 1.0),      // pricing is fair: 1 × 1.0
        ];
        let ranked = rank_phrases(&phrases);
        assert_eq!(
            ranked,
            vec![
                "wait time is quick".to_string(),
                "pricing is fair".to_string(),
                "battery life is excellent".to_string(),
            ]
        );
    }

    #[test]
    fn rank_takes_top_five_and_keeps_first_seen_on_ties() {
        let phrases: Vec<OpinionPhrase> = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"]
            .iter()
            .map(|t| op(t, "good", 0.5))
            .collect();
        let ranked = rank_phrases(&phrases);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0], "alpha is good");
        assert_eq!(ranked[4], "echo is good");
    }

    #[test]
    fn rank_empty_is_empty() {
        assert!(rank_phrases(&[]).is_empty());
    }

    #[test]
    fn alternate_vocabulary_from_json() {
        let json = r#"{
            "personWords": ["Barista"],
            "genericTerms": ["cafe"],
            "targetSynonyms": {"Latte": "coffee"},
            "assessmentSynonyms": {"yummy": "delicious"}
        }"#;
        let vocab = OpinionVocabulary::from_json_str(json).unwrap();
        let n = OpinionNormalizer::new(Arc::new(vocab));
        assert!(n.is_noise("barista"));
        assert!(n.is_noise("Cafe"));
        // Default person words no longer apply.
        assert!(!n.is_noise("staff"));
        let o = n.opinion("latte", "Yummy", SentimentLabel::Positive, 0.7).unwrap();
        assert_eq!(o.phrase, "coffee is delicious");
    }

    #[test]
    fn vocabulary_file_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vocab.json");
        std::fs::write(&path, serde_json::to_string(&OpinionVocabulary::default()).unwrap()).unwrap();
        let loaded = OpinionVocabulary::from_json_file(&path).unwrap();
        assert_eq!(loaded, OpinionVocabulary::default());

        let missing = OpinionVocabulary::from_json_file(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(VocabularyError::Io { .. })));
    }
}
