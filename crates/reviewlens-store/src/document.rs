//! The document model shared by every backend.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Review,
    SentimentRecord,
    LocationSummary,
    Comparison,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        Self::Review,
        Self::SentimentRecord,
        Self::LocationSummary,
        Self::Comparison,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::SentimentRecord => "sentiment-record",
            Self::LocationSummary => "location-summary",
            Self::Comparison => "comparison",
        }
    }

    pub fn parse(s: &str) -> Result<Self, StoreError> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| StoreError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON body stored under `(kind, id)`, grouped by partition key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub kind: DocumentKind,
    pub partition_key: String,
    pub body: serde_json::Value,
}

impl Document {
    pub fn encode<T: Serialize>(
        kind: DocumentKind,
        id: &str,
        partition_key: &str,
        value: &T,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            id: id.to_string(),
            kind,
            partition_key: partition_key.to_string(),
            body: serde_json::to_value(value)?,
        })
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Filter for [`DocumentStore::query`]. Partition keys match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    pub kind: DocumentKind,
    pub partition_key: Option<String>,
}

impl DocumentQuery {
    pub fn all(kind: DocumentKind) -> Self {
        Self {
            kind,
            partition_key: None,
        }
    }

    pub fn partition(kind: DocumentKind, partition_key: &str) -> Self {
        Self {
            kind,
            partition_key: Some(partition_key.to_string()),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.kind == self.kind
            && self
                .partition_key
                .as_deref()
                .is_none_or(|pk| pk == doc.partition_key)
    }
}

/// Key-value document storage.
///
/// Query results come back in insertion order. An `upsert` of an existing
/// document keeps its original position.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. Fails with [`StoreError::Conflict`] when the
    /// `(kind, id)` pair is taken.
    async fn put(&self, doc: Document) -> Result<(), StoreError>;

    async fn upsert(&self, doc: Document) -> Result<(), StoreError>;

    async fn get(&self, kind: DocumentKind, id: &str) -> Result<Option<Document>, StoreError>;

    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, kind: DocumentKind) -> Result<usize, StoreError> {
        Ok(self.query(&DocumentQuery::all(kind)).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in DocumentKind::ALL {
            assert_eq!(DocumentKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(matches!(
            DocumentKind::parse("invoice"),
            Err(StoreError::UnknownKind(_))
        ));
    }

    #[test]
    fn query_matches_kind_and_partition() {
        let doc = Document {
            id: "1".into(),
            kind: DocumentKind::Review,
            partition_key: "NYC".into(),
            body: serde_json::json!({}),
        };
        assert!(DocumentQuery::all(DocumentKind::Review).matches(&doc));
        assert!(DocumentQuery::partition(DocumentKind::Review, "NYC").matches(&doc));
        assert!(!DocumentQuery::partition(DocumentKind::Review, "Boston").matches(&doc));
        assert!(!DocumentQuery::all(DocumentKind::Comparison).matches(&doc));
    }
}
