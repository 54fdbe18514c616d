//! In-process document store, used by tests and one-shot runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Document, DocumentKind, DocumentQuery, DocumentStore, StoreError};

#[derive(Default)]
struct Inner {
    docs: HashMap<(DocumentKind, String), (u64, Document)>,
    next_seq: u64,
}

/// Documents held in a `HashMap` behind an async `RwLock`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, doc: Document) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let key = (doc.kind, doc.id.clone());
        if inner.docs.contains_key(&key) {
            return Err(StoreError::Conflict {
                kind: doc.kind.as_str(),
                id: doc.id,
            });
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.docs.insert(key, (seq, doc));
        Ok(())
    }

    async fn upsert(&self, doc: Document) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let key = (doc.kind, doc.id.clone());
        let seq = match inner.docs.get(&key) {
            Some((seq, _)) => *seq,
            None => {
                let seq = inner.next_seq;
                inner.next_seq += 1;
                seq
            }
        };
        inner.docs.insert(key, (seq, doc));
        Ok(())
    }

    async fn get(&self, kind: DocumentKind, id: &str) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .docs
            .get(&(kind, id.to_string()))
            .map(|(_, doc)| doc.clone()))
    }

    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        let mut hits: Vec<&(u64, Document)> = inner
            .docs
            .values()
            .filter(|(_, doc)| query.matches(doc))
            .collect();
        hits.sort_by_key(|(seq, _)| *seq);
        Ok(hits.into_iter().map(|(_, doc)| doc.clone()).collect())
    }
}
