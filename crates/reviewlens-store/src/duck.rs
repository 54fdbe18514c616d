//! DuckDB-backed document store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use duckdb::{Connection, params};
use tracing::info;

use crate::{Document, DocumentKind, DocumentQuery, DocumentStore, StoreError};

const SCHEMA: &str = "
CREATE SEQUENCE IF NOT EXISTS documents_seq START 1;
CREATE TABLE IF NOT EXISTS documents (
    kind          VARCHAR NOT NULL,
    id            VARCHAR NOT NULL,
    partition_key VARCHAR NOT NULL,
    body          VARCHAR NOT NULL,
    seq           BIGINT  NOT NULL DEFAULT nextval('documents_seq'),
    PRIMARY KEY (kind, id)
);
";

/// Every document lives in one `documents` table keyed by `(kind, id)`,
/// with the JSON body stored as text and `seq` preserving insertion order.
///
/// Supports both in-memory (ephemeral) and persistent (file-backed) modes.
/// Use [`open`](Self::open) for in-memory and [`open_persistent`](Self::open_persistent)
/// for a database file that survives across runs.
pub struct DuckStore {
    conn: Mutex<Connection>,
}

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let store = Self::init(Connection::open(path)?)?;
        info!(path = %path.display(), "opened document store");
        Ok(store)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Other("duckdb connection lock poisoned".into()))
    }

    fn exists(conn: &Connection, kind: DocumentKind, id: &str) -> Result<bool, StoreError> {
        let n: i64 = conn.query_row(
            "SELECT count(*)::BIGINT FROM documents WHERE kind = ? AND id = ?",
            params![kind.as_str(), id],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }
}

type Row = (String, String, String, String);

fn row_to_document((kind, id, partition_key, body): Row) -> Result<Document, StoreError> {
    Ok(Document {
        id,
        kind: DocumentKind::parse(&kind)?,
        partition_key,
        body: serde_json::from_str(&body)?,
    })
}

#[async_trait]
impl DocumentStore for DuckStore {
    async fn put(&self, doc: Document) -> Result<(), StoreError> {
        let conn = self.conn()?;
        if Self::exists(&conn, doc.kind, &doc.id)? {
            return Err(StoreError::Conflict {
                kind: doc.kind.as_str(),
                id: doc.id,
            });
        }
        let body = serde_json::to_string(&doc.body)?;
        conn.execute(
            "INSERT INTO documents (kind, id, partition_key, body) VALUES (?, ?, ?, ?)",
            params![doc.kind.as_str(), doc.id, doc.partition_key, body],
        )?;
        Ok(())
    }

    async fn upsert(&self, doc: Document) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let body = serde_json::to_string(&doc.body)?;
        if Self::exists(&conn, doc.kind, &doc.id)? {
            conn.execute(
                "UPDATE documents SET partition_key = ?, body = ? WHERE kind = ? AND id = ?",
                params![doc.partition_key, body, doc.kind.as_str(), doc.id],
            )?;
        } else {
            conn.execute(
                "INSERT INTO documents (kind, id, partition_key, body) VALUES (?, ?, ?, ?)",
                params![doc.kind.as_str(), doc.id, doc.partition_key, body],
            )?;
        }
        Ok(())
    }

    async fn get(&self, kind: DocumentKind, id: &str) -> Result<Option<Document>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT kind, id, partition_key, body FROM documents WHERE kind = ? AND id = ?",
        )?;
        let mut rows = stmt.query_map(params![kind.as_str(), id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row_to_document(row?)?)),
            None => Ok(None),
        }
    }

    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        let conn = self.conn()?;
        let rows: Vec<Row> = match &query.partition_key {
            Some(pk) => {
                let mut stmt = conn.prepare(
                    "SELECT kind, id, partition_key, body FROM documents \
                     WHERE kind = ? AND partition_key = ? ORDER BY seq",
                )?;
                stmt.query_map(params![query.kind.as_str(), pk], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?
                .collect::<Result<_, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT kind, id, partition_key, body FROM documents \
                     WHERE kind = ? ORDER BY seq",
                )?;
                stmt.query_map(params![query.kind.as_str()], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?
                .collect::<Result<_, _>>()?
            }
        };
        rows.into_iter().map(row_to_document).collect()
    }

    async fn count(&self, kind: DocumentKind) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row(
            "SELECT count(*)::BIGINT FROM documents WHERE kind = ?",
            params![kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}
