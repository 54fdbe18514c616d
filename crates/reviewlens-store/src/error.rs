use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document already exists: {kind}/{id}")]
    Conflict { kind: &'static str, id: String },

    #[error("document not found: {kind}/{id}")]
    NotFound { kind: &'static str, id: String },

    #[error("unknown document kind: {0}")]
    UnknownKind(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[error("{0}")]
    Other(String),
}
