//! Storage layer: a document store abstraction with in-memory and DuckDB
//! backends, and a typed repository for reviews and analysis results.

mod document;
mod error;
mod memory;
mod repository;

pub use document::{Document, DocumentKind, DocumentQuery, DocumentStore};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use repository::{ReviewRepository, ReviewWindow, WriteOutcome};

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;
