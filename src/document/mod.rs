//! Document model and ingestion contract
//!
//! Raw records arrive from an external document source. Ingestion turns
//! them into validated [`Document`]s: category values are reduced to plain
//! name keys, embeddings are checked against the corpus dimension, and any
//! record that fails is reported as a [`DocumentError`] instead of aborting
//! the run. Enrichment output is written to [`EnrichedDocument`].

mod category;
mod ingest;
mod types;

pub use category::{normalize_category_key, CategoryValue};
pub use ingest::{ingest, DocumentRecord, IngestReport};
pub use types::{
    AnalysisType, Document, DocumentError, DocumentId, EnrichedDocument, InputValidationError,
    IntelligenceType, Predicates,
};
