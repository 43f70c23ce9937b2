//! Orchestration of one enrichment run
//!
//! ```text
//! records ─▶ [embedding stage] ─▶ ingest ─▶ analysis ─▶ enrichment (chunked) ─▶ metadata
//!                                              │              │
//!                                        similarity cache   progress observer
//! ```
//!
//! The embedding stage runs only through
//! [`ConvergencePipeline::enrich_with_provider`]; every other entry point
//! expects records to carry their vectors.

mod embedding;
mod error;
mod orchestrator;
mod progress;

pub use embedding::{EmbeddingError, EmbeddingProvider, EmbeddingStage};
#[cfg(feature = "embeddings")]
pub use embedding::FastEmbedProvider;
pub use error::{EngineError, EngineResult};
pub use orchestrator::{BatchOptions, ConvergencePipeline, EnrichmentOutcome, RunStats};
pub use progress::{LoggingObserver, ObserverError, ProgressObserver, ProgressUpdate};
