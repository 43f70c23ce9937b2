//! Convergence: semantic convergence and intelligence enrichment
//!
//! Takes a corpus of embedded documents and finds where their ideas
//! converge, then annotates every document with derived intelligence.
//!
//! # Core Concepts
//!
//! - **Convergence chains**: connected groups of documents whose pairwise
//!   cosine similarity reaches a threshold
//! - **Themes**: weaker micro-clusters outside every chain, and keywords
//!   bridging several chains
//! - **Insights** and **breakthroughs**: typed, scored observations about
//!   chains, themes and individual documents
//! - **Enrichment**: convergence, impact and intelligence scores (0-100),
//!   an intelligence type, and relation predicates per document
//!
//! # Example
//!
//! ```
//! use convergence::{ConvergencePipeline, DocumentRecord, EngineConfig};
//!
//! let pipeline = ConvergencePipeline::new(EngineConfig::default()).unwrap();
//! let ts = "2025-01-01T00:00:00Z".parse().unwrap();
//! let records = vec![
//!     DocumentRecord::new("a", ts).with_embedding(vec![1.0, 0.0]),
//!     DocumentRecord::new("b", ts).with_embedding(vec![0.9, 0.1]),
//! ];
//! let outcome = pipeline.enrich_documents(&records).unwrap();
//! assert_eq!(outcome.stats.processed, 2);
//! ```

pub mod analysis;
pub mod config;
pub mod document;
pub mod enrichment;
pub mod graph;
pub mod metadata;
pub mod pipeline;

pub use analysis::{
    Breakthrough, BreakthroughType, ChainId, ConvergenceAnalysis, ConvergenceChain, Insight, InsightType, Theme,
    ThemeId, ThemeKind,
};
pub use config::{ConfigError, EngineConfig};
pub use document::{
    AnalysisType, CategoryValue, Document, DocumentError, DocumentId, DocumentRecord, EnrichedDocument,
    InputValidationError, IntelligenceType, Predicates,
};
pub use graph::{CacheStats, SimilarityCache, SimilarityError, SimilarityGraph};
pub use metadata::KnowledgeMetadata;
pub use pipeline::{
    BatchOptions, ConvergencePipeline, EmbeddingError, EmbeddingProvider, EngineError, EngineResult,
    EnrichmentOutcome, LoggingObserver, ObserverError, ProgressObserver, ProgressUpdate, RunStats,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
