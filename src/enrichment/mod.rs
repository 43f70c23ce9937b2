//! Per-document enrichment
//!
//! Turns one run's [`ConvergenceAnalysis`](crate::analysis::ConvergenceAnalysis)
//! into [`EnrichedDocument`](crate::document::EnrichedDocument)s: the three
//! 0-100 scores, a single intelligence type, attached insights and
//! breakthroughs, and relation predicates. Enrichment reads the analysis
//! through an [`AnalysisIndex`] so any contiguous slice of the corpus can be
//! enriched independently with identical results.

mod index;
mod predicates;
mod scoring;

pub use index::AnalysisIndex;
pub use predicates::derive_predicates;
pub use scoring::{clamp_score, DocumentScores, ScoreEnrichmentEngine};
