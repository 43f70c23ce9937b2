//! Run-scoped knowledge metadata
//!
//! [`KnowledgeMetadataAggregator`] summarizes one enrichment run: score
//! means and distributions, chain-graph connectivity, temporal spacing of
//! chains, data-quality coverage, and a ranked list of recommendations.
//! Metadata is recomputed from scratch every run and never merged.

mod aggregator;
mod recommendations;
pub mod stats;
mod types;

pub use aggregator::KnowledgeMetadataAggregator;
pub use recommendations::recommend;
pub use stats::{ScoreBucket, ScoreSummary};
pub use types::{
    ChainStatistics, DataQuality, Distribution, KnowledgeGraphMetrics, KnowledgeMetadata, Priority, Recommendation,
    RecommendationType, ScoreStatistics, Share, Summary, TemporalAnalysis,
};
