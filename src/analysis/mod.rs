//! Corpus-wide convergence analysis
//!
//! Every stage reads the same [`SimilarityGraph`](crate::graph::SimilarityGraph)
//! so pairwise similarities are computed at most once per run.
//!
//! # Stages
//!
//! - **ConvergenceChainDetector**: strong components at the chain threshold
//! - **ThemeIdentifier**: emergent micro-clusters plus cross-chain keyword themes
//! - **InsightGenerator**: typed, confidence-scored observations
//! - **BreakthroughDetector**: paradigm shifts, hubs, bridges and chain landmarks
//!
//! [`ConnectionProfile`] is shared by the insight and breakthrough stages so
//! both agree on which documents are hubs.

mod breakthroughs;
mod chains;
mod connections;
mod insights;
mod themes;
mod types;

pub use breakthroughs::BreakthroughDetector;
pub use chains::{ConvergenceChainDetector, UNCATEGORIZED};
pub use connections::ConnectionProfile;
pub use insights::InsightGenerator;
pub use themes::ThemeIdentifier;
pub use types::{
    dominant_category, ranked_categories, Breakthrough, BreakthroughType, ChainId, ConvergenceAnalysis,
    ConvergenceChain, Insight, InsightType, TemporalSpan, Theme, ThemeId, ThemeKind,
};
