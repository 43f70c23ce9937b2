//! Run-scoped knowledge metadata

use super::stats::ScoreSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Corpus-level view of one enrichment run. Recomputed from scratch each run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeMetadata {
    pub summary: Summary,
    pub distribution: Distribution,
    pub knowledge_graph: KnowledgeGraphMetrics,
    pub temporal_analysis: TemporalAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub chain_statistics: ChainStatistics,
    pub score_statistics: ScoreStatistics,
    pub data_quality: DataQuality,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_documents: usize,
    pub total_chains: usize,
    pub total_themes: usize,
    pub total_insights: usize,
    pub total_breakthroughs: usize,
    pub documents_with_breakthroughs: usize,
    pub average_convergence_score: f64,
    pub average_impact_score: f64,
    pub average_intelligence_score: f64,
}

/// A histogram entry with its share of the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub analysis_types: BTreeMap<String, Share>,
    pub intelligence_types: BTreeMap<String, Share>,
    /// Each document counts a category once; shares may sum past 100
    pub categories: BTreeMap<String, Share>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeGraphMetrics {
    pub nodes: usize,
    /// Undirected intra-chain connections
    pub edges: usize,
    /// edges / (nodes × (nodes − 1) / 2)
    pub density: f64,
    pub clusters: usize,
    pub average_cluster_size: f64,
    pub largest_component: usize,
    pub isolated_nodes: usize,
    pub knowledge_hubs: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_end: Option<DateTime<Utc>>,
    pub corpus_span_days: f64,
    /// Documents per day over the corpus span
    pub document_density: f64,
    pub average_chain_span_days: f64,
    pub median_chain_span_days: f64,
    pub longest_chain_span_days: f64,
    /// Mean gap between consecutive chain start times
    pub average_chain_spacing_days: f64,
    /// Mean of participants per span day, over chains spanning at least a day
    pub average_chain_density: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatistics {
    /// Chain size → number of chains of that size
    pub size_distribution: BTreeMap<usize, usize>,
    pub mean_size: f64,
    pub median_size: f64,
    pub min_size: usize,
    pub max_size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStatistics {
    pub convergence: ScoreSummary,
    pub impact: ScoreSummary,
    pub intelligence: ScoreSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub total_documents: usize,
    pub with_categories: usize,
    pub with_chains: usize,
    pub with_insights: usize,
    pub with_breakthroughs: usize,
    pub skipped_documents: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    SkippedDocuments,
    NoConvergenceChains,
    NoKnowledgeHubs,
    IsolatedDocuments,
    SparseConnectivity,
    LowIntelligence,
    EmergentThemes,
}

/// Lower rank sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub recommendation_type: RecommendationType,
    pub priority: Priority,
    pub description: String,
}
