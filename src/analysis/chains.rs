//! ConvergenceChainDetector: thresholded connected components
//!
//! Walks unvisited documents in input order, following only edges whose
//! similarity reaches the chain threshold. Every connected set at least
//! `min_chain_length` long becomes a chain; smaller sets are left for the
//! theme stage. A corpus of near-identical vectors legitimately collapses
//! into one chain.

use super::types::{dominant_category, ranked_categories, ChainId, ConvergenceChain, TemporalSpan};
use crate::config::ChainConfig;
use crate::document::DocumentId;
use crate::graph::SimilarityGraph;
use tracing::debug;

/// Label used when no participant carries a category.
pub const UNCATEGORIZED: &str = "uncategorized";

pub struct ConvergenceChainDetector {
    similarity_threshold: f64,
    min_chain_length: usize,
}

impl ConvergenceChainDetector {
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            min_chain_length: config.min_chain_length.max(1),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Detect chains over the whole corpus. A document joins at most one chain.
    pub fn detect(&self, graph: &SimilarityGraph<'_>) -> Vec<ConvergenceChain> {
        graph
            .components(self.similarity_threshold, None)
            .into_iter()
            .filter(|members| members.len() >= self.min_chain_length && members.len() > 1)
            .filter_map(|members| self.build_chain(graph, members))
            .collect()
    }

    fn build_chain(&self, graph: &SimilarityGraph<'_>, members: Vec<usize>) -> Option<ConvergenceChain> {
        let docs: Vec<_> = members.iter().map(|&i| graph.document(i)).collect();
        let participants: Vec<DocumentId> = docs.iter().map(|d| d.id.clone()).collect();

        let temporal_span = TemporalSpan::from_timestamps(docs.iter().map(|d| d.timestamp))?;
        let strength = graph.mean_pairwise_similarity(&members);

        // Highest weighted degree; first in input order wins ties
        let mut center = members[0];
        let mut best = f64::NEG_INFINITY;
        for &i in &members {
            let degree = graph.weighted_degree(i, &members);
            if degree > best {
                best = degree;
                center = i;
            }
        }

        let theme = dominant_category(docs.iter().copied()).unwrap_or_else(|| UNCATEGORIZED.to_string());
        let keywords = ranked_categories(docs.iter().copied());
        let chain_id = ChainId::for_participants(&participants);

        debug!(
            chain = %chain_id,
            size = members.len(),
            strength,
            theme = %theme,
            "convergence chain detected"
        );

        Some(ConvergenceChain {
            chain_id,
            theme,
            strength,
            participants,
            center_document: graph.document(center).id.clone(),
            temporal_span,
            keywords,
            members,
        })
    }
}
