//! BreakthroughDetector: chronological and connectivity scans
//!
//! Paradigm shifts come from a three-document sliding window over the
//! chronologically sorted corpus: the middle document's type must differ
//! from its predecessor, match its successor, and not be the neutral type.
//! Hubs, bridges, chain centers and chain origins come from chain and
//! theme structure. Each tag is its own breakthrough with its own impact.

use super::connections::ConnectionProfile;
use super::types::{Breakthrough, BreakthroughType, ConvergenceChain, Theme};
use crate::config::BreakthroughConfig;
use crate::graph::SimilarityGraph;

pub struct BreakthroughDetector {
    paradigm_shift_impact: f64,
    origin_impact_factor: f64,
}

impl BreakthroughDetector {
    pub fn new(config: &BreakthroughConfig) -> Self {
        Self {
            paradigm_shift_impact: config.paradigm_shift_impact,
            origin_impact_factor: config.origin_impact_factor,
        }
    }

    pub fn detect(
        &self,
        graph: &SimilarityGraph<'_>,
        chains: &[ConvergenceChain],
        themes: &[Theme],
        connections: &ConnectionProfile,
    ) -> Vec<Breakthrough> {
        let mut found = self.paradigm_shifts(graph);
        found.extend(self.knowledge_hubs(graph, connections));
        found.extend(self.theme_bridges(graph, chains, themes, connections));
        found.extend(self.chain_landmarks(graph, chains));
        found
    }

    /// Corpus indices in chronological order; ties keep input order.
    pub fn chronological_order(graph: &SimilarityGraph<'_>) -> Vec<usize> {
        let mut order: Vec<usize> = (0..graph.len()).collect();
        order.sort_by_key(|&i| graph.document(i).timestamp);
        order
    }

    fn paradigm_shifts(&self, graph: &SimilarityGraph<'_>) -> Vec<Breakthrough> {
        let order = Self::chronological_order(graph);
        order
            .windows(3)
            .filter_map(|w| {
                let prev = graph.document(w[0]);
                let cur = graph.document(w[1]);
                let next = graph.document(w[2]);
                let shifted = cur.analysis_type != prev.analysis_type
                    && cur.analysis_type == next.analysis_type
                    && !cur.analysis_type.is_neutral();
                shifted.then(|| Breakthrough {
                    breakthrough_type: BreakthroughType::ParadigmShift,
                    document_id: cur.id.clone(),
                    description: format!(
                        "Sustained shift from {} to {}",
                        prev.analysis_type, cur.analysis_type
                    ),
                    impact: self.paradigm_shift_impact,
                    chain_id: None,
                })
            })
            .collect()
    }

    fn knowledge_hubs(&self, graph: &SimilarityGraph<'_>, connections: &ConnectionProfile) -> Vec<Breakthrough> {
        connections
            .hubs()
            .into_iter()
            .map(|i| Breakthrough {
                breakthrough_type: BreakthroughType::KnowledgeHub,
                document_id: graph.document(i).id.clone(),
                description: format!(
                    "{} chain connections against a corpus average of {:.2}",
                    connections.count(i),
                    connections.average()
                ),
                impact: connections.hub_confidence(i),
                chain_id: None,
            })
            .collect()
    }

    fn theme_bridges(
        &self,
        graph: &SimilarityGraph<'_>,
        chains: &[ConvergenceChain],
        themes: &[Theme],
        connections: &ConnectionProfile,
    ) -> Vec<Breakthrough> {
        let n = graph.len();
        let mut impact = vec![None::<f64>; n];

        for theme in themes.iter().filter(|t| t.is_cross_chain()) {
            for &i in &theme.member_indices {
                impact[i] = Some(impact[i].map_or(theme.strength, |v: f64| v.max(theme.strength)));
            }
        }
        for chain in chains {
            for &i in chain.member_indices() {
                if connections.chains_of(i) >= 2 {
                    impact[i] = Some(impact[i].map_or(chain.strength, |v: f64| v.max(chain.strength)));
                }
            }
        }

        impact
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| {
                let value = value?;
                let doc = graph.document(i);
                Some(Breakthrough {
                    breakthrough_type: BreakthroughType::ThemeBridge,
                    document_id: doc.id.clone(),
                    description: format!("'{}' bridges otherwise separate convergence chains", doc.name),
                    impact: value,
                    chain_id: None,
                })
            })
            .collect()
    }

    fn chain_landmarks(&self, graph: &SimilarityGraph<'_>, chains: &[ConvergenceChain]) -> Vec<Breakthrough> {
        let mut found = Vec::with_capacity(chains.len() * 2);
        for chain in chains {
            found.push(Breakthrough {
                breakthrough_type: BreakthroughType::ConvergenceCenter,
                document_id: chain.center_document.clone(),
                description: format!("Center of the '{}' convergence chain", chain.theme),
                impact: chain.strength,
                chain_id: Some(chain.chain_id),
            });

            let origin = chain
                .member_indices()
                .iter()
                .copied()
                .min_by_key(|&i| (graph.document(i).timestamp, i));
            if let Some(origin) = origin {
                found.push(Breakthrough {
                    breakthrough_type: BreakthroughType::ConvergenceStart,
                    document_id: graph.document(origin).id.clone(),
                    description: format!("Origin of the '{}' convergence chain", chain.theme),
                    impact: chain.strength * self.origin_impact_factor,
                    chain_id: Some(chain.chain_id),
                });
            }
        }
        found
    }
}
