//! ThemeIdentifier: emergent micro-clusters and cross-chain themes
//!
//! Emergent themes are built only from documents outside every chain,
//! using the lower micro-cluster threshold and minimum size. Cross-chain
//! themes collect category keywords shared by two or more chains; their
//! members are the participants that actually carry those keywords.

use super::chains::UNCATEGORIZED;
use super::types::{dominant_category, ranked_categories, ConvergenceChain, Theme, ThemeId, ThemeKind};
use crate::config::EngineConfig;
use crate::document::DocumentId;
use crate::graph::SimilarityGraph;
use std::collections::BTreeMap;
use tracing::debug;

pub struct ThemeIdentifier {
    micro_cluster_threshold: f64,
    min_theme_size: usize,
    max_keywords: usize,
}

impl ThemeIdentifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            micro_cluster_threshold: config.micro_cluster_threshold(),
            min_theme_size: config.themes.min_theme_size.max(1),
            max_keywords: config.themes.max_keywords,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.micro_cluster_threshold
    }

    /// Emergent themes first (input order), then cross-chain themes (keyword order).
    pub fn identify(&self, graph: &SimilarityGraph<'_>, chains: &[ConvergenceChain]) -> Vec<Theme> {
        let mut themes = self.emergent_themes(graph, chains);
        themes.extend(self.cross_chain_themes(graph, chains));
        themes
    }

    /// Micro-clusters among documents that belong to no chain.
    pub fn emergent_themes(&self, graph: &SimilarityGraph<'_>, chains: &[ConvergenceChain]) -> Vec<Theme> {
        let mut unchained = vec![true; graph.len()];
        for chain in chains {
            for &i in chain.member_indices() {
                unchained[i] = false;
            }
        }

        graph
            .components(self.micro_cluster_threshold, Some(&unchained))
            .into_iter()
            .filter(|members| members.len() >= self.min_theme_size)
            .map(|members| {
                let docs: Vec<_> = members.iter().map(|&i| graph.document(i)).collect();
                let ids: Vec<DocumentId> = docs.iter().map(|d| d.id.clone()).collect();
                let name = dominant_category(docs.iter().copied())
                    .unwrap_or_else(|| UNCATEGORIZED.to_string());
                let mut keywords = ranked_categories(docs.iter().copied());
                keywords.truncate(self.max_keywords);
                let strength = graph.mean_pairwise_similarity(&members);

                debug!(theme = %name, size = members.len(), strength, "emergent theme");

                Theme {
                    theme_id: ThemeId::for_members(ThemeKind::Emergent, &ids),
                    name,
                    kind: ThemeKind::Emergent,
                    strength,
                    members: ids,
                    keywords,
                    chains: Vec::new(),
                    member_indices: members,
                }
            })
            .collect()
    }

    /// Themes for keywords shared across at least two chains.
    ///
    /// Keywords bridging exactly the same set of chains are merged into one theme.
    pub fn cross_chain_themes(&self, graph: &SimilarityGraph<'_>, chains: &[ConvergenceChain]) -> Vec<Theme> {
        let mut keyword_chains: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (c, chain) in chains.iter().enumerate() {
            for keyword in &chain.keywords {
                keyword_chains.entry(keyword.as_str()).or_default().push(c);
            }
        }

        let mut groups: BTreeMap<Vec<usize>, Vec<&str>> = BTreeMap::new();
        for (keyword, chain_set) in keyword_chains {
            if chain_set.len() >= 2 {
                groups.entry(chain_set).or_default().push(keyword);
            }
        }

        let mut themes: Vec<Theme> = groups
            .into_iter()
            .filter_map(|(chain_set, keywords)| {
                let mut members: Vec<usize> = chain_set
                    .iter()
                    .flat_map(|&c| chains[c].member_indices().iter().copied())
                    .filter(|&i| {
                        graph
                            .document(i)
                            .categories
                            .iter()
                            .any(|k| keywords.contains(&k.as_str()))
                    })
                    .collect();
                members.sort_unstable();
                members.dedup();
                if members.len() < 2 {
                    return None;
                }

                let ids: Vec<DocumentId> = members.iter().map(|&i| graph.document(i).id.clone()).collect();
                let strength = graph.mean_pairwise_similarity(&members);
                let name = keywords.join(" + ");
                let mut keywords: Vec<String> = keywords.into_iter().map(str::to_string).collect();
                keywords.truncate(self.max_keywords);

                debug!(theme = %name, chains = chain_set.len(), strength, "cross-chain theme");

                Some(Theme {
                    theme_id: ThemeId::for_members(ThemeKind::CrossChain, &ids),
                    name,
                    kind: ThemeKind::CrossChain,
                    strength,
                    members: ids,
                    keywords,
                    chains: chain_set.iter().map(|&c| chains[c].chain_id).collect(),
                    member_indices: members,
                })
            })
            .collect();

        // Keyword order for stable output
        themes.sort_by(|a, b| a.name.cmp(&b.name));
        themes
    }
}
