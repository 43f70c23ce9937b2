//! KnowledgeMetadataAggregator

use super::recommendations::recommend;
use super::stats::{self, percentage, ScoreSummary};
use super::types::{
    ChainStatistics, DataQuality, Distribution, KnowledgeGraphMetrics, KnowledgeMetadata, ScoreStatistics, Share,
    Summary, TemporalAnalysis,
};
use crate::analysis::{BreakthroughType, ConvergenceAnalysis, ThemeKind};
use crate::config::RecommendationConfig;
use crate::document::EnrichedDocument;
use std::collections::BTreeMap;

const SECONDS_PER_DAY: f64 = 86_400.0;

pub struct KnowledgeMetadataAggregator {
    recommendations: RecommendationConfig,
}

impl KnowledgeMetadataAggregator {
    pub fn new(config: &RecommendationConfig) -> Self {
        Self {
            recommendations: config.clone(),
        }
    }

    /// Summarize one run. Total over every input, including the empty corpus.
    ///
    /// `documents` must be the enriched corpus in input order, matching the
    /// indices the analysis was computed over.
    pub fn aggregate(
        &self,
        documents: &[EnrichedDocument],
        analysis: &ConvergenceAnalysis,
        skipped: usize,
    ) -> KnowledgeMetadata {
        let mut metadata = KnowledgeMetadata {
            summary: summary(documents, analysis),
            distribution: distribution(documents),
            knowledge_graph: knowledge_graph(documents.len(), analysis),
            temporal_analysis: temporal_analysis(documents, analysis),
            recommendations: Vec::new(),
            chain_statistics: chain_statistics(analysis),
            score_statistics: score_statistics(documents),
            data_quality: data_quality(documents, skipped),
        };
        let emergent = analysis
            .themes
            .iter()
            .filter(|t| t.kind == ThemeKind::Emergent)
            .count();
        metadata.recommendations = recommend(&metadata, emergent, &self.recommendations);
        metadata
    }
}

fn summary(documents: &[EnrichedDocument], analysis: &ConvergenceAnalysis) -> Summary {
    let scores = |f: fn(&EnrichedDocument) -> f64| documents.iter().map(f).collect::<Vec<_>>();
    Summary {
        total_documents: documents.len(),
        total_chains: analysis.chains.len(),
        total_themes: analysis.themes.len(),
        total_insights: analysis.insights.len(),
        total_breakthroughs: analysis.breakthroughs.len(),
        documents_with_breakthroughs: documents.iter().filter(|d| !d.breakthroughs.is_empty()).count(),
        average_convergence_score: stats::mean(&scores(|d| d.convergence_score)),
        average_impact_score: stats::mean(&scores(|d| d.impact_score)),
        average_intelligence_score: stats::mean(&scores(|d| d.intelligence_score)),
    }
}

fn histogram<'a>(keys: impl Iterator<Item = &'a str>, total: usize) -> BTreeMap<String, Share> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(key, count)| {
            (
                key,
                Share {
                    count,
                    percentage: percentage(count, total),
                },
            )
        })
        .collect()
}

fn distribution(documents: &[EnrichedDocument]) -> Distribution {
    let total = documents.len();
    Distribution {
        analysis_types: histogram(documents.iter().map(|d| d.analysis_type.as_str()), total),
        intelligence_types: histogram(documents.iter().map(|d| d.intelligence_type.as_str()), total),
        categories: histogram(
            documents.iter().flat_map(|d| d.categories.iter().map(String::as_str)),
            total,
        ),
    }
}

fn knowledge_graph(nodes: usize, analysis: &ConvergenceAnalysis) -> KnowledgeGraphMetrics {
    let edges: usize = analysis
        .chains
        .iter()
        .map(|c| c.len() * c.len().saturating_sub(1) / 2)
        .sum();
    let max_edges = nodes * nodes.saturating_sub(1) / 2;
    let density = if max_edges == 0 {
        0.0
    } else {
        edges as f64 / max_edges as f64
    };

    // Components of the chain co-membership graph
    let mut parent: Vec<usize> = (0..nodes).collect();
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }
    let mut chained = vec![false; nodes];
    for chain in &analysis.chains {
        let members = chain.member_indices();
        for &i in members {
            chained[i] = true;
        }
        if let Some(&first) = members.first() {
            for &i in &members[1..] {
                let (a, b) = (find(&mut parent, first), find(&mut parent, i));
                if a != b {
                    parent[b] = a;
                }
            }
        }
    }
    let mut sizes: BTreeMap<usize, usize> = BTreeMap::new();
    for i in 0..nodes {
        let root = find(&mut parent, i);
        *sizes.entry(root).or_insert(0) += 1;
    }

    let clusters = analysis.chains.len();
    let clustered: usize = analysis.chains.iter().map(|c| c.len()).sum();
    let mut hubs: Vec<_> = analysis
        .breakthroughs
        .iter()
        .filter(|b| b.breakthrough_type == BreakthroughType::KnowledgeHub)
        .map(|b| &b.document_id)
        .collect();
    hubs.sort();
    hubs.dedup();

    KnowledgeGraphMetrics {
        nodes,
        edges,
        density,
        clusters,
        average_cluster_size: if clusters == 0 {
            0.0
        } else {
            clustered as f64 / clusters as f64
        },
        largest_component: sizes.values().copied().max().unwrap_or(0),
        isolated_nodes: chained.iter().filter(|c| !**c).count(),
        knowledge_hubs: hubs.len(),
    }
}

fn temporal_analysis(documents: &[EnrichedDocument], analysis: &ConvergenceAnalysis) -> TemporalAnalysis {
    let corpus_start = documents.iter().map(|d| d.timestamp).min();
    let corpus_end = documents.iter().map(|d| d.timestamp).max();
    let corpus_span_days = match (corpus_start, corpus_end) {
        (Some(start), Some(end)) => (end - start).num_seconds() as f64 / SECONDS_PER_DAY,
        _ => 0.0,
    };
    let document_density = if corpus_span_days > 0.0 {
        documents.len() as f64 / corpus_span_days
    } else {
        0.0
    };

    let spans: Vec<f64> = analysis.chains.iter().map(|c| c.temporal_span.span_days).collect();

    let mut starts: Vec<_> = analysis.chains.iter().map(|c| c.temporal_span.start).collect();
    starts.sort();
    let gaps: Vec<f64> = starts
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds() as f64 / SECONDS_PER_DAY)
        .collect();

    let densities: Vec<f64> = analysis
        .chains
        .iter()
        .filter(|c| c.temporal_span.span_days >= 1.0)
        .map(|c| c.len() as f64 / c.temporal_span.span_days)
        .collect();

    TemporalAnalysis {
        corpus_start,
        corpus_end,
        corpus_span_days,
        document_density,
        average_chain_span_days: stats::mean(&spans),
        median_chain_span_days: stats::median(&spans),
        longest_chain_span_days: stats::max(&spans),
        average_chain_spacing_days: stats::mean(&gaps),
        average_chain_density: stats::mean(&densities),
    }
}

fn chain_statistics(analysis: &ConvergenceAnalysis) -> ChainStatistics {
    let sizes: Vec<usize> = analysis.chains.iter().map(|c| c.len()).collect();
    let mut size_distribution = BTreeMap::new();
    for &size in &sizes {
        *size_distribution.entry(size).or_insert(0) += 1;
    }
    let as_f64: Vec<f64> = sizes.iter().map(|&s| s as f64).collect();
    ChainStatistics {
        size_distribution,
        mean_size: stats::mean(&as_f64),
        median_size: stats::median(&as_f64),
        min_size: sizes.iter().copied().min().unwrap_or(0),
        max_size: sizes.iter().copied().max().unwrap_or(0),
    }
}

fn score_statistics(documents: &[EnrichedDocument]) -> ScoreStatistics {
    let collect = |f: fn(&EnrichedDocument) -> f64| documents.iter().map(f).collect::<Vec<_>>();
    ScoreStatistics {
        convergence: ScoreSummary::from_scores(&collect(|d| d.convergence_score)),
        impact: ScoreSummary::from_scores(&collect(|d| d.impact_score)),
        intelligence: ScoreSummary::from_scores(&collect(|d| d.intelligence_score)),
    }
}

fn data_quality(documents: &[EnrichedDocument], skipped: usize) -> DataQuality {
    let count = |f: fn(&EnrichedDocument) -> bool| documents.iter().filter(|d| f(d)).count();
    DataQuality {
        total_documents: documents.len(),
        with_categories: count(|d| !d.categories.is_empty()),
        with_chains: count(|d| !d.convergence_chains.is_empty()),
        with_insights: count(|d| !d.insights.is_empty()),
        with_breakthroughs: count(|d| !d.breakthroughs.is_empty()),
        skipped_documents: skipped,
    }
}
