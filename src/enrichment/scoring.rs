//! ScoreEnrichmentEngine: per-document scores, type and predicates

use super::index::AnalysisIndex;
use super::predicates::derive_predicates;
use crate::analysis::BreakthroughType;
use crate::config::ScoringConfig;
use crate::document::{EnrichedDocument, IntelligenceType};
use std::ops::Range;

/// Clamp a score into [0, 100]; non-finite values become 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// The three derived scores of one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentScores {
    pub convergence: f64,
    pub impact: f64,
    pub intelligence: f64,
}

pub struct ScoreEnrichmentEngine {
    config: ScoringConfig,
}

impl ScoreEnrichmentEngine {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Enrich the documents in `range`, in input order.
    pub fn enrich_range(&self, index: &AnalysisIndex<'_>, range: Range<usize>) -> Vec<EnrichedDocument> {
        range.map(|i| self.enrich_one(index, i)).collect()
    }

    pub fn enrich_all(&self, index: &AnalysisIndex<'_>) -> Vec<EnrichedDocument> {
        self.enrich_range(index, 0..index.len())
    }

    pub fn enrich_one(&self, index: &AnalysisIndex<'_>, doc: usize) -> EnrichedDocument {
        let analysis = index.analysis;
        let source = &index.documents[doc];
        let scores = self.scores(index, doc);

        EnrichedDocument {
            id: source.id.clone(),
            name: source.name.clone(),
            timestamp: source.timestamp,
            analysis_type: source.analysis_type,
            categories: source.categories.clone(),
            embedding: source.embedding.clone(),
            convergence_score: scores.convergence,
            impact_score: scores.impact,
            intelligence_score: scores.intelligence,
            intelligence_type: self.classify(index, doc, &scores),
            convergence_chains: index
                .chains_of(doc)
                .iter()
                .map(|&c| analysis.chains[c].chain_id)
                .collect(),
            insights: index
                .insights_of(doc)
                .iter()
                .map(|&k| analysis.insights[k].clone())
                .collect(),
            breakthroughs: index
                .breakthroughs_of(doc)
                .iter()
                .map(|&b| analysis.breakthroughs[b].clone())
                .collect(),
            predicates: derive_predicates(index, doc),
        }
    }

    pub fn scores(&self, index: &AnalysisIndex<'_>, doc: usize) -> DocumentScores {
        let analysis = index.analysis;
        let convergence = index
            .chains_of(doc)
            .iter()
            .map(|&c| analysis.chains[c].strength)
            .fold(0.0_f64, f64::max);
        let impact = index
            .breakthroughs_of(doc)
            .iter()
            .map(|&b| analysis.breakthroughs[b].impact)
            .fold(0.0_f64, f64::max);

        let convergence = clamp_score(100.0 * convergence);
        let impact = clamp_score(100.0 * impact);
        let insight = clamp_score(index.insights_of(doc).len() as f64 * self.config.insight_unit);

        DocumentScores {
            convergence,
            impact,
            intelligence: self.intelligence_score(convergence, impact, insight),
        }
    }

    /// Weighted mean of the convergence, impact and insight components.
    pub fn intelligence_score(&self, convergence: f64, impact: f64, insight: f64) -> f64 {
        let w = &self.config.weights;
        let total = w.convergence + w.impact + w.insight;
        if total <= 0.0 {
            return 0.0;
        }
        clamp_score((w.convergence * convergence + w.impact * impact + w.insight * insight) / total)
    }

    /// First matching rule wins.
    fn classify(&self, index: &AnalysisIndex<'_>, doc: usize, scores: &DocumentScores) -> IntelligenceType {
        if index.has_breakthrough(doc, BreakthroughType::ParadigmShift) {
            IntelligenceType::ParadigmShifter
        } else if index.has_breakthrough(doc, BreakthroughType::KnowledgeHub) {
            IntelligenceType::KnowledgeHub
        } else if index.has_breakthrough(doc, BreakthroughType::ThemeBridge) {
            IntelligenceType::Connector
        } else if index.insights_of(doc).len() >= self.config.insight_generator_min {
            IntelligenceType::InsightGenerator
        } else if scores.convergence > self.config.convergence_point_cutoff {
            IntelligenceType::ConvergencePoint
        } else {
            IntelligenceType::from_analysis_type(index.documents[doc].analysis_type)
        }
    }
}
