//! Per-document lookup over one run's analysis

use crate::analysis::{BreakthroughType, ConvergenceAnalysis};
use crate::document::{Document, DocumentId};
use std::collections::HashMap;

/// Which chains, themes, insights and breakthroughs touch each document.
///
/// Built once per run; every list holds indices into the corresponding
/// [`ConvergenceAnalysis`] vector, in emission order.
pub struct AnalysisIndex<'a> {
    pub(crate) documents: &'a [Document],
    pub(crate) analysis: &'a ConvergenceAnalysis,
    chains: Vec<Vec<usize>>,
    cross_chain_themes: Vec<Vec<usize>>,
    insights: Vec<Vec<usize>>,
    breakthroughs: Vec<Vec<usize>>,
}

impl<'a> AnalysisIndex<'a> {
    pub fn new(documents: &'a [Document], analysis: &'a ConvergenceAnalysis) -> Self {
        let n = documents.len();
        let position: HashMap<&DocumentId, usize> =
            documents.iter().enumerate().map(|(i, d)| (&d.id, i)).collect();

        let mut chains = vec![Vec::new(); n];
        for (c, chain) in analysis.chains.iter().enumerate() {
            for &i in chain.member_indices() {
                chains[i].push(c);
            }
        }

        let mut cross_chain_themes = vec![Vec::new(); n];
        for (t, theme) in analysis.themes.iter().enumerate() {
            if theme.is_cross_chain() {
                for &i in &theme.member_indices {
                    cross_chain_themes[i].push(t);
                }
            }
        }

        let mut insights = vec![Vec::new(); n];
        for (k, insight) in analysis.insights.iter().enumerate() {
            for id in &insight.related_files {
                if let Some(&i) = position.get(id) {
                    if insights[i].last() != Some(&k) {
                        insights[i].push(k);
                    }
                }
            }
        }

        let mut breakthroughs = vec![Vec::new(); n];
        for (b, breakthrough) in analysis.breakthroughs.iter().enumerate() {
            if let Some(&i) = position.get(&breakthrough.document_id) {
                breakthroughs[i].push(b);
            }
        }

        Self {
            documents,
            analysis,
            chains,
            cross_chain_themes,
            insights,
            breakthroughs,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn chains_of(&self, index: usize) -> &[usize] {
        &self.chains[index]
    }

    pub fn cross_chain_themes_of(&self, index: usize) -> &[usize] {
        &self.cross_chain_themes[index]
    }

    pub fn insights_of(&self, index: usize) -> &[usize] {
        &self.insights[index]
    }

    pub fn breakthroughs_of(&self, index: usize) -> &[usize] {
        &self.breakthroughs[index]
    }

    pub fn has_breakthrough(&self, index: usize, kind: BreakthroughType) -> bool {
        self.breakthroughs[index]
            .iter()
            .any(|&b| self.analysis.breakthroughs[b].breakthrough_type == kind)
    }
}
