//! InsightGenerator: deterministic insight rules over chains and themes

use super::connections::ConnectionProfile;
use super::types::{ConvergenceChain, Insight, InsightType, Theme, ThemeKind};
use crate::config::InsightConfig;
use crate::document::DocumentId;
use crate::graph::SimilarityGraph;
use std::collections::HashSet;

pub struct InsightGenerator {
    config: InsightConfig,
}

impl InsightGenerator {
    pub fn new(config: &InsightConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Emit insights in rule order: chain rules, theme rules, hubs.
    ///
    /// Every insight lists at least one basis document, and no
    /// (type, basis set) pair is emitted twice.
    pub fn generate(
        &self,
        graph: &SimilarityGraph<'_>,
        chains: &[ConvergenceChain],
        themes: &[Theme],
        connections: &ConnectionProfile,
    ) -> Vec<Insight> {
        let mut emitter = InsightEmitter::default();

        for chain in chains {
            if chain.strength >= self.config.strong_convergence_cutoff {
                emitter.emit(
                    InsightType::StrongConvergence,
                    format!(
                        "{} documents converge strongly on '{}' (strength {:.2})",
                        chain.len(),
                        chain.theme,
                        chain.strength
                    ),
                    chain.strength,
                    chain.participants.clone(),
                );
            }

            let span = chain.temporal_span.span_days;
            if span > self.config.temporal_materiality_days {
                let persistence = (span / self.config.temporal_saturation_days).min(1.0);
                emitter.emit(
                    InsightType::TemporalEvolution,
                    format!(
                        "'{}' evolved over {:.1} days across {} documents",
                        chain.theme,
                        span,
                        chain.len()
                    ),
                    chain.strength * persistence,
                    chain.participants.clone(),
                );
            }
        }

        for theme in themes {
            match theme.kind {
                ThemeKind::Emergent => emitter.emit(
                    InsightType::EmergentTheme,
                    format!(
                        "Emerging theme '{}' links {} unchained documents",
                        theme.name,
                        theme.members.len()
                    ),
                    theme.strength,
                    theme.members.clone(),
                ),
                ThemeKind::CrossChain => emitter.emit(
                    InsightType::CrossDomainConvergence,
                    format!(
                        "'{}' bridges {} convergence chains",
                        theme.name,
                        theme.chains.len()
                    ),
                    theme.strength,
                    theme.members.clone(),
                ),
            }
        }

        for index in connections.hubs() {
            let doc = graph.document(index);
            emitter.emit(
                InsightType::KnowledgeHub,
                format!(
                    "'{}' holds {} chain connections ({:.1}x the corpus average)",
                    doc.name,
                    connections.count(index),
                    connections.count(index) as f64 / connections.average()
                ),
                connections.hub_confidence(index),
                vec![doc.id.clone()],
            );
        }

        emitter.insights
    }
}

#[derive(Default)]
struct InsightEmitter {
    insights: Vec<Insight>,
    seen: HashSet<(InsightType, Vec<DocumentId>)>,
}

impl InsightEmitter {
    fn emit(&mut self, insight_type: InsightType, content: String, confidence: f64, related: Vec<DocumentId>) {
        if related.is_empty() {
            return;
        }
        let mut key = related.clone();
        key.sort();
        if !self.seen.insert((insight_type, key)) {
            return;
        }
        self.insights.push(Insight {
            insight_type,
            content,
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
            related_files: related,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{ChainId, TemporalSpan, ThemeId};
    use crate::document::Document;
    use crate::graph::SimilarityCache;

    fn docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| {
                Document::try_new(
                    format!("d{}", i),
                    format!("Doc {}", i),
                    "2025-01-01T00:00:00Z".parse().unwrap(),
                    vec![1.0, i as f32],
                )
                .unwrap()
            })
            .collect()
    }

    fn chain(members: Vec<usize>, strength: f64, span_days: f64) -> ConvergenceChain {
        let participants: Vec<DocumentId> = members.iter().map(|i| DocumentId::from(format!("d{}", i))).collect();
        let start: chrono::DateTime<chrono::Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        ConvergenceChain {
            chain_id: ChainId::for_participants(&participants),
            theme: "topic".into(),
            strength,
            center_document: participants[0].clone(),
            participants,
            temporal_span: TemporalSpan {
                start,
                end: start + chrono::Duration::seconds((span_days * 86_400.0) as i64),
                span_days,
            },
            keywords: vec!["topic".into()],
            members,
        }
    }

    fn theme(kind: ThemeKind, members: Vec<usize>, strength: f64) -> Theme {
        let ids: Vec<DocumentId> = members.iter().map(|i| DocumentId::from(format!("d{}", i))).collect();
        Theme {
            theme_id: ThemeId::for_members(kind, &ids),
            name: "t".into(),
            kind,
            strength,
            members: ids,
            keywords: vec![],
            chains: vec![],
            member_indices: members,
        }
    }

    #[test]
    fn strong_and_temporal_chain_insights() {
        let corpus = docs(8);
        let cache = SimilarityCache::new(10);
        let graph = SimilarityGraph::new(&corpus, &cache).unwrap();
        let chains = vec![chain(vec![0, 1, 2], 0.9, 15.0), chain(vec![3, 4, 5], 0.75, 3.0)];
        let profile = ConnectionProfile::new(corpus.len(), &chains, 2.0);

        let insights = InsightGenerator::new(&InsightConfig::default()).generate(&graph, &chains, &[], &profile);
        let types: Vec<_> = insights.iter().map(|i| i.insight_type).collect();
        assert_eq!(types, vec![InsightType::StrongConvergence, InsightType::TemporalEvolution]);
        assert!((insights[0].confidence - 0.9).abs() < 1e-9);
        // 0.9 × 15/30
        assert!((insights[1].confidence - 0.45).abs() < 1e-9);
        assert!(insights.iter().all(|i| !i.related_files.is_empty()));
    }

    #[test]
    fn theme_insights_follow_kind() {
        let corpus = docs(6);
        let cache = SimilarityCache::new(10);
        let graph = SimilarityGraph::new(&corpus, &cache).unwrap();
        let themes = vec![
            theme(ThemeKind::Emergent, vec![0, 1], 0.6),
            theme(ThemeKind::CrossChain, vec![2, 3], 0.4),
        ];
        let profile = ConnectionProfile::new(corpus.len(), &[], 2.0);

        let insights = InsightGenerator::new(&InsightConfig::default()).generate(&graph, &[], &themes, &profile);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].insight_type, InsightType::EmergentTheme);
        assert_eq!(insights[1].insight_type, InsightType::CrossDomainConvergence);
    }

    #[test]
    fn hub_insight_for_outsized_connections() {
        let corpus = docs(30);
        let cache = SimilarityCache::new(10);
        let graph = SimilarityGraph::new(&corpus, &cache).unwrap();
        let chains = vec![chain((0..6).collect(), 0.5, 0.0)];
        let profile = ConnectionProfile::new(corpus.len(), &chains, 2.0);

        let insights = InsightGenerator::new(&InsightConfig::default()).generate(&graph, &chains, &[], &profile);
        let hubs: Vec<_> = insights
            .iter()
            .filter(|i| i.insight_type == InsightType::KnowledgeHub)
            .collect();
        assert_eq!(hubs.len(), 6);
        assert_eq!(hubs[0].related_files, vec![DocumentId::from("d0")]);
        assert!(hubs.iter().all(|h| h.confidence <= 1.0));
    }

    #[test]
    fn duplicate_type_and_basis_is_suppressed() {
        let mut emitter = InsightEmitter::default();
        let ids = vec![DocumentId::from("b"), DocumentId::from("a")];
        emitter.emit(InsightType::EmergentTheme, "one".into(), 0.5, ids.clone());
        emitter.emit(InsightType::EmergentTheme, "two".into(), 0.5, ids.into_iter().rev().collect());
        emitter.emit(InsightType::KnowledgeHub, "three".into(), 2.0, vec![]);
        assert_eq!(emitter.insights.len(), 1);
    }
}
