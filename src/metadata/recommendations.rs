//! Threshold rules that turn run metrics into recommendations

use super::types::{KnowledgeMetadata, Priority, Recommendation, RecommendationType};
use crate::config::RecommendationConfig;

/// Emit recommendations for `metadata`, highest priority first.
///
/// An empty corpus gets none.
pub fn recommend(
    metadata: &KnowledgeMetadata,
    emergent_themes: usize,
    config: &RecommendationConfig,
) -> Vec<Recommendation> {
    let summary = &metadata.summary;
    let graph = &metadata.knowledge_graph;
    let skipped = metadata.data_quality.skipped_documents;
    let mut out = Vec::new();

    if skipped > 0 {
        out.push(Recommendation {
            recommendation_type: RecommendationType::SkippedDocuments,
            priority: Priority::High,
            description: format!(
                "{} document(s) were skipped; fix their embeddings or categories and re-run",
                skipped
            ),
        });
    }

    if summary.total_documents == 0 {
        return out;
    }

    if summary.total_chains == 0 {
        out.push(Recommendation {
            recommendation_type: RecommendationType::NoConvergenceChains,
            priority: Priority::High,
            description: "No convergence chains formed; consider lowering the similarity threshold".into(),
        });
    }

    if graph.knowledge_hubs == 0 {
        out.push(Recommendation {
            recommendation_type: RecommendationType::NoKnowledgeHubs,
            priority: Priority::Medium,
            description: "No knowledge hubs found; connections are spread evenly across chains".into(),
        });
    }

    let isolated_share = graph.isolated_nodes as f64 / graph.nodes as f64;
    if isolated_share > config.isolated_ratio {
        out.push(Recommendation {
            recommendation_type: RecommendationType::IsolatedDocuments,
            priority: Priority::Medium,
            description: format!(
                "{:.0}% of documents belong to no chain; related material may be missing",
                isolated_share * 100.0
            ),
        });
    }

    if graph.nodes >= 2 && graph.density < config.low_density {
        out.push(Recommendation {
            recommendation_type: RecommendationType::SparseConnectivity,
            priority: Priority::Low,
            description: format!("Graph density is {:.3}; knowledge is weakly interlinked", graph.density),
        });
    }

    if summary.average_intelligence_score < config.low_intelligence {
        out.push(Recommendation {
            recommendation_type: RecommendationType::LowIntelligence,
            priority: Priority::Low,
            description: format!(
                "Average intelligence score is {:.1}; few documents carry convergence or breakthroughs",
                summary.average_intelligence_score
            ),
        });
    }

    if emergent_themes > 0 {
        out.push(Recommendation {
            recommendation_type: RecommendationType::EmergentThemes,
            priority: Priority::Low,
            description: format!(
                "{} emergent theme(s) may grow into chains as more documents arrive",
                emergent_themes
            ),
        });
    }

    out.sort_by_key(|r| (r.priority, r.recommendation_type));
    out
}
