//! End-to-end properties of a single enrichment run

mod common;

use common::{random_corpus, CorpusBuilder};
use convergence::analysis::UNCATEGORIZED;
use convergence::graph::cosine_similarity;
use convergence::{
    BreakthroughType, ConvergencePipeline, Document, DocumentRecord, EngineConfig, EnrichmentOutcome,
    IntelligenceType, SimilarityCache, ThemeKind,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn run(records: &[DocumentRecord]) -> EnrichmentOutcome {
    ConvergencePipeline::new(EngineConfig::default())
        .unwrap()
        .enrich_documents(records)
        .unwrap()
}

fn doc<'a>(outcome: &'a EnrichmentOutcome, id: &str) -> &'a convergence::EnrichedDocument {
    outcome
        .documents
        .iter()
        .find(|d| d.id.as_str() == id)
        .unwrap_or_else(|| panic!("no document {}", id))
}

#[test]
fn similarity_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(7);
    let cache = SimilarityCache::new(64);
    let ts = "2025-01-01T00:00:00Z".parse().unwrap();
    let docs: Vec<Document> = (0..12)
        .map(|i| {
            let v: Vec<f32> = (0..8).map(|_| rng.gen_range(-1.0..1.0)).collect();
            Document::try_new(format!("d{}", i), "d", ts, v).unwrap()
        })
        .collect();

    for a in &docs {
        for b in &docs {
            let ab = cache.similarity(a, b).unwrap();
            let ba = cache.similarity(b, a).unwrap();
            assert_eq!(ab, ba);
            assert!((-1.0..=1.0).contains(&ab));
            assert!((ab - cosine_similarity(&b.embedding, &a.embedding)).abs() < 1e-12);
        }
    }
}

#[test]
fn scores_stay_in_range() {
    for seed in 0..5 {
        let outcome = run(&random_corpus(seed, 4, 6, 16));
        assert_eq!(outcome.stats.processed, 24);
        for d in &outcome.documents {
            for score in [d.convergence_score, d.impact_score, d.intelligence_score] {
                assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
            }
        }
        for insight in &outcome.analysis.insights {
            assert!((0.0..=1.0).contains(&insight.confidence));
            assert!(!insight.related_files.is_empty());
        }
        for b in &outcome.analysis.breakthroughs {
            assert!((0.0..=1.0).contains(&b.impact));
        }
    }
}

#[test]
fn chains_respect_min_length_and_are_disjoint() {
    for min in [2, 3, 5] {
        let pipeline = ConvergencePipeline::new(EngineConfig::default().with_min_chain_length(min)).unwrap();
        let outcome = pipeline.enrich_documents(&random_corpus(11, 5, 5, 12)).unwrap();
        let mut seen = std::collections::HashSet::new();
        for chain in &outcome.analysis.chains {
            assert!(chain.len() >= min);
            assert!((0.0..=1.0).contains(&chain.strength));
            for p in &chain.participants {
                assert!(seen.insert(p.clone()), "{} joined two chains", p);
            }
        }
    }
}

#[test]
fn enrichment_is_deterministic() {
    let records = random_corpus(3, 3, 7, 10);
    let first = run(&records);
    let second = run(&records);
    assert_eq!(first.analysis, second.analysis);
    assert_eq!(first.documents, second.documents);
    assert_eq!(first.metadata, second.metadata);
}

#[test]
fn three_similar_documents_form_one_chain() {
    let records = CorpusBuilder::new(8)
        .cluster("abc", 3, 0.3, "rust")
        .singleton("d")
        .singleton("e")
        .build();
    let outcome = run(&records);

    assert_eq!(outcome.analysis.chains.len(), 1);
    let chain = &outcome.analysis.chains[0];
    let ids: Vec<_> = chain.participants.iter().map(|p| p.as_str()).collect();
    assert_eq!(ids, vec!["abc1", "abc2", "abc3"]);
    assert_eq!(chain.theme, "rust");
    // 1 / (1 + 0.09)
    assert!((chain.strength - 1.0 / 1.09).abs() < 1e-6);
    assert_eq!(chain.temporal_span.span_days, 2.0);

    for id in ["d", "e"] {
        let d = doc(&outcome, id);
        assert!(d.convergence_chains.is_empty());
        assert_eq!(d.convergence_score, 0.0);
    }
    let a = doc(&outcome, "abc1");
    assert!((a.convergence_score - 100.0 / 1.09).abs() < 1e-4);
    assert_eq!(a.predicates.converges_with.len(), 2);
}

#[test]
fn sustained_type_change_flags_only_the_first_document() {
    let records = CorpusBuilder::new(4)
        .singleton("d1")
        .singleton("d2")
        .singleton("d3")
        .singleton("d4")
        .with_analysis_types(&["GeneralLearning", "Breakthrough", "Breakthrough", "GeneralLearning"])
        .build();
    let outcome = run(&records);

    let shifts: Vec<_> = outcome
        .analysis
        .breakthroughs
        .iter()
        .filter(|b| b.breakthrough_type == BreakthroughType::ParadigmShift)
        .map(|b| b.document_id.as_str())
        .collect();
    assert_eq!(shifts, vec!["d2"]);
    assert_eq!(doc(&outcome, "d2").intelligence_type, IntelligenceType::ParadigmShifter);
    assert!((doc(&outcome, "d2").impact_score - 90.0).abs() < 1e-9);
    assert_eq!(doc(&outcome, "d3").intelligence_type, IntelligenceType::TechnicalInnovation);
}

#[test]
fn empty_corpus_returns_zeroed_outcome() {
    let outcome = run(&[]);
    assert_eq!(outcome.stats.processed, 0);
    assert_eq!(outcome.stats.received, 0);
    assert!(outcome.documents.is_empty());
    assert!(outcome.analysis.chains.is_empty());
    assert!(outcome.analysis.themes.is_empty());
    assert!(outcome.analysis.insights.is_empty());
    assert_eq!(outcome.metadata.summary.average_intelligence_score, 0.0);
    assert_eq!(outcome.metadata.knowledge_graph.density, 0.0);
    assert!(outcome.metadata.recommendations.is_empty());
}

#[test]
fn zero_norm_document_joins_no_chain() {
    let records = CorpusBuilder::new(6).cluster("c", 3, 0.2, "ops").zero("nothing").build();
    let outcome = run(&records);

    assert_eq!(outcome.analysis.chains.len(), 1);
    assert!(!outcome.analysis.chains[0].participants.iter().any(|p| p.as_str() == "nothing"));

    let zero = doc(&outcome, "nothing");
    assert!(zero.convergence_chains.is_empty());
    assert_eq!(zero.convergence_score, 0.0);
    assert!(zero.intelligence_score.is_finite());

    let sim = cosine_similarity(&zero.embedding, &outcome.documents[0].embedding);
    assert_eq!(sim, 0.0);
}

#[test]
fn outsized_connection_count_is_a_knowledge_hub() {
    // Six-member chain among thirty documents: five connections each against an average of one
    let mut builder = CorpusBuilder::new(64).cluster("hub", 6, 0.2, "core");
    for i in 0..24 {
        builder = builder.singleton(&format!("s{}", i));
    }
    let outcome = run(&builder.build());

    let hubs: Vec<_> = outcome
        .analysis
        .breakthroughs
        .iter()
        .filter(|b| b.breakthrough_type == BreakthroughType::KnowledgeHub)
        .map(|b| b.document_id.as_str())
        .collect();
    assert_eq!(hubs, vec!["hub1", "hub2", "hub3", "hub4", "hub5", "hub6"]);
    assert_eq!(doc(&outcome, "hub1").intelligence_type, IntelligenceType::KnowledgeHub);
    assert_eq!(doc(&outcome, "hub1").impact_score, 100.0);
    assert_eq!(outcome.metadata.knowledge_graph.knowledge_hubs, 6);
    assert!(doc(&outcome, "s0").breakthroughs.is_empty());
}

#[test]
fn weaker_pairs_outside_chains_become_emergent_themes() {
    let records = CorpusBuilder::new(12)
        .cluster("c", 3, 0.2, "ops")
        .pair("p", 0.6, "notes")
        .pair("q", 0.4, "noise")
        .build();
    let outcome = run(&records);

    let emergent: Vec<_> = outcome
        .analysis
        .themes
        .iter()
        .filter(|t| t.kind == ThemeKind::Emergent)
        .collect();
    assert_eq!(emergent.len(), 1);
    assert_eq!(emergent[0].name, "notes");
    assert!((emergent[0].strength - 0.6).abs() < 1e-6);
    assert!(doc(&outcome, "q1").convergence_chains.is_empty());
}

#[test]
fn structured_categories_group_with_labels() {
    let json = serde_json::json!([
        { "id": "a", "timestamp": "2025-01-01T00:00:00Z", "embedding": [1.0, 0.1, 0.0, 0.0],
          "categories": [{ "id": 7, "name": "Infra" }] },
        { "id": "b", "timestamp": "2025-01-02T00:00:00Z", "embedding": [1.0, 0.0, 0.1, 0.0],
          "categories": ["infra"] },
        { "id": "c", "timestamp": "2025-01-03T00:00:00Z", "embedding": [1.0, 0.0, 0.0, 0.1],
          "categories": [{ "name": " INFRA " }] },
        { "id": "d", "timestamp": "2025-01-04T00:00:00Z", "embedding": [1.0, 0.1, 0.1, 0.0],
          "categories": [{}] }
    ]);
    let records: Vec<DocumentRecord> = serde_json::from_value(json).unwrap();
    let outcome = run(&records);

    assert_eq!(outcome.stats.skipped, 1);
    assert_eq!(outcome.stats.errors[0].document_id, "d");
    assert_eq!(outcome.analysis.chains.len(), 1);
    assert_eq!(outcome.analysis.chains[0].theme, "infra");
    assert_eq!(outcome.metadata.distribution.categories["infra"].count, 3);
}

#[test]
fn uncategorized_chain_gets_placeholder_theme() {
    let records: Vec<DocumentRecord> = CorpusBuilder::new(8)
        .cluster("c", 3, 0.2, "x")
        .build()
        .into_iter()
        .map(|mut r| {
            r.categories.clear();
            r
        })
        .collect();
    let outcome = run(&records);
    assert_eq!(outcome.analysis.chains[0].theme, UNCATEGORIZED);
}

#[test]
fn outcome_serializes_camel_case() {
    let records = CorpusBuilder::new(8).cluster("c", 3, 0.2, "ops").build();
    let json = serde_json::to_value(run(&records)).unwrap();
    let first = &json["documents"][0];
    assert!(first["convergenceScore"].is_number());
    assert!(first["intelligenceType"].is_string());
    assert!(first["predicates"]["convergesWith"].is_array());
    assert!(json["analysis"]["chains"][0]["centerDocument"].is_string());
    assert!(json["metadata"]["knowledgeGraph"]["density"].is_number());
    assert!(json["stats"]["cache"]["misses"].is_number());
}

#[test]
fn malformed_first_record_only_excludes_itself() {
    let mut records = vec![DocumentRecord::new("bad", common::day(0)).with_embedding(vec![1.0, f32::NAN])];
    records.extend(CorpusBuilder::new(6).cluster("c", 3, 0.2, "ops").singleton("x").singleton("y").build());

    let outcome = run(&records);
    assert_eq!(outcome.stats.processed, 5);
    assert_eq!(outcome.stats.skipped, 1);
    assert_eq!(outcome.stats.errors[0].document_id, "bad");
    assert_eq!(outcome.analysis.chains.len(), 1);
}
