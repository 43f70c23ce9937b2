//! ConvergencePipeline: runs every stage over one batch

use super::embedding::{EmbeddingProvider, EmbeddingStage};
use super::error::EngineResult;
use super::progress::{notify, ProgressObserver, ProgressUpdate};
use crate::analysis::{
    BreakthroughDetector, ConnectionProfile, ConvergenceAnalysis, ConvergenceChainDetector, InsightGenerator,
    ThemeIdentifier,
};
use crate::config::EngineConfig;
use crate::document::{ingest, Document, DocumentError, DocumentRecord, EnrichedDocument};
use crate::enrichment::{AnalysisIndex, ScoreEnrichmentEngine};
use crate::graph::{CacheStats, SimilarityCache, SimilarityGraph};
use crate::metadata::{KnowledgeMetadata, KnowledgeMetadataAggregator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Counters describing one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Records handed to the run
    pub received: usize,
    /// Documents enriched
    pub processed: usize,
    /// Records excluded; equals `errors.len()`
    pub skipped: usize,
    pub errors: Vec<DocumentError>,
    pub chains: usize,
    pub themes: usize,
    pub insights: usize,
    pub breakthroughs: usize,
    /// Cumulative counters of the pipeline's cache after the run
    pub cache: CacheStats,
    pub elapsed_ms: u64,
}

/// Everything a run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentOutcome {
    pub documents: Vec<EnrichedDocument>,
    pub metadata: KnowledgeMetadata,
    pub analysis: ConvergenceAnalysis,
    pub stats: RunStats,
}

/// Chunking and progress options for [`ConvergencePipeline::process_batch`].
#[derive(Default)]
pub struct BatchOptions<'a> {
    batch_size: Option<usize>,
    observer: Option<&'a mut dyn ProgressObserver>,
}

impl<'a> BatchOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the configured chunk size. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size.max(1));
        self
    }

    pub fn with_observer(mut self, observer: &'a mut dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// The enrichment engine.
///
/// Owns one validated configuration and one similarity cache. The cache
/// outlives runs and is cleared only through [`clear_cache`](Self::clear_cache);
/// separate pipelines never share a cache unless one is injected explicitly.
pub struct ConvergencePipeline {
    config: EngineConfig,
    cache: Arc<SimilarityCache>,
}

impl ConvergencePipeline {
    /// Validate `config` and create a pipeline with its own cache.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let mut cache = SimilarityCache::new(config.cache.capacity);
        if let Some(ttl) = config.cache.ttl_seconds {
            cache = cache.with_ttl(Duration::from_secs(ttl));
        }
        Ok(Self {
            config,
            cache: Arc::new(cache),
        })
    }

    /// Validate `config` and use an injected cache.
    pub fn with_cache(config: EngineConfig, cache: Arc<SimilarityCache>) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config, cache })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<SimilarityCache> {
        &self.cache
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Enrich a corpus in one pass.
    pub fn enrich_documents(&self, records: &[DocumentRecord]) -> EngineResult<EnrichmentOutcome> {
        let options = BatchOptions::new().with_batch_size(records.len());
        self.process_batch(records, options)
    }

    /// Enrich a corpus, reporting progress after every chunk.
    ///
    /// Chains, themes, insights and breakthroughs are always computed over
    /// the whole corpus; only per-document enrichment is chunked, so the
    /// result does not depend on the chunk size.
    pub fn process_batch(
        &self,
        records: &[DocumentRecord],
        options: BatchOptions<'_>,
    ) -> EngineResult<EnrichmentOutcome> {
        self.run(records, Vec::new(), records.len(), options)
    }

    /// Embed records lacking a vector, then run [`process_batch`](Self::process_batch).
    pub async fn enrich_with_provider(
        &self,
        records: Vec<DocumentRecord>,
        provider: &dyn EmbeddingProvider,
        options: BatchOptions<'_>,
    ) -> EngineResult<EnrichmentOutcome> {
        let received = records.len();
        let stage = EmbeddingStage::new(provider, &self.config.retry);
        let (ready, errors) = stage.fill(records).await;
        self.run(&ready, errors, received, options)
    }

    /// Chains, themes, insights and breakthroughs over validated documents.
    pub fn analyze(&self, documents: &[Document]) -> EngineResult<ConvergenceAnalysis> {
        let graph = SimilarityGraph::new(documents, &self.cache)?;

        let chains = ConvergenceChainDetector::new(&self.config.chains).detect(&graph);
        let themes = ThemeIdentifier::new(&self.config).identify(&graph, &chains);
        let connections =
            ConnectionProfile::new(documents.len(), &chains, self.config.breakthroughs.hub_multiplier);
        let insights = InsightGenerator::new(&self.config.insights).generate(&graph, &chains, &themes, &connections);
        let breakthroughs =
            BreakthroughDetector::new(&self.config.breakthroughs).detect(&graph, &chains, &themes, &connections);

        info!(
            documents = documents.len(),
            chains = chains.len(),
            themes = themes.len(),
            insights = insights.len(),
            breakthroughs = breakthroughs.len(),
            "convergence analysis complete"
        );

        Ok(ConvergenceAnalysis {
            chains,
            themes,
            insights,
            breakthroughs,
        })
    }

    fn run(
        &self,
        records: &[DocumentRecord],
        mut errors: Vec<DocumentError>,
        received: usize,
        options: BatchOptions<'_>,
    ) -> EngineResult<EnrichmentOutcome> {
        let started = Instant::now();
        let report = ingest(records, self.config.embedding_dimension);
        errors.extend(report.errors);
        let documents = report.documents;
        info!(
            received,
            valid = documents.len(),
            skipped = errors.len(),
            dimension = ?report.dimension,
            "ingested batch"
        );

        let analysis = self.analyze(&documents)?;

        let index = AnalysisIndex::new(&documents, &analysis);
        let engine = ScoreEnrichmentEngine::new(&self.config.scoring);
        let batch_size = options.batch_size.unwrap_or(self.config.batch.batch_size).max(1);
        let mut observer = options.observer;

        let total = documents.len();
        let total_chunks = total.div_ceil(batch_size);
        let mut enriched = Vec::with_capacity(total);
        for chunk_index in 0..total_chunks {
            let start = chunk_index * batch_size;
            let end = (start + batch_size).min(total);
            enriched.extend(engine.enrich_range(&index, start..end));
            debug!(chunk = chunk_index, start, end, "chunk enriched");

            if let Some(observer) = observer.as_deref_mut() {
                let update = ProgressUpdate {
                    percentage: 100.0 * end as f64 / total as f64,
                    chunk_range: (start, end),
                    chunk_index,
                    total_chunks,
                    message: format!("Enriched documents {}-{} of {}", start + 1, end, total),
                };
                notify(observer, &update);
            }
        }

        let aggregator = KnowledgeMetadataAggregator::new(&self.config.recommendations);
        let metadata = aggregator.aggregate(&enriched, &analysis, errors.len());

        let stats = RunStats {
            received,
            processed: enriched.len(),
            skipped: errors.len(),
            errors,
            chains: analysis.chains.len(),
            themes: analysis.themes.len(),
            insights: analysis.insights.len(),
            breakthroughs: analysis.breakthroughs.len(),
            cache: self.cache.stats(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            processed = stats.processed,
            skipped = stats.skipped,
            cache_hits = stats.cache.hits,
            cache_misses = stats.cache.misses,
            elapsed_ms = stats.elapsed_ms,
            "enrichment run complete"
        );

        Ok(EnrichmentOutcome {
            documents: enriched,
            metadata,
            analysis,
            stats,
        })
    }
}
