//! Engine configuration
//!
//! Every threshold, size policy and weighting the engine uses lives here,
//! in one immutable object handed to the pipeline at construction.
//! Defaults follow the documented behavior: chains at similarity 0.70 with
//! at least three participants, micro-clusters at 80% of that threshold,
//! hubs at twice the average connection count, chunks of 50 documents.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Fatal configuration problems. Never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: usize,
        value: usize,
    },

    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("score weights must be non-negative and not all zero")]
    InvalidWeights,

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Convergence chain detection policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Minimum cosine similarity for an edge to be followed
    pub similarity_threshold: f64,
    /// Smallest connected set kept as a chain
    pub min_chain_length: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.70,
            min_chain_length: 3,
        }
    }
}

/// Emergent and cross-chain theme discovery policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Explicit micro-cluster threshold; derived from the chain threshold when absent
    pub micro_cluster_threshold: Option<f64>,
    /// Ratio applied to the chain threshold when no explicit threshold is set
    pub micro_cluster_ratio: f64,
    /// Smallest micro-cluster kept as an emergent theme
    pub min_theme_size: usize,
    /// Number of representative keywords kept per theme
    pub max_keywords: usize,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            micro_cluster_threshold: None,
            micro_cluster_ratio: 0.8,
            min_theme_size: 2,
            max_keywords: 5,
        }
    }
}

/// Insight emission cutoffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Chain strength at or above which a strong-convergence insight fires
    pub strong_convergence_cutoff: f64,
    /// Chain span (days) that must be exceeded for a temporal-evolution insight
    pub temporal_materiality_days: f64,
    /// Span (days) at which temporal confidence stops growing
    pub temporal_saturation_days: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            strong_convergence_cutoff: 0.85,
            temporal_materiality_days: 7.0,
            temporal_saturation_days: 30.0,
        }
    }
}

/// Breakthrough detection policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakthroughConfig {
    /// A document is a hub when its connections exceed this multiple of the corpus average
    pub hub_multiplier: f64,
    /// Impact assigned to a confirmed paradigm shift
    pub paradigm_shift_impact: f64,
    /// Fraction of chain strength assigned to the chain's chronological origin
    pub origin_impact_factor: f64,
}

impl Default for BreakthroughConfig {
    fn default() -> Self {
        Self {
            hub_multiplier: 2.0,
            paradigm_shift_impact: 0.9,
            origin_impact_factor: 0.8,
        }
    }
}

/// Weights of the intelligence score.
///
/// The score is the weighted mean of the convergence score, the impact
/// score and an insight component (attached insights × `insight_unit`,
/// capped at 100). The default is an equal convergence/impact split with
/// insights carrying no weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub convergence: f64,
    pub impact: f64,
    pub insight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            convergence: 0.5,
            impact: 0.5,
            insight: 0.0,
        }
    }
}

/// Per-document scoring and classification policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    /// Points contributed by each attached insight to the insight component
    pub insight_unit: f64,
    /// Attached insights needed for the insight_generator type
    pub insight_generator_min: usize,
    /// Convergence score above which a document is a convergence point
    pub convergence_point_cutoff: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            insight_unit: 25.0,
            insight_generator_min: 2,
            convergence_point_cutoff: 80.0,
        }
    }
}

/// Similarity cache sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached pairs; oldest entries are evicted first
    pub capacity: usize,
    /// Optional entry lifetime in seconds
    pub ttl_seconds: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 2000,
            ttl_seconds: None,
        }
    }
}

/// Chunking of batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { batch_size: 50 }
    }
}

/// Retry policy for transient embedding-provider failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 500,
        }
    }
}

/// Thresholds behind the metadata recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Graph density below which sparse connectivity is flagged
    pub low_density: f64,
    /// Share of unchained documents above which isolation is flagged
    pub isolated_ratio: f64,
    /// Mean intelligence score below which weak enrichment is flagged
    pub low_intelligence: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            low_density: 0.05,
            isolated_ratio: 0.5,
            low_intelligence: 30.0,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Expected embedding dimension; inferred from the first embedded record when absent
    pub embedding_dimension: Option<usize>,
    pub chains: ChainConfig,
    pub themes: ThemeConfig,
    pub insights: InsightConfig,
    pub breakthroughs: BreakthroughConfig,
    pub scoring: ScoringConfig,
    pub cache: CacheConfig,
    pub batch: BatchConfig,
    pub retry: RetryConfig,
    pub recommendations: RecommendationConfig,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.chains.similarity_threshold = threshold;
        self
    }

    pub fn with_min_chain_length(mut self, len: usize) -> Self {
        self.chains.min_chain_length = len;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch.batch_size = size;
        self
    }

    pub fn with_score_weights(mut self, weights: ScoreWeights) -> Self {
        self.scoring.weights = weights;
        self
    }

    pub fn with_embedding_dimension(mut self, dimension: usize) -> Self {
        self.embedding_dimension = Some(dimension);
        self
    }

    /// Threshold used for emergent micro-clusters.
    pub fn micro_cluster_threshold(&self) -> f64 {
        self.themes
            .micro_cluster_threshold
            .unwrap_or(self.chains.similarity_threshold * self.themes.micro_cluster_ratio)
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit("chains.similarity_threshold", self.chains.similarity_threshold)?;
        if let Some(t) = self.themes.micro_cluster_threshold {
            unit("themes.micro_cluster_threshold", t)?;
        }
        unit("insights.strong_convergence_cutoff", self.insights.strong_convergence_cutoff)?;
        unit("breakthroughs.paradigm_shift_impact", self.breakthroughs.paradigm_shift_impact)?;
        unit("breakthroughs.origin_impact_factor", self.breakthroughs.origin_impact_factor)?;
        unit("recommendations.low_density", self.recommendations.low_density)?;
        unit("recommendations.isolated_ratio", self.recommendations.isolated_ratio)?;

        let ratio = self.themes.micro_cluster_ratio;
        if !(ratio.is_finite() && ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::OutOfUnitRange {
                field: "themes.micro_cluster_ratio",
                value: ratio,
            });
        }

        at_least("chains.min_chain_length", self.chains.min_chain_length, 1)?;
        at_least("themes.min_theme_size", self.themes.min_theme_size, 1)?;
        at_least("batch.batch_size", self.batch.batch_size, 1)?;
        at_least("cache.capacity", self.cache.capacity, 1)?;
        at_least("retry.max_attempts", self.retry.max_attempts as usize, 1)?;
        if let Some(dim) = self.embedding_dimension {
            at_least("embedding_dimension", dim, 1)?;
        }

        positive("breakthroughs.hub_multiplier", self.breakthroughs.hub_multiplier)?;
        positive("insights.temporal_saturation_days", self.insights.temporal_saturation_days)?;
        positive("scoring.insight_unit", self.scoring.insight_unit)?;
        non_negative(
            "insights.temporal_materiality_days",
            self.insights.temporal_materiality_days,
        )?;
        non_negative(
            "scoring.convergence_point_cutoff",
            self.scoring.convergence_point_cutoff,
        )?;
        non_negative(
            "recommendations.low_intelligence",
            self.recommendations.low_intelligence,
        )?;

        let w = &self.scoring.weights;
        let weights = [w.convergence, w.impact, w.insight];
        if weights.iter().any(|v| !v.is_finite() || *v < 0.0) || weights.iter().sum::<f64>() <= 0.0
        {
            return Err(ConfigError::InvalidWeights);
        }

        Ok(())
    }
}

fn unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

fn at_least(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::TooSmall { field, min, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
