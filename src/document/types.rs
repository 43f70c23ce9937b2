//! Document types: validated input, enumerations, enriched output

use crate::analysis::{Breakthrough, ChainId, Insight};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for a document
///
/// Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for DocumentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DocumentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Discrete classification assigned to a document before enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum AnalysisType {
    Breakthrough,
    ConceptualEvolution,
    DecisivePoint,
    StrategicInsight,
    /// Neutral default; never counts as a paradigm shift
    #[default]
    GeneralLearning,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 5] = [
        AnalysisType::Breakthrough,
        AnalysisType::ConceptualEvolution,
        AnalysisType::DecisivePoint,
        AnalysisType::StrategicInsight,
        AnalysisType::GeneralLearning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakthrough => "Breakthrough",
            Self::ConceptualEvolution => "ConceptualEvolution",
            Self::DecisivePoint => "DecisivePoint",
            Self::StrategicInsight => "StrategicInsight",
            Self::GeneralLearning => "GeneralLearning",
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::GeneralLearning)
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `Breakthrough`, `decisive_point`, `Strategic Insight`, `general-learning`...
impl FromStr for AnalysisType {
    type Err = InputValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "breakthrough" => Ok(Self::Breakthrough),
            "conceptualevolution" => Ok(Self::ConceptualEvolution),
            "decisivepoint" => Ok(Self::DecisivePoint),
            "strategicinsight" => Ok(Self::StrategicInsight),
            "generallearning" => Ok(Self::GeneralLearning),
            _ => Err(InputValidationError::UnknownAnalysisType(s.to_string())),
        }
    }
}

/// Structural role of a document in the corpus knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntelligenceType {
    ParadigmShifter,
    KnowledgeHub,
    Connector,
    InsightGenerator,
    ConvergencePoint,
    TechnicalInnovation,
    ConceptualEvolution,
    DecisionPoint,
    StrategicInsight,
    KnowledgePiece,
}

impl IntelligenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParadigmShifter => "paradigm_shifter",
            Self::KnowledgeHub => "knowledge_hub",
            Self::Connector => "connector",
            Self::InsightGenerator => "insight_generator",
            Self::ConvergencePoint => "convergence_point",
            Self::TechnicalInnovation => "technical_innovation",
            Self::ConceptualEvolution => "conceptual_evolution",
            Self::DecisionPoint => "decision_point",
            Self::StrategicInsight => "strategic_insight",
            Self::KnowledgePiece => "knowledge_piece",
        }
    }

    /// Fixed fallback lookup from the input classification.
    pub fn from_analysis_type(analysis_type: AnalysisType) -> Self {
        match analysis_type {
            AnalysisType::Breakthrough => Self::TechnicalInnovation,
            AnalysisType::ConceptualEvolution => Self::ConceptualEvolution,
            AnalysisType::DecisivePoint => Self::DecisionPoint,
            AnalysisType::StrategicInsight => Self::StrategicInsight,
            AnalysisType::GeneralLearning => Self::KnowledgePiece,
        }
    }
}

impl std::fmt::Display for IntelligenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a record was excluded at ingestion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputValidationError {
    #[error("document id is empty")]
    EmptyId,

    #[error("duplicate document id")]
    DuplicateId,

    #[error("missing embedding")]
    MissingEmbedding,

    #[error("embedding is empty")]
    EmptyEmbedding,

    #[error("embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("embedding value at index {index} is not a finite number")]
    NonFiniteEmbedding { index: usize },

    #[error("category at position {position} has neither a name nor an id")]
    InvalidCategory { position: usize },

    #[error("unknown analysis type: {0}")]
    UnknownAnalysisType(String),
}

/// A document skipped during a run, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentError {
    pub document_id: DocumentId,
    pub reason: String,
}

impl DocumentError {
    pub fn new(document_id: impl Into<DocumentId>, reason: impl std::fmt::Display) -> Self {
        Self {
            document_id: document_id.into(),
            reason: reason.to_string(),
        }
    }
}

/// A validated document ready for convergence analysis.
///
/// Categories are already normalized keys. The embedding fingerprint keys
/// the similarity cache so a re-embedded document never hits a stale entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub embedding: Vec<f32>,
    pub categories: Vec<String>,
    pub analysis_type: AnalysisType,
    fingerprint: u64,
    norm: f64,
}

impl Document {
    /// Build a document, rejecting empty ids and empty or non-finite embeddings.
    pub fn try_new(
        id: impl Into<DocumentId>,
        name: impl Into<String>,
        timestamp: DateTime<Utc>,
        embedding: Vec<f32>,
    ) -> Result<Self, InputValidationError> {
        let id = id.into();
        if id.as_str().trim().is_empty() {
            return Err(InputValidationError::EmptyId);
        }
        if embedding.is_empty() {
            return Err(InputValidationError::EmptyEmbedding);
        }
        if let Some(index) = embedding.iter().position(|v| !v.is_finite()) {
            return Err(InputValidationError::NonFiniteEmbedding { index });
        }

        let norm = embedding
            .iter()
            .map(|v| f64::from(*v) * f64::from(*v))
            .sum::<f64>()
            .sqrt();
        let fingerprint = fingerprint(&embedding);

        Ok(Self {
            id,
            name: name.into(),
            timestamp,
            embedding,
            categories: Vec::new(),
            analysis_type: AnalysisType::default(),
            fingerprint,
            norm,
        })
    }

    /// Set categories from raw labels, normalizing and de-duplicating them.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories.clear();
        for raw in categories {
            if let Some(key) = super::normalize_category_key(raw.as_ref()) {
                if !self.categories.contains(&key) {
                    self.categories.push(key);
                }
            }
        }
        self
    }

    pub fn with_analysis_type(mut self, analysis_type: AnalysisType) -> Self {
        self.analysis_type = analysis_type;
        self
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Euclidean norm of the embedding
    pub fn norm(&self) -> f64 {
        self.norm
    }

    pub fn is_zero_norm(&self) -> bool {
        self.norm == 0.0
    }

    /// Hash of the embedding bits
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

fn fingerprint(embedding: &[f32]) -> u64 {
    let mut hasher = DefaultHasher::new();
    embedding.len().hash(&mut hasher);
    for v in embedding {
        // Collapse -0.0 onto 0.0 so equal vectors hash equally
        let bits = if *v == 0.0 { 0u32 } else { v.to_bits() };
        bits.hash(&mut hasher);
    }
    hasher.finish()
}

/// Named relation lists derived from chain and theme membership.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicates {
    /// Other participants of the document's chains
    pub converges_with: Vec<DocumentId>,
    /// Chain participants that come after this document
    pub influences: Vec<DocumentId>,
    /// Chain participants that came before this document
    pub evolves_from: Vec<DocumentId>,
    /// Later chain participants flagged as paradigm shifts
    pub enables_breakthrough: Vec<DocumentId>,
    /// Chain theme labels bridged through cross-chain themes
    pub connects_themes: Vec<String>,
}

impl Predicates {
    pub fn is_empty(&self) -> bool {
        self.converges_with.is_empty()
            && self.influences.is_empty()
            && self.evolves_from.is_empty()
            && self.enables_breakthrough.is_empty()
            && self.connects_themes.is_empty()
    }
}

/// A document after one enrichment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedDocument {
    pub id: DocumentId,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub analysis_type: AnalysisType,
    pub categories: Vec<String>,
    pub embedding: Vec<f32>,
    pub convergence_score: f64,
    pub impact_score: f64,
    pub intelligence_score: f64,
    pub intelligence_type: IntelligenceType,
    pub convergence_chains: Vec<ChainId>,
    pub insights: Vec<Insight>,
    pub breakthroughs: Vec<Breakthrough>,
    pub predicates: Predicates,
}
