//! Types produced by convergence analysis

use crate::document::{Document, DocumentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Namespace for deterministic chain and theme identifiers.
const ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_93d8_4b57_a0c2_5e7d_19f3_8b64);

fn derive_id(kind: &str, members: &[DocumentId]) -> Uuid {
    let mut name = String::from(kind);
    for id in members {
        name.push('\u{1f}');
        name.push_str(id.as_str());
    }
    Uuid::new_v5(&ID_NAMESPACE, name.as_bytes())
}

/// Identifier of a convergence chain, stable for a given participant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(Uuid);

impl ChainId {
    pub fn for_participants(participants: &[DocumentId]) -> Self {
        Self(derive_id("chain", participants))
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a theme, stable for a given kind and member set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeId(Uuid);

impl ThemeId {
    pub fn for_members(kind: ThemeKind, members: &[DocumentId]) -> Self {
        Self(derive_id(kind.as_str(), members))
    }
}

impl std::fmt::Display for ThemeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First and last participant timestamps of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub span_days: f64,
}

impl TemporalSpan {
    pub fn from_timestamps(timestamps: impl IntoIterator<Item = DateTime<Utc>>) -> Option<Self> {
        let mut iter = timestamps.into_iter();
        let first = iter.next()?;
        let (start, end) = iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        let span_days = (end - start).num_seconds() as f64 / 86_400.0;
        Some(Self {
            start,
            end,
            span_days,
        })
    }
}

/// A tightly converging group of documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceChain {
    pub chain_id: ChainId,
    /// Most frequent category shared by participants
    pub theme: String,
    /// Mean pairwise similarity of participants, in [0, 1]
    pub strength: f64,
    /// Participants in input order
    pub participants: Vec<DocumentId>,
    /// Participant with the highest summed similarity to the others
    pub center_document: DocumentId,
    pub temporal_span: TemporalSpan,
    /// Every category carried by a participant, most frequent first
    pub keywords: Vec<String>,
    /// Corpus indices of the participants
    #[serde(skip)]
    pub(crate) members: Vec<usize>,
}

impl ConvergenceChain {
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.participants.contains(id)
    }

    pub fn member_indices(&self) -> &[usize] {
        &self.members
    }
}

/// Emergent themes come from unchained documents; cross-chain themes span chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeKind {
    Emergent,
    CrossChain,
}

impl ThemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergent => "emergent",
            Self::CrossChain => "cross-chain",
        }
    }
}

/// A weaker or cross-cutting grouping of documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub theme_id: ThemeId,
    pub name: String,
    pub kind: ThemeKind,
    pub strength: f64,
    pub members: Vec<DocumentId>,
    pub keywords: Vec<String>,
    /// Chains bridged by a cross-chain theme; empty for emergent themes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chains: Vec<ChainId>,
    #[serde(skip)]
    pub(crate) member_indices: Vec<usize>,
}

impl Theme {
    pub fn is_cross_chain(&self) -> bool {
        self.kind == ThemeKind::CrossChain
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.members.contains(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    StrongConvergence,
    TemporalEvolution,
    EmergentTheme,
    CrossDomainConvergence,
    KnowledgeHub,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongConvergence => "strong_convergence",
            Self::TemporalEvolution => "temporal_evolution",
            Self::EmergentTheme => "emergent_theme",
            Self::CrossDomainConvergence => "cross_domain_convergence",
            Self::KnowledgeHub => "knowledge_hub",
        }
    }
}

/// A typed, confidence-scored observation about part of the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub content: String,
    pub confidence: f64,
    /// Basis documents; never empty
    pub related_files: Vec<DocumentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakthroughType {
    ParadigmShift,
    KnowledgeHub,
    ThemeBridge,
    ConvergenceCenter,
    ConvergenceStart,
}

impl BreakthroughType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParadigmShift => "paradigm_shift",
            Self::KnowledgeHub => "knowledge_hub",
            Self::ThemeBridge => "theme_bridge",
            Self::ConvergenceCenter => "convergence_center",
            Self::ConvergenceStart => "convergence_start",
        }
    }
}

/// A flagged document event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakthrough {
    #[serde(rename = "type")]
    pub breakthrough_type: BreakthroughType,
    pub document_id: DocumentId,
    pub description: String,
    /// Normalized impact in [0, 1]
    pub impact: f64,
    /// Chain the tag refers to, for centers and starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
}

/// Everything convergence analysis produced for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceAnalysis {
    pub chains: Vec<ConvergenceChain>,
    pub themes: Vec<Theme>,
    pub insights: Vec<Insight>,
    pub breakthroughs: Vec<Breakthrough>,
}

impl ConvergenceAnalysis {
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
            && self.themes.is_empty()
            && self.insights.is_empty()
            && self.breakthroughs.is_empty()
    }
}

/// Most frequent category shared by `members`, ties broken lexicographically.
///
/// Each document counts a category once. With more than one member the
/// category must be carried by at least two of them.
pub fn dominant_category<'a>(members: impl IntoIterator<Item = &'a Document>) -> Option<String> {
    let (ranked, member_count) = category_counts(members);
    ranked
        .into_iter()
        .next()
        .filter(|&(_, count)| count >= 2 || member_count == 1)
        .map(|(key, _)| key.to_string())
}

/// Categories of `members` ordered by frequency (descending), then name.
pub fn ranked_categories<'a>(members: impl IntoIterator<Item = &'a Document>) -> Vec<String> {
    category_counts(members)
        .0
        .into_iter()
        .map(|(key, _)| key.to_string())
        .collect()
}

fn category_counts<'a>(members: impl IntoIterator<Item = &'a Document>) -> (Vec<(&'a str, usize)>, usize) {
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    let mut member_count = 0;
    for doc in members {
        member_count += 1;
        for key in &doc.categories {
            *counts.entry(key.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    (ranked, member_count)
}
