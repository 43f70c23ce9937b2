//! SimilarityGraph: lazy pairwise similarity over a validated corpus
//!
//! The graph never materializes an N×N matrix. Every query resolves the
//! pair through the [`SimilarityCache`], trading repeat lookups for memory.
//! Zero-norm documents have similarity 0 to everything and never count as
//! neighbors, whatever the threshold.

use super::cache::{cosine_similarity, PairKey, SimilarityCache, SimilarityError};
use crate::document::Document;

/// Similarity view over a corpus of equal-dimension documents.
pub struct SimilarityGraph<'a> {
    documents: &'a [Document],
    cache: &'a SimilarityCache,
}

impl<'a> SimilarityGraph<'a> {
    /// Build a graph, checking that every embedding shares one dimension.
    pub fn new(documents: &'a [Document], cache: &'a SimilarityCache) -> Result<Self, SimilarityError> {
        if let Some(first) = documents.first() {
            for doc in documents {
                if doc.embedding.is_empty() {
                    return Err(SimilarityError::MissingEmbedding(doc.id.to_string()));
                }
                if doc.dimension() != first.dimension() {
                    return Err(SimilarityError::DimensionMismatch {
                        left: first.id.to_string(),
                        left_dim: first.dimension(),
                        right: doc.id.to_string(),
                        right_dim: doc.dimension(),
                    });
                }
            }
        }
        Ok(Self { documents, cache })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &'a [Document] {
        self.documents
    }

    pub fn document(&self, index: usize) -> &'a Document {
        &self.documents[index]
    }

    /// Similarity between documents `i` and `j`. A document is not its own neighbor: `i == j` yields 0.
    pub fn similarity(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let (a, b) = (&self.documents[i], &self.documents[j]);
        if a.is_zero_norm() || b.is_zero_norm() {
            return 0.0;
        }
        self.cache
            .get_or_insert_with(PairKey::for_documents(a, b), || {
                cosine_similarity(&a.embedding, &b.embedding)
            })
    }

    /// Whether the edge (i, j) qualifies at `threshold`.
    pub fn is_edge(&self, i: usize, j: usize, threshold: f64) -> bool {
        i != j
            && !self.documents[i].is_zero_norm()
            && !self.documents[j].is_zero_norm()
            && self.similarity(i, j) >= threshold
    }

    /// Indices of documents whose similarity to `i` is at least `threshold`, in input order.
    pub fn neighbors(&self, i: usize, threshold: f64) -> Vec<usize> {
        self.neighbors_within(i, threshold, None)
    }

    /// Like [`neighbors`](Self::neighbors) but restricted to `allowed` indices.
    pub fn neighbors_within(&self, i: usize, threshold: f64, allowed: Option<&[bool]>) -> Vec<usize> {
        (0..self.documents.len())
            .filter(|&j| allowed.map_or(true, |mask| mask[j]))
            .filter(|&j| self.is_edge(i, j, threshold))
            .collect()
    }

    /// Mean similarity over every unordered pair of `members`, clamped to [0, 1].
    pub fn mean_pairwise_similarity(&self, members: &[usize]) -> f64 {
        if members.len() < 2 {
            return 0.0;
        }
        let mut total = 0.0;
        let mut pairs = 0usize;
        for (pos, &i) in members.iter().enumerate() {
            for &j in &members[pos + 1..] {
                total += self.similarity(i, j);
                pairs += 1;
            }
        }
        (total / pairs as f64).clamp(0.0, 1.0)
    }

    /// Sum of similarity from `i` to every other member.
    pub fn weighted_degree(&self, i: usize, members: &[usize]) -> f64 {
        members
            .iter()
            .filter(|&&j| j != i)
            .map(|&j| self.similarity(i, j))
            .sum()
    }

    /// Connected components over edges at `threshold`, restricted to `allowed`.
    ///
    /// Depth-first traversal in input order; each component lists its
    /// members sorted by input index.
    pub fn components(&self, threshold: f64, allowed: Option<&[bool]>) -> Vec<Vec<usize>> {
        let n = self.documents.len();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n {
            if visited[start] || !allowed.map_or(true, |mask| mask[start]) {
                continue;
            }
            visited[start] = true;
            let mut component = vec![start];
            let mut stack = vec![start];

            while let Some(node) = stack.pop() {
                for next in self.neighbors_within(node, threshold, allowed) {
                    if !visited[next] {
                        visited[next] = true;
                        component.push(next);
                        stack.push(next);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        components
    }
}
