//! Similarity structures shared by every analysis stage

mod cache;
mod similarity;

pub use cache::{cosine_similarity, CacheStats, PairKey, SimilarityCache, SimilarityError};
pub use similarity::SimilarityGraph;
