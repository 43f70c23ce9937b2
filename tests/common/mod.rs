//! Shared fixtures for convergence integration tests
//!
//! Corpora are built from orthogonal axes so every pairwise similarity is
//! known in advance: cluster members share one axis and each owns a private
//! one, so `cos = 1 / (1 + spread²)` inside a cluster and 0 across clusters.

#![allow(dead_code, unused_imports)]

pub mod corpus;
pub mod providers;

pub use corpus::{day, random_corpus, CorpusBuilder};
pub use providers::{FlakyProvider, KeywordProvider};
