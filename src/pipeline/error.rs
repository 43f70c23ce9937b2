use crate::config::ConfigError;
use crate::graph::SimilarityError;
use thiserror::Error;

/// Errors that abort a whole run.
///
/// Per-document problems never surface here; they are reported in
/// [`RunStats::errors`](super::RunStats::errors).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("similarity computation failed: {0}")]
    Similarity(#[from] SimilarityError),
}

pub type EngineResult<T> = Result<T, EngineError>;
