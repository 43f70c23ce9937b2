//! Embedding stage: fills missing vectors through an external provider
//!
//! The provider is the only I/O-bound collaborator of a run. Transient
//! failures are retried a bounded number of times with a fixed delay;
//! anything else, or exhausting the attempts, excludes the record and
//! lets the batch continue.

use crate::config::RetryConfig;
use crate::document::{DocumentError, DocumentRecord};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbeddingError {
    #[error("embedding provider unavailable: {0}")]
    Unavailable(String),

    #[error("embedding request timed out")]
    Timeout,

    #[error("embedding returned no results")]
    EmptyResult,

    #[error("embedding model error: {0}")]
    Model(String),

    #[error("record has neither an embedding nor content to embed")]
    NoContent,
}

impl EmbeddingError {
    /// Whether a retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout)
    }
}

/// Turns text into a fixed-dimension vector.
///
/// Implementations are deterministic within one session.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Retry wrapper around an [`EmbeddingProvider`].
pub struct EmbeddingStage<'a> {
    provider: &'a dyn EmbeddingProvider,
    max_attempts: u32,
    backoff: Duration,
}

impl<'a> EmbeddingStage<'a> {
    pub fn new(provider: &'a dyn EmbeddingProvider, retry: &RetryConfig) -> Self {
        Self {
            provider,
            max_attempts: retry.max_attempts.max(1),
            backoff: Duration::from_millis(retry.backoff_ms),
        }
    }

    /// Embed `text`, retrying transient failures.
    pub async fn embed_with_retry(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut attempt = 1;
        loop {
            match self.provider.embed(text).await {
                Ok(vector) if vector.is_empty() => return Err(EmbeddingError::EmptyResult),
                Ok(vector) => return Ok(vector),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(attempt, max_attempts = self.max_attempts, error = %e, "retrying embedding");
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Fill in missing embeddings from each record's content.
    ///
    /// Records that already carry a vector pass through untouched. Records
    /// that cannot be embedded are dropped and reported.
    pub async fn fill(&self, records: Vec<DocumentRecord>) -> (Vec<DocumentRecord>, Vec<DocumentError>) {
        let mut ready = Vec::with_capacity(records.len());
        let mut errors = Vec::new();

        for mut record in records {
            if record.embedding.as_ref().is_some_and(|e| !e.is_empty()) {
                ready.push(record);
                continue;
            }
            let Some(content) = record.content.as_deref().filter(|c| !c.trim().is_empty()) else {
                // Left for ingestion to reject as a missing embedding
                ready.push(record);
                continue;
            };
            match self.embed_with_retry(content).await {
                Ok(vector) => {
                    debug!(document = %record.id, dimension = vector.len(), "embedded");
                    record.embedding = Some(vector);
                    ready.push(record);
                }
                Err(e) => {
                    warn!(document = %record.id, error = %e, "excluding document: embedding failed");
                    errors.push(DocumentError::new(record.id, e));
                }
            }
        }
        (ready, errors)
    }
}

// ---------------------------------------------------------------------------
// FastEmbedProvider, behind the `embeddings` feature
// ---------------------------------------------------------------------------

#[cfg(feature = "embeddings")]
mod fastembed_impl {
    use super::{EmbeddingError, EmbeddingProvider};
    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use std::sync::Mutex;

    /// Local ONNX embedder.
    ///
    /// `TextEmbedding::embed` takes `&mut self`, hence the `Mutex`.
    pub struct FastEmbedProvider {
        model: Mutex<TextEmbedding>,
    }

    impl FastEmbedProvider {
        pub fn new(model: EmbeddingModel) -> Result<Self, EmbeddingError> {
            let options = InitOptions::new(model).with_show_download_progress(false);
            let embedding = TextEmbedding::try_new(options).map_err(|e| EmbeddingError::Model(e.to_string()))?;
            Ok(Self {
                model: Mutex::new(embedding),
            })
        }

        /// nomic-embed-text-v1.5
        pub fn default_model() -> Result<Self, EmbeddingError> {
            Self::new(EmbeddingModel::NomicEmbedTextV15)
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FastEmbedProvider {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let mut model = self
                .model
                .lock()
                .map_err(|_| EmbeddingError::Unavailable("model lock poisoned".into()))?;
            let mut vectors = model
                .embed(vec![text], None)
                .map_err(|e| EmbeddingError::Model(e.to_string()))?;
            vectors.pop().ok_or(EmbeddingError::EmptyResult)
        }
    }
}

#[cfg(feature = "embeddings")]
pub use fastembed_impl::FastEmbedProvider;
