//! Deterministic embedding providers for tests

use async_trait::async_trait;
use convergence::{EmbeddingError, EmbeddingProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Embeds text as a bag of known keywords, one axis per keyword.
///
/// Text containing `fail` returns a permanent model error.
pub struct KeywordProvider {
    keywords: Vec<&'static str>,
}

impl KeywordProvider {
    pub fn new(keywords: &[&'static str]) -> Self {
        Self {
            keywords: keywords.to_vec(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.contains("fail") {
            return Err(EmbeddingError::Model(format!("cannot embed '{}'", text)));
        }
        Ok(self
            .keywords
            .iter()
            .map(|k| text.matches(k).count() as f32)
            .collect())
    }
}

/// Wraps another provider, timing out the first `failures` calls per text.
pub struct FlakyProvider<P> {
    inner: P,
    failures: u32,
    calls: Mutex<HashMap<String, u32>>,
    total: AtomicU32,
}

impl<P> FlakyProvider<P> {
    pub fn new(inner: P, failures: u32) -> Self {
        Self {
            inner,
            failures,
            calls: Mutex::new(HashMap::new()),
            total: AtomicU32::new(0),
        }
    }

    pub fn total_calls(&self) -> u32 {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for FlakyProvider<P> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        let seen = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(text.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if seen <= self.failures {
            return Err(EmbeddingError::Timeout);
        }
        self.inner.embed(text).await
    }
}
