//! SimilarityCache: memoized pairwise cosine similarity
//!
//! Keys are order-independent pairs of embedding fingerprints, so
//! `sim(a, b)` and `sim(b, a)` share one entry. Reads go straight to the
//! concurrent map; inserts are serialized behind the eviction queue lock
//! and only happen when no live entry exists yet.

use crate::document::Document;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from explicit similarity requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    #[error("document {0} has no embedding")]
    MissingEmbedding(String),

    #[error("embedding dimension mismatch between {left} ({left_dim}) and {right} ({right_dim})")]
    DimensionMismatch {
        left: String,
        left_dim: usize,
        right: String,
        right_dim: usize,
    },
}

/// Order-independent cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(u64, u64);

impl PairKey {
    pub fn new(a: u64, b: u64) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn for_documents(a: &Document, b: &Document) -> Self {
        Self::new(a.fingerprint(), b.fingerprint())
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: f64,
    inserted_at: Instant,
    generation: u64,
}

/// Cache counters for introspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub evictions: u64,
}

/// Bounded, oldest-first similarity cache with optional TTL.
///
/// Owned by one pipeline; share it explicitly through an `Arc` if needed.
#[derive(Debug)]
pub struct SimilarityCache {
    entries: DashMap<PairKey, CacheEntry>,
    /// Insertion order; stale generations are skipped on eviction
    order: Mutex<VecDeque<(PairKey, u64)>>,
    capacity: usize,
    ttl: Option<Duration>,
    next_generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for SimilarityCache {
    fn default() -> Self {
        Self::new(2000)
    }
}

impl SimilarityCache {
    /// Create a cache holding at most `capacity` pairs (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            ttl: None,
            next_generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Expire entries after `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cosine similarity between two documents, validating their embeddings.
    pub fn similarity(&self, a: &Document, b: &Document) -> Result<f64, SimilarityError> {
        if a.embedding.is_empty() {
            return Err(SimilarityError::MissingEmbedding(a.id.to_string()));
        }
        if b.embedding.is_empty() {
            return Err(SimilarityError::MissingEmbedding(b.id.to_string()));
        }
        if a.dimension() != b.dimension() {
            return Err(SimilarityError::DimensionMismatch {
                left: a.id.to_string(),
                left_dim: a.dimension(),
                right: b.id.to_string(),
                right_dim: b.dimension(),
            });
        }
        Ok(self.get_or_insert_with(PairKey::for_documents(a, b), || {
            cosine_similarity(&a.embedding, &b.embedding)
        }))
    }

    /// Return the cached value for `key`, computing and inserting it on a miss.
    pub(crate) fn get_or_insert_with(&self, key: PairKey, compute: impl FnOnce() -> f64) -> f64 {
        if let Some(value) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let value = compute();
        self.insert_if_absent(key, value)
    }

    fn lookup(&self, key: &PairKey) -> Option<f64> {
        let entry = self.entries.get(key)?;
        if self.is_expired(&entry) {
            return None;
        }
        Some(entry.value)
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .map_or(false, |ttl| entry.inserted_at.elapsed() >= ttl)
    }

    /// Insert under the writer lock unless a live entry appeared meanwhile.
    ///
    /// Expired entries at the head of the queue are purged first, so they
    /// never hold capacity that live pairs need.
    fn insert_if_absent(&self, key: PairKey, value: f64) -> f64 {
        let mut order = match self.order.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(existing) = self.entries.get(&key) {
            if !self.is_expired(&existing) {
                return existing.value;
            }
        }

        self.purge_expired_front(&mut order);

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                generation,
            },
        );
        order.push_back((key, generation));

        if order.len() > self.capacity.saturating_mul(2) {
            self.compact(&mut order);
        }

        while self.entries.len() > self.capacity {
            let Some((old_key, old_generation)) = order.pop_front() else {
                break;
            };
            let removed = self
                .entries
                .remove_if(&old_key, |_, e| e.generation == old_generation);
            if removed.is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        value
    }

    /// Pop stale and expired records off the front of the queue.
    ///
    /// Entries share one TTL, so everything behind the first live record is
    /// live too.
    fn purge_expired_front(&self, order: &mut VecDeque<(PairKey, u64)>) {
        let Some(ttl) = self.ttl else {
            return;
        };
        while let Some(&(key, generation)) = order.front() {
            self.entries
                .remove_if(&key, |_, e| e.generation == generation && e.inserted_at.elapsed() >= ttl);
            let live = self
                .entries
                .get(&key)
                .map_or(false, |e| e.generation == generation);
            if live {
                break;
            }
            order.pop_front();
        }
    }

    /// Drop queue records whose entry was replaced or removed.
    fn compact(&self, order: &mut VecDeque<(PairKey, u64)>) {
        order.retain(|(key, generation)| {
            self.entries
                .get(key)
                .map_or(false, |e| e.generation == *generation)
        });
    }

    #[cfg(test)]
    fn queued(&self) -> usize {
        match self.order.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        let mut order = match self.order.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        order.clear();
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Cosine similarity between two equal-length vectors.
///
/// Zero-norm vectors have similarity 0, never NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::sync::Arc;

    fn ts() -> DateTime<Utc> {
        "2025-01-01T00:00:00Z".parse().unwrap()
    }

    fn doc(id: &str, embedding: Vec<f32>) -> Document {
        Document::try_new(id, id, ts(), embedding).unwrap()
    }

    #[test]
    fn cosine_of_parallel_and_orthogonal_vectors() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_norm_is_zero_not_nan() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(sim, 0.0);
        assert!(!cosine_similarity(&[0.0], &[0.0]).is_nan());
    }

    #[test]
    fn lookup_is_order_independent() {
        let cache = SimilarityCache::new(10);
        let a = doc("a", vec![1.0, 0.5]);
        let b = doc("b", vec![0.3, 0.9]);

        let ab = cache.similarity(&a, &b).unwrap();
        let ba = cache.similarity(&b, &a).unwrap();
        assert_eq!(ab, ba);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn dimension_mismatch_fails_loudly() {
        let cache = SimilarityCache::new(10);
        let a = doc("a", vec![1.0, 0.5]);
        let b = doc("b", vec![1.0, 0.5, 0.2]);
        assert!(matches!(
            cache.similarity(&a, &b),
            Err(SimilarityError::DimensionMismatch { left_dim: 2, right_dim: 3, .. })
        ));
    }

    #[test]
    fn missing_embedding_fails_loudly() {
        let cache = SimilarityCache::new(10);
        let a = doc("a", vec![1.0]);
        let mut b = doc("b", vec![1.0]);
        b.embedding.clear();
        assert!(matches!(
            cache.similarity(&a, &b),
            Err(SimilarityError::MissingEmbedding(id)) if id == "b"
        ));
    }

    #[test]
    fn evicts_oldest_first() {
        let cache = SimilarityCache::new(2);
        cache.get_or_insert_with(PairKey::new(1, 2), || 0.1);
        cache.get_or_insert_with(PairKey::new(3, 4), || 0.2);
        cache.get_or_insert_with(PairKey::new(5, 6), || 0.3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);

        // Oldest pair was evicted and must be recomputed
        let recomputed = cache.get_or_insert_with(PairKey::new(2, 1), || 0.9);
        assert_eq!(recomputed, 0.9);
        // Newest pair is still cached
        assert_eq!(cache.get_or_insert_with(PairKey::new(5, 6), || 0.0), 0.3);
    }

    #[test]
    fn expired_entries_are_recomputed() {
        let cache = SimilarityCache::new(10).with_ttl(Duration::from_millis(0));
        cache.get_or_insert_with(PairKey::new(1, 2), || 0.1);
        let value = cache.get_or_insert_with(PairKey::new(1, 2), || 0.7);
        assert_eq!(value, 0.7);
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reinserting_expired_pairs_keeps_the_queue_bounded() {
        let cache = SimilarityCache::new(100).with_ttl(Duration::from_millis(0));
        for i in 0..10_000u32 {
            cache.get_or_insert_with(PairKey::new(1, 2), || f64::from(i));
            cache.get_or_insert_with(PairKey::new(u64::from(i % 50), 1_000), || 0.5);
        }
        assert!(cache.len() <= cache.capacity());
        assert!(cache.queued() <= cache.capacity());
    }

    #[test]
    fn expired_entries_do_not_hold_capacity() {
        let cache = SimilarityCache::new(2).with_ttl(Duration::from_millis(20));
        cache.get_or_insert_with(PairKey::new(1, 2), || 0.1);
        cache.get_or_insert_with(PairKey::new(3, 4), || 0.2);
        std::thread::sleep(Duration::from_millis(40));

        cache.get_or_insert_with(PairKey::new(5, 6), || 0.3);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.queued(), 1);
        // Expiry is not eviction
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn clear_resets_entries_and_counters() {
        let cache = SimilarityCache::new(10);
        cache.get_or_insert_with(PairKey::new(1, 2), || 0.1);
        cache.get_or_insert_with(PairKey::new(1, 2), || 0.1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn concurrent_readers_agree() {
        let cache = Arc::new(SimilarityCache::new(100));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    (0..20u64)
                        .map(|i| cache.get_or_insert_with(PairKey::new(i, i + 1), || i as f64 / 100.0))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results[1..] {
            assert_eq!(r, &results[0]);
        }
        assert_eq!(cache.len(), 20);
    }
}
