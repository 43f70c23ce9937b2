//! Corpus builders with controlled cosine similarity

use chrono::{DateTime, Duration, Utc};
use convergence::{CategoryValue, DocumentRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Midnight UTC, `n` days after 2025-01-01.
pub fn day(n: u32) -> DateTime<Utc> {
    let base: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
    base + Duration::days(i64::from(n))
}

/// Builds records on fresh orthogonal axes, one day apart in insertion order.
pub struct CorpusBuilder {
    dimension: usize,
    next_axis: usize,
    records: Vec<DocumentRecord>,
}

impl CorpusBuilder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            next_axis: 0,
            records: Vec::new(),
        }
    }

    fn axis(&mut self) -> usize {
        let axis = self.next_axis;
        assert!(axis < self.dimension, "corpus needs more than {} axes", self.dimension);
        self.next_axis += 1;
        axis
    }

    fn push(&mut self, id: String, embedding: Vec<f32>, categories: Vec<CategoryValue>) {
        let ts = day(self.records.len() as u32);
        self.records.push(
            DocumentRecord::new(id, ts)
                .with_embedding(embedding)
                .with_categories(categories),
        );
    }

    /// `size` documents `{prefix}1..` sharing one axis, pairwise `1 / (1 + spread²)`.
    pub fn cluster(mut self, prefix: &str, size: usize, spread: f32, category: &str) -> Self {
        let shared = self.axis();
        for n in 1..=size {
            let own = self.axis();
            let mut v = vec![0.0; self.dimension];
            v[shared] = 1.0;
            v[own] = spread;
            self.push(format!("{}{}", prefix, n), v, vec![CategoryValue::label(category)]);
        }
        self
    }

    /// Two documents with cosine exactly `cos` to each other and 0 to everything else.
    pub fn pair(mut self, prefix: &str, cos: f32, category: &str) -> Self {
        let (a, b) = (self.axis(), self.axis());
        let mut first = vec![0.0; self.dimension];
        first[a] = 1.0;
        let mut second = vec![0.0; self.dimension];
        second[a] = cos;
        second[b] = (1.0 - cos * cos).sqrt();
        self.push(format!("{}1", prefix), first, vec![CategoryValue::label(category)]);
        self.push(format!("{}2", prefix), second, vec![CategoryValue::label(category)]);
        self
    }

    /// A document orthogonal to everything else.
    pub fn singleton(mut self, id: &str) -> Self {
        let axis = self.axis();
        let mut v = vec![0.0; self.dimension];
        v[axis] = 1.0;
        self.push(id.to_string(), v, Vec::new());
        self
    }

    pub fn zero(mut self, id: &str) -> Self {
        let v = vec![0.0; self.dimension];
        self.push(id.to_string(), v, Vec::new());
        self
    }

    pub fn with_analysis_types(mut self, types: &[&str]) -> Self {
        for (record, t) in self.records.iter_mut().zip(types) {
            record.analysis_type = Some(t.to_string());
        }
        self
    }

    pub fn build(self) -> Vec<DocumentRecord> {
        self.records
    }
}

/// Seeded random corpus: `clusters` noisy clusters of `size` around random centers.
pub fn random_corpus(seed: u64, clusters: usize, size: usize, dimension: usize) -> Vec<DocumentRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let types = ["Breakthrough", "ConceptualEvolution", "DecisivePoint", "StrategicInsight", "GeneralLearning"];
    let mut records = Vec::with_capacity(clusters * size);

    for c in 0..clusters {
        let center: Vec<f32> = (0..dimension).map(|_| rng.gen_range(-1.0..1.0)).collect();
        for m in 0..size {
            let noise = rng.gen_range(0.05..0.9);
            let embedding: Vec<f32> = center.iter().map(|x| x + rng.gen_range(-noise..noise)).collect();
            let ts = day(rng.gen_range(0..120));
            let category = format!("topic-{}", rng.gen_range(0..4));
            records.push(
                DocumentRecord::new(format!("c{}-{}", c, m), ts)
                    .with_embedding(embedding)
                    .with_categories([category.as_str()])
                    .with_analysis_type(types[rng.gen_range(0..types.len())]),
            );
        }
    }
    records
}
