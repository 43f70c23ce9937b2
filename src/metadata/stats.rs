//! Descriptive statistics over small numeric samples
//!
//! Every helper is total: an empty sample yields zeros.

use serde::{Deserialize, Serialize};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Share of `part` in `total` as a percentage; 0 for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Upper bounds of the score buckets; the last bucket is closed at 100.
const BUCKET_EDGES: [f64; 5] = [20.0, 40.0, 60.0, 80.0, 100.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBucket {
    pub range: String,
    pub count: usize,
}

/// Summary of one 0-100 score across the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub buckets: Vec<ScoreBucket>,
}

impl ScoreSummary {
    pub fn from_scores(values: &[f64]) -> Self {
        let mut counts = [0usize; 5];
        for &v in values {
            let slot = BUCKET_EDGES.iter().position(|&edge| v < edge).unwrap_or(4);
            counts[slot] += 1;
        }
        let mut lower = 0.0;
        let buckets = BUCKET_EDGES
            .iter()
            .zip(counts)
            .map(|(&upper, count)| {
                let bucket = ScoreBucket {
                    range: format!("{}-{}", lower, upper),
                    count,
                };
                lower = upper;
                bucket
            })
            .collect();

        Self {
            mean: mean(values),
            median: median(values),
            min: min(values),
            max: max(values),
            std_dev: std_dev(values),
            buckets,
        }
    }
}

impl Default for ScoreSummary {
    fn default() -> Self {
        Self::from_scores(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample_is_zeroed() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(min(&[]), 0.0);
        assert_eq!(max(&[]), 0.0);
        assert_eq!(percentage(3, 0), 0.0);

        let summary = ScoreSummary::default();
        assert_eq!(summary.buckets.len(), 5);
        assert!(summary.buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn median_of_even_sample_averages_the_middle() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
    }

    #[test]
    fn buckets_are_half_open_except_the_last() {
        let summary = ScoreSummary::from_scores(&[0.0, 19.9, 20.0, 79.9, 80.0, 100.0]);
        let counts: Vec<_> = summary.buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 0, 1, 2]);
        assert_eq!(summary.buckets[0].range, "0-20");
        assert_eq!(summary.buckets[4].range, "80-100");
    }

    #[test]
    fn std_dev_is_population() {
        assert!((std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
    }
}
