//! Chain-connection counts and hub detection
//!
//! A document's connection count is the sum, over the chains it belongs
//! to, of chain size minus one. A hub exceeds `hub_multiplier` times the
//! corpus-average count. Insights and breakthroughs both read hubs from
//! this one profile.

use super::types::ConvergenceChain;

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionProfile {
    counts: Vec<usize>,
    chain_memberships: Vec<usize>,
    average: f64,
    hub_multiplier: f64,
}

impl ConnectionProfile {
    pub fn new(document_count: usize, chains: &[ConvergenceChain], hub_multiplier: f64) -> Self {
        Self::from_member_sets(
            document_count,
            chains.iter().map(|c| c.member_indices()),
            hub_multiplier,
        )
    }

    /// Build from raw membership lists (corpus indices).
    pub fn from_member_sets<'a>(
        document_count: usize,
        member_sets: impl IntoIterator<Item = &'a [usize]>,
        hub_multiplier: f64,
    ) -> Self {
        let mut counts = vec![0usize; document_count];
        let mut chain_memberships = vec![0usize; document_count];
        for members in member_sets {
            let links = members.len().saturating_sub(1);
            for &i in members {
                counts[i] += links;
                chain_memberships[i] += 1;
            }
        }
        let average = if document_count == 0 {
            0.0
        } else {
            counts.iter().sum::<usize>() as f64 / document_count as f64
        };
        Self {
            counts,
            chain_memberships,
            average,
            hub_multiplier,
        }
    }

    pub fn count(&self, index: usize) -> usize {
        self.counts[index]
    }

    /// Number of chains the document participates in
    pub fn chains_of(&self, index: usize) -> usize {
        self.chain_memberships[index]
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    /// Connections divided by the hub cutoff; above 1 means hub.
    pub fn excess_ratio(&self, index: usize) -> f64 {
        let cutoff = self.hub_multiplier * self.average;
        if cutoff <= 0.0 {
            0.0
        } else {
            self.counts[index] as f64 / cutoff
        }
    }

    pub fn is_hub(&self, index: usize) -> bool {
        self.average > 0.0 && self.counts[index] as f64 > self.hub_multiplier * self.average
    }

    /// Hub strength in [0.5, 1]: half the excess ratio, capped at 1.
    pub fn hub_confidence(&self, index: usize) -> f64 {
        (self.excess_ratio(index) * 0.5).clamp(0.0, 1.0)
    }

    pub fn hubs(&self) -> Vec<usize> {
        (0..self.counts.len()).filter(|&i| self.is_hub(i)).collect()
    }

    pub fn total_connections(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_connections_against_average_one_is_hub() {
        // One six-member chain among thirty documents: members have 5 connections, average is 1
        let chain: Vec<usize> = (0..6).collect();
        let profile = ConnectionProfile::from_member_sets(30, [chain.as_slice()], 2.0);

        assert_eq!(profile.count(0), 5);
        assert!((profile.average() - 1.0).abs() < 1e-9);
        assert!(profile.is_hub(0));
        assert!(!profile.is_hub(10));
        assert!((profile.excess_ratio(0) - 2.5).abs() < 1e-9);
        assert_eq!(profile.hub_confidence(0), 1.0);
        assert_eq!(profile.hubs(), chain);
    }

    #[test]
    fn uniform_chain_has_no_hubs() {
        let chain = [0usize, 1, 2];
        let profile = ConnectionProfile::from_member_sets(3, [&chain[..]], 2.0);
        assert!(profile.hubs().is_empty());
    }

    #[test]
    fn empty_corpus_has_zero_average() {
        let profile = ConnectionProfile::from_member_sets(0, std::iter::empty(), 2.0);
        assert_eq!(profile.average(), 0.0);
        assert!(profile.hubs().is_empty());
    }

    #[test]
    fn counts_accumulate_across_chains() {
        let a = [0usize, 1, 2];
        let b = [2usize, 3, 4, 5];
        let profile = ConnectionProfile::from_member_sets(8, [&a[..], &b[..]], 2.0);
        assert_eq!(profile.count(2), 5);
        assert_eq!(profile.chains_of(2), 2);
        assert_eq!(profile.total_connections(), 2 * 3 + 3 * 4);
    }
}
