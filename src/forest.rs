//! Top-level facade: one struct pairing a compressed forest with its
//! genomic sequence, exposing every statistic in `stats/` without callers
//! having to wire up a `NumSamplesBelowAccessor` or an `AlleleFrequencies`
//! stream themselves.
//!
//! Generic over a [`SubtreeCounts`] trait bound rather than duplicated per
//! encoding, so one `SuccinctForest<F>` body serves both
//! [`DAGCompressedForest`] and [`BPCompressedForest`].

use crate::bp::BPCompressedForest;
use crate::dag::DAGCompressedForest;
use crate::error::{Result, SfkitError};
use crate::frequencies::AlleleFrequencies;
use crate::ids::{NodeId, SampleId, SampleSet};
use crate::samples::{from_bp, from_dag, NumSamplesBelowAccessor};
use crate::sequence::GenomicSequence;
use crate::stats;

/// The one seam where the two encodings still need different code: building
/// a [`NumSamplesBelowAccessor`]. Every statistic above this layer is
/// encoding-agnostic — except `lca`, which only the DAG encoding can answer
/// without a full per-query traversal; the default implementation here is
/// the fatal fallback BP inherits.
pub trait SubtreeCounts {
    fn num_samples_below<const N: usize>(&self, sample_sets: [&SampleSet; N]) -> NumSamplesBelowAccessor<N>;
    fn num_nodes(&self) -> NodeId;
    fn num_samples(&self) -> SampleId;
    fn all_samples(&self) -> SampleSet;

    /// Lowest common ancestor of `samples`, one per tree containing at
    /// least one of them. Fatal on encodings that can't answer it cheaply.
    fn lca(&self, _samples: &SampleSet) -> Result<Vec<NodeId>> {
        Err(SfkitError::AlgorithmicPrecondition {
            detail: "lca requires the DAG encoding's explicit child adjacency; this forest is BP-encoded".into(),
        })
    }
}

impl SubtreeCounts for DAGCompressedForest {
    fn num_samples_below<const N: usize>(&self, sample_sets: [&SampleSet; N]) -> NumSamplesBelowAccessor<N> {
        from_dag(self, sample_sets)
    }
    fn num_nodes(&self) -> NodeId {
        DAGCompressedForest::num_nodes(self)
    }
    fn num_samples(&self) -> SampleId {
        DAGCompressedForest::num_samples(self)
    }
    fn all_samples(&self) -> SampleSet {
        DAGCompressedForest::all_samples(self)
    }
    fn lca(&self, samples: &SampleSet) -> Result<Vec<NodeId>> {
        Ok(stats::lca(self, samples))
    }
}

impl SubtreeCounts for BPCompressedForest {
    fn num_samples_below<const N: usize>(&self, sample_sets: [&SampleSet; N]) -> NumSamplesBelowAccessor<N> {
        from_bp(self, sample_sets)
    }
    fn num_nodes(&self) -> NodeId {
        BPCompressedForest::num_nodes(self)
    }
    fn num_samples(&self) -> SampleId {
        BPCompressedForest::num_samples(self)
    }
    fn all_samples(&self) -> SampleSet {
        BPCompressedForest::all_samples(self)
    }
}

pub struct SuccinctForest<F> {
    forest: F,
    sequence: GenomicSequence,
}

impl<F: SubtreeCounts> SuccinctForest<F> {
    pub fn new(forest: F, sequence: GenomicSequence) -> Self {
        SuccinctForest { forest, sequence }
    }

    pub fn forest(&self) -> &F {
        &self.forest
    }

    pub fn sequence(&self) -> &GenomicSequence {
        &self.sequence
    }

    pub fn all_samples(&self) -> SampleSet {
        self.forest.all_samples()
    }

    /// Number of distinct subtrees any mutation is attached to — a cheap
    /// proxy for "how much of the tree sequence actually varies", read
    /// straight off the sequence store without touching the forest.
    pub fn num_subtrees_with_mutations(&self) -> usize {
        self.sequence.subtrees_with_mutations().len()
    }

    pub fn diversity(&self, sample_set: &SampleSet) -> f64 {
        let accessor = self.forest.num_samples_below([sample_set]);
        let freqs = AlleleFrequencies::new(&self.sequence, &accessor);
        stats::diversity(freqs, 0, sample_set.popcount())
    }

    pub fn divergence(&self, a: &SampleSet, b: &SampleSet) -> f64 {
        let accessor = self.forest.num_samples_below([a, b]);
        let freqs = AlleleFrequencies::new(&self.sequence, &accessor);
        stats::divergence(freqs, 0, 1, a.popcount(), b.popcount())
    }

    pub fn num_segregating_sites(&self, sample_set: &SampleSet) -> u64 {
        let accessor = self.forest.num_samples_below([sample_set]);
        let freqs = AlleleFrequencies::new(&self.sequence, &accessor);
        stats::num_segregating_sites(freqs, 0, sample_set.popcount())
    }

    pub fn tajimas_d(&self, sample_set: &SampleSet) -> Option<f64> {
        let pi = self.diversity(sample_set);
        let s = self.num_segregating_sites(sample_set);
        stats::tajimas_d(pi, s, sample_set.popcount())
    }

    pub fn fst(&self, a: &SampleSet, b: &SampleSet) -> Option<f64> {
        let pi_a = self.diversity(a);
        let pi_b = self.diversity(b);
        let d_ab = self.divergence(a, b);
        stats::fst(pi_a, pi_b, d_ab)
    }

    pub fn f2(&self, a: &SampleSet, b: &SampleSet) -> Result<f64> {
        let accessor = self.forest.num_samples_below([a, b]);
        let freqs = AlleleFrequencies::new(&self.sequence, &accessor);
        stats::f2(freqs, 0, 1, a.popcount(), b.popcount())
    }

    pub fn f3(&self, c: &SampleSet, a: &SampleSet, b: &SampleSet) -> Result<f64> {
        let accessor = self.forest.num_samples_below([c, a, b]);
        let freqs = AlleleFrequencies::new(&self.sequence, &accessor);
        stats::f3(freqs, 0, 1, 2, c.popcount(), a.popcount(), b.popcount())
    }

    pub fn f4(&self, a: &SampleSet, b: &SampleSet, c: &SampleSet, d: &SampleSet) -> f64 {
        let accessor = self.forest.num_samples_below([a, b, c, d]);
        let freqs = AlleleFrequencies::new(&self.sequence, &accessor);
        stats::f4(freqs, 0, 1, 2, 3, a.popcount(), b.popcount(), c.popcount(), d.popcount())
    }

    pub fn allele_frequency_spectrum(&self, sample_set: &SampleSet) -> Vec<u64> {
        let accessor = self.forest.num_samples_below([sample_set]);
        let freqs = AlleleFrequencies::new(&self.sequence, &accessor);
        stats::allele_frequency_spectrum(freqs, 0, sample_set.popcount())
    }

    /// Lowest common ancestor of `samples`, one per tree containing at
    /// least one of them. Fatal ([`SfkitError::AlgorithmicPrecondition`])
    /// on encodings without cheap child adjacency (BP).
    pub fn lca(&self, samples: &SampleSet) -> Result<Vec<NodeId>> {
        self.forest.lca(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::compress_dag;
    use crate::config::BuildConfig;
    use crate::reader::fixtures::SingleTreeFixture;
    use crate::reader::MutationRecord;

    fn split_tree() -> SingleTreeFixture {
        SingleTreeFixture {
            num_samples: 4,
            postorder: vec![0, 1, 4, 2, 3, 5, 6],
            children: vec![(4, vec![0, 1]), (5, vec![2, 3]), (6, vec![4, 5])],
            root: 6,
            ancestral: vec![0],
            mutations: vec![vec![MutationRecord { site: 0, node: 4, derived_state: 1, parent_mutation: None }]],
        }
    }

    #[test]
    fn facade_wires_diversity_segregating_sites_and_tajimas_d_together() {
        let reader = split_tree();
        let config = BuildConfig::default();
        let (forest, sequence) = compress_dag(&reader, &config).unwrap();
        let sf = SuccinctForest::new(forest, sequence);

        let mut all = sf.all_samples();
        for s in 0..4 {
            all.add(s);
        }
        assert_eq!(sf.num_segregating_sites(&all), 1);
        assert!(sf.diversity(&all) > 0.0);
        assert!(sf.tajimas_d(&all).is_some());
    }

    #[test]
    fn facade_lca_matches_direct_stats_call() {
        let reader = split_tree();
        let config = BuildConfig::default();
        let (forest, sequence) = compress_dag(&reader, &config).unwrap();
        let sf = SuccinctForest::new(forest, sequence);
        let mut pair = SampleSet::new(4);
        pair.add(0);
        pair.add(1);
        assert_eq!(sf.lca(&pair).unwrap(), vec![4]);
    }

    #[test]
    fn three_trees_star_topology_matches_documented_statistics() {
        use crate::reader::fixtures::MultiTreeFixture;

        let reader = MultiTreeFixture::three_trees_star_topology();
        let config = BuildConfig::default();
        let (forest, sequence) = compress_dag(&reader, &config).unwrap();
        assert_eq!(forest.num_trees(), 3);
        assert_eq!(forest.num_unique_subtrees(), 7);

        let sf = SuccinctForest::new(forest, sequence);
        let mut all = sf.all_samples();
        for s in 0..4 {
            all.add(s);
        }
        assert_eq!(sf.allele_frequency_spectrum(&all), vec![0, 2, 0, 1, 0]);
        assert!((sf.diversity(&all) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn facade_lca_on_bp_is_a_fatal_algorithmic_precondition() {
        use crate::compress::compress_bp;
        use crate::error::SfkitError;

        let reader = split_tree();
        let config = BuildConfig::default();
        let (forest, sequence) = compress_bp(&reader, &config).unwrap();
        let sf = SuccinctForest::new(forest, sequence);
        let mut pair = SampleSet::new(4);
        pair.add(0);
        pair.add(1);
        assert!(matches!(sf.lca(&pair), Err(SfkitError::AlgorithmicPrecondition { .. })));
    }
}
