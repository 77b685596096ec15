//! Lowest common ancestor of a sample set, one per tree: a single
//! postorder pass over the DAG's edge list, tracking for every node how
//! many queried samples sit below it plus a running candidate LCA. A
//! node becomes the new candidate the moment a second child subtree of
//! its own also carries a queried sample — everything below stays a
//! candidate only until a sibling shows up to pull the answer up a level.

use crate::dag::DAGCompressedForest;
use crate::ids::{NodeId, SampleSet};

/// Lowest common ancestor of `samples` within each tree that contains at
/// least one of them. A tree sequence's trees all share the same sample
/// domain, so a root with none of `samples` below it is simply omitted
/// rather than padded with a placeholder.
pub fn lca(forest: &DAGCompressedForest, samples: &SampleSet) -> Vec<NodeId> {
    if samples.popcount() == 0 {
        return Vec::new();
    }

    let num_nodes = forest.num_nodes() as usize;
    let mut counts = vec![0u32; num_nodes];
    let mut candidate: Vec<Option<NodeId>> = vec![None; num_nodes];

    for s in 0..forest.num_samples() {
        if samples.contains(s) {
            counts[s as usize] = 1;
            candidate[s as usize] = Some(s);
        }
    }

    for edge in forest.postorder_edges().edges() {
        let child_count = counts[edge.to() as usize];
        if child_count == 0 {
            continue;
        }
        let parent = edge.from() as usize;
        let before = counts[parent];
        counts[parent] += child_count;
        if before == 0 {
            candidate[parent] = candidate[edge.to() as usize];
        } else {
            candidate[parent] = Some(edge.from());
        }
    }

    forest
        .roots()
        .iter()
        .filter(|&&root| counts[root as usize] > 0)
        .filter_map(|&root| candidate[root as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::compress_dag;
    use crate::config::BuildConfig;
    use crate::reader::fixtures::caterpillar_four_samples;

    fn set_of(n: u32, members: &[u32]) -> SampleSet {
        let mut set = SampleSet::new(n);
        for &m in members {
            set.add(m);
        }
        set
    }

    #[test]
    fn lca_of_cherry_members_is_their_parent() {
        let reader = caterpillar_four_samples();
        let config = BuildConfig::default();
        let (forest, _seq) = compress_dag(&reader, &config).unwrap();

        assert_eq!(lca(&forest, &set_of(4, &[0, 1])), vec![4]);
        assert_eq!(lca(&forest, &set_of(4, &[2, 3])), vec![5]);
    }

    #[test]
    fn lca_across_cherries_is_the_root() {
        let reader = caterpillar_four_samples();
        let config = BuildConfig::default();
        let (forest, _seq) = compress_dag(&reader, &config).unwrap();
        let root = forest.roots()[0];

        assert_eq!(lca(&forest, &set_of(4, &[0, 3])), vec![root]);
    }

    #[test]
    fn lca_of_a_single_sample_is_itself() {
        let reader = caterpillar_four_samples();
        let config = BuildConfig::default();
        let (forest, _seq) = compress_dag(&reader, &config).unwrap();

        assert_eq!(lca(&forest, &set_of(4, &[2])), vec![2]);
    }

    #[test]
    fn lca_of_three_samples_spanning_both_cherries_is_the_root() {
        let reader = caterpillar_four_samples();
        let config = BuildConfig::default();
        let (forest, _seq) = compress_dag(&reader, &config).unwrap();
        let root = forest.roots()[0];

        assert_eq!(lca(&forest, &set_of(4, &[0, 1, 2])), vec![root]);
    }

    #[test]
    fn lca_of_empty_set_is_empty() {
        let reader = caterpillar_four_samples();
        let config = BuildConfig::default();
        let (forest, _seq) = compress_dag(&reader, &config).unwrap();

        assert!(lca(&forest, &SampleSet::new(4)).is_empty());
    }
}
