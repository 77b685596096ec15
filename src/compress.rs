//! Forest compressors: consume the external tree iterator and drive
//! a hash map and a dense arena to build a [`DAGCompressedForest`] or [`BPCompressedForest`],
//! feeding a sequence-resolution pass via a per-tree ts-node→sf-node mapper.
//!
//! The DAG variant commits a fresh id on a hash miss and reuses an existing
//! one on a hit; the BP variant does the same but can roll a commit back
//! into a two-symbol reference pair, which the DAG encoding has no
//! equivalent for. Both drive the order-sensitive hash in
//! [`crate::hash::SubtreeHasher`] rather than a simple XOR-of-children
//! digest, since two subtrees with the same children in a different order
//! must never collide.

use crate::bp::{BPCompressedForest, BitVector};
use crate::config::BuildConfig;
use crate::dag::DAGCompressedForest;
use crate::error::{Result, SfkitError};
use crate::graph::EdgeListGraph;
use crate::hash::{SubtreeHash, SubtreeHasher};
use crate::ids::{NodeId, SampleId, TraversalOrder};
use crate::nodemap::SubtreeHashToNodeMap;
use crate::reader::{TreeCursor, TreeSequenceReader, TsNodeId};
use crate::sequence::GenomicSequence;
use crate::seqfactory::SequenceFactory;
use std::collections::HashMap;

fn validate_reader<R: TreeSequenceReader>(reader: &R) -> Result<()> {
    if !reader.sample_ids_are_consecutive() {
        return Err(SfkitError::InputViolatesContract {
            detail: "sample ids are not consecutive starting at 0".into(),
        });
    }
    Ok(())
}

/// DAG forest compressor. Samples
/// are pre-registered once so they share ids across all trees; each tree
/// then hashes its inner nodes bottom-up, minting a fresh sf-node id for
/// duplicate-free subtrees (always fresh for roots) and reusing the
/// existing id — emitting no edges — whenever a hash has been seen before.
pub fn compress_dag<R: TreeSequenceReader>(
    reader: &R,
    config: &BuildConfig,
) -> Result<(DAGCompressedForest, GenomicSequence)> {
    validate_reader(reader)?;
    let num_samples = reader.num_samples();

    let mut nodemap = SubtreeHashToNodeMap::new();
    let mut graph = EdgeListGraph::with_traversal_order(TraversalOrder::Postorder);
    for s in 0..num_samples {
        let h = SubtreeHasher::hash_sample(config.hash_seed, s);
        let id = nodemap.insert_node(h);
        debug_assert_eq!(id, s);
        graph.insert_leaf(id);
    }

    let mut hasher = SubtreeHasher::new(config.hash_seed);
    let mut sequence_factory = SequenceFactory::new();

    for tree_id in 0..reader.num_trees() {
        let cursor = reader.tree(tree_id);
        let mut ts_hash: HashMap<TsNodeId, SubtreeHash> = HashMap::new();
        let mut ts_to_sf: HashMap<TsNodeId, NodeId> = HashMap::new();

        for &ts_node in cursor.postorder() {
            if cursor.is_sample(ts_node) {
                let sf_id = ts_node as SampleId;
                ts_hash.insert(ts_node, SubtreeHasher::hash_sample(config.hash_seed, sf_id));
                ts_to_sf.insert(ts_node, sf_id);
                continue;
            }

            hasher.reset();
            let mut child_sf_ids = Vec::new();
            for &child in cursor.children(ts_node) {
                let child_hash = *ts_hash.get(&child).ok_or_else(|| SfkitError::InvariantViolation {
                    detail: format!("tree {tree_id}: child {child} visited out of postorder"),
                })?;
                hasher.append_child(child_hash);
                child_sf_ids.push(*ts_to_sf.get(&child).expect("child sf id missing despite hash present"));
            }
            let hash = hasher.finish();
            ts_hash.insert(ts_node, hash);

            let sf_id = if cursor.is_root(ts_node) {
                let id = nodemap.insert_root();
                graph.insert_root(id);
                for c in &child_sf_ids {
                    graph.insert_edge(id, *c);
                }
                id
            } else if let Some(existing) = nodemap.find(hash) {
                existing
            } else {
                let id = nodemap.insert_node(hash);
                for c in &child_sf_ids {
                    graph.insert_edge(id, *c);
                }
                id
            };
            ts_to_sf.insert(ts_node, sf_id);
        }

        sequence_factory.advance_through_tree(reader, tree_id, &ts_to_sf)?;
    }

    graph.set_num_nodes(nodemap.num_nodes());
    if config.assertion_level.checks_normal() && !graph.check_postorder() {
        return Err(SfkitError::InvariantViolation {
            detail: "compressed DAG edge list is not post-ordered".into(),
        });
    }

    let sequence = sequence_factory.finish(reader)?;
    Ok((DAGCompressedForest::new(graph, num_samples), sequence))
}

struct BpBuildState {
    bp: BitVector,
    is_leaf: BitVector,
    is_ref: BitVector,
    leaves: Vec<NodeId>,
    references: Vec<NodeId>,
    nodemap: SubtreeHashToNodeMap,
    committed_sample: Vec<bool>,
    hash_seed: u64,
}

impl BpBuildState {
    fn visit<C: TreeCursor>(
        &mut self,
        cursor: &C,
        ts_node: TsNodeId,
        ts_to_sf: &mut HashMap<TsNodeId, NodeId>,
    ) -> SubtreeHash {
        let hash = if cursor.is_sample(ts_node) {
            let sf_id = ts_node as SampleId;
            let hash = SubtreeHasher::hash_sample(self.hash_seed, sf_id);
            if !self.committed_sample[sf_id as usize] {
                self.bp.push(crate::bp::PARENS_OPEN);
                self.is_leaf.push(true);
                self.is_ref.push(false);
                self.bp.push(crate::bp::PARENS_CLOSE);
                self.is_leaf.push(true);
                self.is_ref.push(false);
                self.leaves.push(sf_id);
                self.committed_sample[sf_id as usize] = true;
            } else {
                self.bp.push(crate::bp::PARENS_OPEN);
                self.is_leaf.push(false);
                self.is_ref.push(true);
                self.bp.push(crate::bp::PARENS_CLOSE);
                self.is_leaf.push(false);
                self.is_ref.push(true);
                self.references.push(sf_id);
            }
            ts_to_sf.insert(ts_node, sf_id);
            hash
        } else {
            // Saved start position spans all three bit-vectors *and* the
            // two packed-id vectors: a rollback must undo every structure
            // a now-discarded descendant span touched, not just `bp`.
            let start_bp = self.bp.len();
            let start_leaves = self.leaves.len();
            let start_refs = self.references.len();

            self.bp.push(crate::bp::PARENS_OPEN);
            self.is_leaf.push(false);
            self.is_ref.push(false);

            let mut hasher = SubtreeHasher::new(self.hash_seed);
            for &child in cursor.children(ts_node) {
                let child_hash = self.visit(cursor, child, ts_to_sf);
                hasher.append_child(child_hash);
            }
            let hash = hasher.finish();

            let sf_id = if let Some(existing) = self.nodemap.find(hash) {
                self.bp.truncate(start_bp);
                self.is_leaf.truncate(start_bp);
                self.is_ref.truncate(start_bp);
                self.leaves.truncate(start_leaves);
                self.references.truncate(start_refs);

                self.bp.push(crate::bp::PARENS_OPEN);
                self.is_leaf.push(false);
                self.is_ref.push(true);
                self.bp.push(crate::bp::PARENS_CLOSE);
                self.is_leaf.push(false);
                self.is_ref.push(true);
                self.references.push(existing);
                existing
            } else {
                self.bp.push(crate::bp::PARENS_CLOSE);
                self.is_leaf.push(false);
                self.is_ref.push(false);
                self.nodemap.insert_node(hash)
            };
            ts_to_sf.insert(ts_node, sf_id);
            hash
        };
        hash
    }
}

/// BP forest compressor. Drives an Euler walk of each
/// tree (the Rust call stack plays the role of the "stack of subtree-start
/// positions" the original keeps explicitly); the commit-vs-rollback
/// decision is made only once a node's full hash is known, i.e. after all
/// of its children have themselves been committed or rolled back.
pub fn compress_bp<R: TreeSequenceReader>(
    reader: &R,
    config: &BuildConfig,
) -> Result<(BPCompressedForest, GenomicSequence)> {
    validate_reader(reader)?;
    let num_samples = reader.num_samples();

    let mut state = BpBuildState {
        bp: BitVector::new(),
        is_leaf: BitVector::new(),
        is_ref: BitVector::new(),
        leaves: Vec::new(),
        references: Vec::new(),
        nodemap: SubtreeHashToNodeMap::starting_at(num_samples),
        committed_sample: vec![false; num_samples as usize],
        hash_seed: config.hash_seed,
    };

    let mut sequence_factory = SequenceFactory::new();
    let num_trees = reader.num_trees();

    for tree_id in 0..num_trees {
        let cursor = reader.tree(tree_id);
        let mut ts_to_sf: HashMap<TsNodeId, NodeId> = HashMap::new();
        for &ts_node in cursor.postorder() {
            if cursor.is_root(ts_node) {
                state.visit(&cursor, ts_node, &mut ts_to_sf);
            }
        }
        sequence_factory.advance_through_tree(reader, tree_id, &ts_to_sf)?;
    }

    state.bp.shrink_to_fit();
    state.is_leaf.shrink_to_fit();
    state.is_ref.shrink_to_fit();
    state.leaves.shrink_to_fit();
    state.references.shrink_to_fit();

    let num_nodes = state.nodemap.num_nodes();
    let forest = BPCompressedForest::from_parts(
        state.bp,
        state.is_leaf,
        state.is_ref,
        state.leaves,
        state.references,
        num_nodes,
        num_samples,
        num_trees,
    );
    let sequence = sequence_factory.finish(reader)?;
    Ok((forest, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::fixtures::{caterpillar_four_samples, MultiTreeFixture};

    #[test]
    fn dag_single_tree_has_one_root_and_seven_nodes() {
        let reader = caterpillar_four_samples();
        let config = BuildConfig::default();
        let (forest, _seq) = compress_dag(&reader, &config).unwrap();
        assert_eq!(forest.num_samples(), 4);
        assert_eq!(forest.num_trees(), 1);
        // 4 samples + 2 cherries + 1 root = 7 distinct subtrees.
        assert_eq!(forest.num_unique_subtrees(), 7);
        assert_eq!(forest.num_nodes(), 7);
        assert!(forest.postorder_edges().check_postorder());
    }

    #[test]
    fn dag_identical_trees_share_inner_subtrees_but_not_roots() {
        let reader = MultiTreeFixture::three_identical_caterpillars();
        let config = BuildConfig::default();
        let (forest, _seq) = compress_dag(&reader, &config).unwrap();
        assert_eq!(forest.num_trees(), 3);
        // 4 samples + 2 shared cherries + 3 distinct roots = 9.
        assert_eq!(forest.num_unique_subtrees(), 9);
        assert_eq!(forest.roots().len(), 3);
        let roots: std::collections::HashSet<_> = forest.roots().iter().collect();
        assert_eq!(roots.len(), 3, "two identical trees must still produce distinct root ids");
    }

    #[test]
    fn bp_single_tree_balances_and_counts_leaves() {
        let reader = caterpillar_four_samples();
        let config = BuildConfig::default();
        let (forest, _seq) = compress_bp(&reader, &config).unwrap();
        assert_eq!(forest.num_trees(), 1);
        assert_eq!(forest.num_samples(), 4);
        let bp = forest.balanced_parenthesis();
        let ones = bp.count_ones();
        assert_eq!(ones * 2, bp.len(), "balanced parens: equal opens and closes");
        assert_eq!(forest.is_leaf_bits().count_ones() / 2, 4);
    }

    #[test]
    fn bp_identical_trees_back_reference_samples_and_whole_tree() {
        let reader = MultiTreeFixture::three_identical_caterpillars();
        let config = BuildConfig::default();
        let (forest, _seq) = compress_bp(&reader, &config).unwrap();
        assert_eq!(forest.num_trees(), 3);
        // Tree 1 commits 4 samples + 2 cherries + 1 root fresh (no refs).
        // Tree 2 back-refers its 4 samples and both cherries, root fresh.
        // Tree 3 back-refers the whole tree-2 root in one step.
        assert!(!forest.is_reference().is_empty());
        let total_refs = forest.is_reference().count_ones() / 2;
        assert!(total_refs >= 5, "expected at least the 4 sample + 1 whole-tree references, got {total_refs}");
    }
}
