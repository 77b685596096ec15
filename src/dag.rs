//! DAG compressed forest: a thin, post-ordered [`EdgeListGraph`]
//! wrapper exposing per-tree roots, sample (leaf) ids, node count, and
//! serialization.

use crate::graph::EdgeListGraph;
use crate::ids::{NodeId, SampleId, TreeId};
use crate::ids::SampleSet as SampleSetT;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DAGCompressedForest {
    graph: EdgeListGraph,
    num_samples: SampleId,
}

impl DAGCompressedForest {
    pub fn new(graph: EdgeListGraph, num_samples: SampleId) -> Self {
        DAGCompressedForest { graph, num_samples }
    }

    pub fn postorder_edges(&self) -> &EdgeListGraph {
        &self.graph
    }

    pub fn num_nodes(&self) -> NodeId {
        self.graph.num_nodes()
    }

    pub fn num_samples(&self) -> SampleId {
        self.num_samples
    }

    pub fn num_trees(&self) -> TreeId {
        self.graph.num_trees()
    }

    pub fn roots(&self) -> &[NodeId] {
        self.graph.roots()
    }

    pub fn num_unique_subtrees(&self) -> NodeId {
        self.graph.num_nodes()
    }

    pub fn is_sample(&self, node: NodeId) -> bool {
        node < self.num_samples
    }

    pub fn all_samples(&self) -> SampleSetT {
        let mut s = SampleSetT::new(self.num_samples);
        for id in 0..self.num_samples {
            s.add(id);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TraversalOrder;

    fn tiny_forest() -> DAGCompressedForest {
        let mut g = EdgeListGraph::with_traversal_order(TraversalOrder::Postorder);
        g.insert_leaf(0);
        g.insert_leaf(1);
        g.insert_edge(2, 0);
        g.insert_edge(2, 1);
        g.insert_root(2);
        g.set_num_nodes(3);
        DAGCompressedForest::new(g, 2)
    }

    #[test]
    fn basic_accessors() {
        let f = tiny_forest();
        assert_eq!(f.num_samples(), 2);
        assert_eq!(f.num_nodes(), 3);
        assert_eq!(f.num_trees(), 1);
        assert!(f.is_sample(0));
        assert!(!f.is_sample(2));
        assert_eq!(f.all_samples().popcount(), 2);
    }
}
