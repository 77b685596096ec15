//! `EdgeListGraph`: a post-ordered list of directed parent→child edges
//! plus root/leaf sets, a traversal-order tag, and its invariant checks.

use crate::error::{Result, SfkitError};
use crate::ids::{EdgeId, NodeId, SampleId, TraversalOrder, INVALID_NODE_ID};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    from: NodeId,
    to: NodeId,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Edge { from, to }
    }
    pub fn from(&self) -> NodeId {
        self.from
    }
    pub fn to(&self) -> NodeId {
        self.to
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SortBy {
    FromVertex,
    ToVertex,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeListGraph {
    num_nodes: NodeId,
    edges: Vec<Edge>,
    roots: Vec<NodeId>,
    leaves: Vec<NodeId>,
    traversal_order: TraversalOrder,
}

impl EdgeListGraph {
    pub fn new() -> Self {
        EdgeListGraph {
            num_nodes: INVALID_NODE_ID,
            edges: Vec::new(),
            roots: Vec::new(),
            leaves: Vec::new(),
            traversal_order: TraversalOrder::Unordered,
        }
    }

    pub fn with_traversal_order(traversal_order: TraversalOrder) -> Self {
        let mut g = Self::new();
        g.traversal_order = traversal_order;
        g
    }

    pub fn insert_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges.push(Edge::new(from, to));
    }

    pub fn insert_root(&mut self, root: NodeId) {
        self.roots.push(root);
    }

    pub fn insert_leaf(&mut self, leaf: NodeId) {
        self.leaves.push(leaf);
    }

    pub fn num_edges(&self) -> EdgeId {
        self.edges.len() as EdgeId
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    pub fn roots(&self) -> &[NodeId] {
        debug_assert!(Self::unique(&self.roots));
        &self.roots
    }

    pub fn num_roots(&self) -> NodeId {
        debug_assert!(Self::unique(&self.roots));
        self.roots.len() as NodeId
    }

    pub fn num_trees(&self) -> u32 {
        self.num_roots()
    }

    pub fn leaves(&self) -> &[NodeId] {
        debug_assert!(Self::unique(&self.leaves));
        &self.leaves
    }

    pub fn num_leaves(&self) -> SampleId {
        debug_assert!(Self::unique(&self.leaves));
        self.leaves.len() as SampleId
    }

    pub fn directed(&self) -> bool {
        true
    }

    pub fn traversal_order(&self) -> TraversalOrder {
        self.traversal_order
    }

    pub fn set_traversal_order(&mut self, order: TraversalOrder) {
        self.traversal_order = order;
    }

    pub fn is_postorder(&self) -> bool {
        self.traversal_order == TraversalOrder::Postorder
    }

    pub fn is_unordered(&self) -> bool {
        self.traversal_order == TraversalOrder::Unordered
    }

    /// Rebuilds the distinct-endpoint set — O(edges + leaves + roots).
    /// Expensive; intended for tests and `compute_num_nodes`, not hot paths.
    pub fn nodes(&self) -> HashSet<NodeId> {
        let mut nodes = HashSet::with_capacity(2 * self.leaves.len() + self.roots.len());
        for edge in &self.edges {
            nodes.insert(edge.from());
            nodes.insert(edge.to());
        }
        for &r in &self.roots {
            nodes.insert(r);
        }
        for &l in &self.leaves {
            nodes.insert(l);
        }
        nodes
    }

    pub fn compute_num_nodes(&mut self) {
        self.num_nodes = self.nodes().len() as NodeId;
    }

    pub fn set_num_nodes(&mut self, num_nodes: NodeId) {
        debug_assert!(!self.num_nodes_is_set(), "the number of nodes is already set");
        self.num_nodes = num_nodes;
    }

    pub fn num_nodes(&self) -> NodeId {
        debug_assert!(self.num_nodes_is_set(), "the number of nodes is not set");
        self.num_nodes
    }

    pub fn num_nodes_is_set(&self) -> bool {
        self.num_nodes != INVALID_NODE_ID
    }

    /// Testable property, not a runtime requirement on queries: every leaf
    /// starts visited, every edge's `to` must already be visited before
    /// `from` is marked visited, and every root must end up visited.
    pub fn check_postorder(&self) -> bool {
        let mut visited = vec![false; self.num_nodes() as usize];
        for &leaf in &self.leaves {
            visited[leaf as usize] = true;
        }
        for edge in &self.edges {
            if !visited[edge.to() as usize] {
                return false;
            }
            visited[edge.from() as usize] = true;
        }
        for &root in &self.roots {
            if !visited[root as usize] {
                return false;
            }
        }
        visited.iter().all(|&v| v)
    }

    pub fn sort_edges_by<F>(&mut self, mut cmp: F, traversal_order: TraversalOrder)
    where
        F: FnMut(&Edge, &Edge) -> std::cmp::Ordering,
    {
        self.traversal_order = traversal_order;
        self.edges.sort_by(|a, b| cmp(a, b));
    }

    pub fn sort_edges(&mut self, sort_by: SortBy) {
        match sort_by {
            SortBy::FromVertex => self.sort_edges_by(|a, b| a.from().cmp(&b.from()), TraversalOrder::Unordered),
            SortBy::ToVertex => self.sort_edges_by(|a, b| a.to().cmp(&b.to()), TraversalOrder::Unordered),
        }
    }

    pub fn edges_are_sorted(&self, sort_by: SortBy) -> bool {
        let key = |e: &Edge| match sort_by {
            SortBy::FromVertex => e.from(),
            SortBy::ToVertex => e.to(),
        };
        self.edges.windows(2).all(|w| key(&w[0]) <= key(&w[1]))
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.leaves.contains(&node)
    }

    fn unique(nodes: &[NodeId]) -> bool {
        let mut set = HashSet::with_capacity(nodes.len());
        nodes.iter().all(|&n| set.insert(n))
    }

    /// Validates the two input-contract invariants that must hold
    /// regardless of assertion level: roots and leaves are each unique.
    pub fn validate_unique_root_and_leaf_sets(&self) -> Result<()> {
        if !Self::unique(&self.roots) {
            return Err(SfkitError::InvariantViolation { detail: "roots are not unique".into() });
        }
        if !Self::unique(&self.leaves) {
            return Err(SfkitError::InvariantViolation { detail: "leaves are not unique".into() });
        }
        Ok(())
    }
}

impl Default for EdgeListGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_graph() -> EdgeListGraph {
        // leaves 0,1 -> inner 2 -> root 2
        let mut g = EdgeListGraph::with_traversal_order(TraversalOrder::Postorder);
        g.insert_leaf(0);
        g.insert_leaf(1);
        g.insert_edge(2, 0);
        g.insert_edge(2, 1);
        g.insert_root(2);
        g.set_num_nodes(3);
        g
    }

    #[test]
    fn postorder_check_passes_for_valid_graph() {
        let g = chain_graph();
        assert!(g.check_postorder());
    }

    #[test]
    fn postorder_check_fails_when_child_unvisited() {
        let mut g = EdgeListGraph::with_traversal_order(TraversalOrder::Postorder);
        g.insert_leaf(0);
        // 1 is never registered as a leaf or visited before being used as `to`
        g.insert_edge(2, 1);
        g.insert_edge(2, 0);
        g.insert_root(2);
        g.set_num_nodes(3);
        assert!(!g.check_postorder());
    }

    #[test]
    fn compute_num_nodes_counts_distinct_endpoints() {
        let mut g = chain_graph();
        g.num_nodes = crate::ids::INVALID_NODE_ID;
        g.compute_num_nodes();
        assert_eq!(g.num_nodes(), 3);
    }

    #[test]
    fn sort_edges_drops_traversal_order_tag() {
        let mut g = chain_graph();
        g.sort_edges(SortBy::ToVertex);
        assert!(g.is_unordered());
        assert!(g.edges_are_sorted(SortBy::ToVertex));
    }
}
