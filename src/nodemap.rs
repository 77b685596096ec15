//! Hash→NodeId map: assigns dense sf-node ids to distinct subtree
//! fingerprints.

use crate::hash::SubtreeHash;
use crate::ids::NodeId;
use std::collections::HashMap;

/// Open-addressing (via `std::collections::HashMap`, keyed on the low 64
/// bits per [`SubtreeHash`]'s `Hash` impl, disambiguated by full 128-bit
/// `Eq`) map from subtree fingerprint to dense sf-node id.
#[derive(Default)]
pub struct SubtreeHashToNodeMap {
    map: HashMap<SubtreeHash, NodeId>,
    next_node_id: NodeId,
}

impl SubtreeHashToNodeMap {
    pub fn new() -> Self {
        SubtreeHashToNodeMap { map: HashMap::new(), next_node_id: 0 }
    }

    /// Reserve the first `next_node_id` dense ids for callers that assign
    /// them out of band (e.g. sample ids, fixed to `0..num_samples` by
    /// contract before any inner-node id is minted).
    pub fn starting_at(next_node_id: NodeId) -> Self {
        SubtreeHashToNodeMap { map: HashMap::new(), next_node_id }
    }

    /// Assign a fresh id to a fingerprint that must not already be present.
    pub fn insert_node(&mut self, hash: SubtreeHash) -> NodeId {
        debug_assert!(!self.contains(hash), "subtree hash already exists in the map");
        let id = self.next_node_id;
        self.map.insert(hash, id);
        self.next_node_id += 1;
        id
    }

    /// Always mint a fresh id, overwriting any existing mapping for `hash`.
    /// Used for tree roots: identical trees must still get distinct root ids.
    pub fn insert_or_update_node(&mut self, hash: SubtreeHash) -> NodeId {
        let id = self.next_node_id;
        self.map.insert(hash, id);
        self.next_node_id += 1;
        id
    }

    /// Mint an id for a root without recording its fingerprint — roots are
    /// never referred back to, so there is nothing to look up later.
    pub fn insert_root(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    pub fn contains(&self, hash: SubtreeHash) -> bool {
        self.map.contains_key(&hash)
    }

    pub fn find(&self, hash: SubtreeHash) -> Option<NodeId> {
        self.map.get(&hash).copied()
    }

    pub fn map_hash(&self, hash: SubtreeHash) -> NodeId {
        *self.map.get(&hash).expect("subtree hash does not exist in the map")
    }

    pub fn num_nodes(&self) -> NodeId {
        self.next_node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::SubtreeHasher;

    #[test]
    fn insert_then_find() {
        let mut map = SubtreeHashToNodeMap::new();
        let h = SubtreeHasher::hash_sample(1, 0);
        let id = map.insert_node(h);
        assert_eq!(map.find(h), Some(id));
        assert!(map.contains(h));
    }

    #[test]
    fn insert_or_update_always_mints_fresh_id() {
        let mut map = SubtreeHashToNodeMap::new();
        let h = SubtreeHasher::hash_sample(1, 0);
        let a = map.insert_or_update_node(h);
        let b = map.insert_or_update_node(h);
        assert_ne!(a, b);
        assert_eq!(map.find(h), Some(b));
    }

    #[test]
    fn roots_consume_ids_without_lookup() {
        let mut map = SubtreeHashToNodeMap::new();
        let r0 = map.insert_root();
        let r1 = map.insert_root();
        assert_ne!(r0, r1);
        assert_eq!(map.num_nodes(), 2);
    }
}
