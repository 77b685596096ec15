//! Genomic sequence store: per-site ancestral state, per-mutation
//! tuples, and the prefix-sum mutation index that slices mutations by site.

use crate::ids::{MutationId, NodeId, SiteId, TreeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Single-byte allelic state. Biology-domain values (`A/C/G/T`) or small
/// numeric codes (`0..3`) both fit; the core never interprets the byte's
/// meaning, only its equality.
pub type AllelicState = u8;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    site_id: SiteId,
    tree_id: TreeId,
    node_id: NodeId,
    derived_state: AllelicState,
    parent_state: AllelicState,
    /// Global id (across the whole genome) of the mutation this one is
    /// nested under, if any — lets allele-frequency computation reconstruct
    /// the mutation-nesting tree at a site without re-walking the forest.
    parent_mutation: Option<MutationId>,
}

impl Mutation {
    pub fn new(
        site_id: SiteId,
        tree_id: TreeId,
        node_id: NodeId,
        derived_state: AllelicState,
        parent_state: AllelicState,
        parent_mutation: Option<MutationId>,
    ) -> Self {
        Mutation { site_id, tree_id, node_id, derived_state, parent_state, parent_mutation }
    }

    pub fn site_id(&self) -> SiteId {
        self.site_id
    }
    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }
    pub fn derived_state(&self) -> AllelicState {
        self.derived_state
    }
    pub fn parent_state(&self) -> AllelicState {
        self.parent_state
    }
    pub fn parent_mutation(&self) -> Option<MutationId> {
        self.parent_mutation
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenomicSequence {
    ancestral: Vec<AllelicState>,
    mutations: Vec<Mutation>,
    /// `mutation_index[s]..mutation_index[s+1]` slices `mutations` for site `s`.
    /// Length is `num_sites + 1` (prefix-sum with a trailing sentinel).
    mutation_index: Vec<MutationId>,
}

impl GenomicSequence {
    pub fn new() -> Self {
        GenomicSequence { ancestral: Vec::new(), mutations: Vec::new(), mutation_index: vec![0] }
    }

    pub fn num_sites(&self) -> SiteId {
        self.ancestral.len() as SiteId
    }

    pub fn num_mutations(&self) -> MutationId {
        self.mutations.len() as MutationId
    }

    pub fn ancestral_state(&self, site: SiteId) -> AllelicState {
        self.ancestral[site as usize]
    }

    pub fn mutations_at_site(&self, site: SiteId) -> &[Mutation] {
        let lo = self.mutation_index[site as usize] as usize;
        let hi = self.mutation_index[site as usize + 1] as usize;
        &self.mutations[lo..hi]
    }

    /// Global mutation id of the `local_idx`-th mutation at `site` — the id
    /// that a later mutation's `parent_mutation` would reference.
    pub fn global_mutation_id(&self, site: SiteId, local_idx: usize) -> MutationId {
        self.mutation_index[site as usize] + local_idx as MutationId
    }

    pub fn subtrees_with_mutations(&self) -> HashSet<NodeId> {
        self.mutations.iter().map(|m| m.node_id()).collect()
    }

    /// Push one site's ancestral state and its (possibly empty) mutation
    /// list. Mutations for a site must already be in the order the
    /// compressor emitted them (tree order within a site).
    pub fn push_site(&mut self, ancestral_state: AllelicState, mutations: impl IntoIterator<Item = Mutation>) {
        self.ancestral.push(ancestral_state);
        for m in mutations {
            self.mutations.push(m);
        }
        self.mutation_index.push(self.mutations.len() as MutationId);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_index_slices_correctly() {
        let mut seq = GenomicSequence::new();
        seq.push_site(0, vec![Mutation::new(0, 0, 4, 1, 0, None)]);
        seq.push_site(1, vec![]);
        seq.push_site(0, vec![Mutation::new(2, 1, 5, 1, 0, None), Mutation::new(2, 1, 6, 2, 1, Some(1))]);

        assert_eq!(seq.num_sites(), 3);
        assert_eq!(seq.num_mutations(), 3);
        assert_eq!(seq.mutations_at_site(0).len(), 1);
        assert_eq!(seq.mutations_at_site(1).len(), 0);
        assert_eq!(seq.mutations_at_site(2).len(), 2);
    }

    #[test]
    fn subtrees_with_mutations_dedupes_nodes() {
        let mut seq = GenomicSequence::new();
        seq.push_site(0, vec![Mutation::new(0, 0, 4, 1, 0, None), Mutation::new(0, 0, 4, 2, 1, Some(0))]);
        assert_eq!(seq.subtrees_with_mutations().len(), 1);
    }
}
