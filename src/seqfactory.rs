//! Sequence factory: advances through mutations sorted by site,
//! translates ts-node ids to sf-node ids using the live per-tree mapper,
//! and emits records into the genomic sequence store.

use crate::error::{Result, SfkitError};
use crate::ids::{MutationId, NodeId, SiteId, TreeId};
use crate::reader::{TreeSequenceReader, TsNodeId};
use crate::sequence::{GenomicSequence, Mutation};
use std::collections::HashMap;

/// Carries state across the whole forest-compression pass (not just one
/// tree): the running site cursor and the derived-state-by-mutation-id
/// table a later mutation's `parent_state` is resolved against.
pub struct SequenceFactory {
    site_cursor: SiteId,
    next_mutation_id: MutationId,
    derived_state_by_id: Vec<crate::sequence::AllelicState>,
    store: GenomicSequence,
}

impl SequenceFactory {
    pub fn new() -> Self {
        SequenceFactory {
            site_cursor: 0,
            next_mutation_id: 0,
            derived_state_by_id: Vec::new(),
            store: GenomicSequence::new(),
        }
    }

    /// Consume every site belonging to `tree_id`, translating each
    /// mutation's ts-node to its sf-node via `ts_to_sf`. Must be called
    /// once per tree, in tree-id order, after that tree's mapper is fully
    /// populated.
    pub fn advance_through_tree<R: TreeSequenceReader>(
        &mut self,
        reader: &R,
        tree_id: TreeId,
        ts_to_sf: &HashMap<TsNodeId, NodeId>,
    ) -> Result<()> {
        while self.site_cursor < reader.num_sites() && reader.tree_id_for_site(self.site_cursor) == tree_id {
            let site = self.site_cursor;
            let ancestral = reader.ancestral_state(site);
            let records = reader.mutations_at_site(site);
            let mut resolved = Vec::with_capacity(records.len());
            for rec in records {
                let parent_state = match rec.parent_mutation {
                    Some(pid) => *self.derived_state_by_id.get(pid as usize).ok_or_else(|| {
                        SfkitError::InputViolatesContract {
                            detail: format!("mutation parent id {pid} arrived before its parent"),
                        }
                    })?,
                    None => ancestral,
                };
                let sf_node = *ts_to_sf.get(&rec.node).ok_or_else(|| SfkitError::InputViolatesContract {
                    detail: format!("mutation at site {site} references node {} outside its tree", rec.node),
                })?;
                resolved.push(Mutation::new(site, tree_id, sf_node, rec.derived_state, parent_state, rec.parent_mutation));
                debug_assert_eq!(self.next_mutation_id as usize, self.derived_state_by_id.len());
                self.derived_state_by_id.push(rec.derived_state);
                self.next_mutation_id += 1;
            }
            self.store.push_site(ancestral, resolved);
            self.site_cursor += 1;
        }
        Ok(())
    }

    /// Finalize: every site must have been consumed by some tree.
    pub fn finish<R: TreeSequenceReader>(self, reader: &R) -> Result<GenomicSequence> {
        if self.site_cursor != reader.num_sites() {
            return Err(SfkitError::InputViolatesContract {
                detail: format!(
                    "sequence factory stalled at site {} of {}: mutation stream not in tree order",
                    self.site_cursor,
                    reader.num_sites()
                ),
            });
        }
        Ok(self.store)
    }
}

impl Default for SequenceFactory {
    fn default() -> Self {
        Self::new()
    }
}
