//! The external tree-sequence reader interface: an out-of-core
//! collaborator the compressor consumes but never own. Modeled as
//! traits rather than a concrete tskit binding — the input reader, CLI
//! parsing, and CSV/metrics output are all explicitly out of scope for the
//! core; only the shape of what they must provide lives here.

use crate::sequence::AllelicState;
use crate::ids::{MutationId, SiteId, TreeId};

/// Node id in the caller's own numbering ("ts-node"), distinct from the
/// compressor's dense sf-node ids assigned during compression.
pub type TsNodeId = u32;

/// One mutation as delivered by the reader, already sorted by `site`.
#[derive(Copy, Clone, Debug)]
pub struct MutationRecord {
    pub site: SiteId,
    pub node: TsNodeId,
    pub derived_state: AllelicState,
    pub parent_mutation: Option<MutationId>,
}

/// Per-tree cursor: a postorder traversal of ts-node ids plus the
/// predicates the compressor needs to drive hashing and edge emission.
pub trait TreeCursor {
    fn tree_id(&self) -> TreeId;
    /// ts-node ids in postorder.
    fn postorder(&self) -> &[TsNodeId];
    fn children(&self, node: TsNodeId) -> &[TsNodeId];
    fn is_root(&self, node: TsNodeId) -> bool;
    fn is_sample(&self, node: TsNodeId) -> bool;
}

/// The reader the compressor is built against. Sample ids are required to
/// be `0..num_samples` — anything else aborts compression with
/// `SfkitError::InputViolatesContract`.
pub trait TreeSequenceReader {
    type Cursor<'a>: TreeCursor
    where
        Self: 'a;

    fn num_samples(&self) -> u32;
    fn num_trees(&self) -> TreeId;
    fn num_sites(&self) -> SiteId;
    fn num_mutations(&self) -> MutationId;
    fn sample_ids_are_consecutive(&self) -> bool;

    fn ancestral_state(&self, site: SiteId) -> AllelicState;
    /// Mutations at `site`, sorted by tree (a consequence of sites mapping
    /// monotonically to trees) and thus consumable in a single forward pass.
    fn mutations_at_site(&self, site: SiteId) -> &[MutationRecord];
    /// Which tree a site falls in. Non-decreasing in `site`, since sites map
    /// monotonically to trees.
    fn tree_id_for_site(&self, site: SiteId) -> TreeId;

    fn tree(&self, tree_id: TreeId) -> Self::Cursor<'_>;
}

/// Small, hand-built in-memory readers used only by tests — stands in for
/// the tskit-backed reader that is out of scope for the core.
pub mod fixtures {
    use super::*;

    pub struct FixtureCursor<'a> {
        fixture: &'a SingleTreeFixture,
    }

    impl<'a> TreeCursor for FixtureCursor<'a> {
        fn tree_id(&self) -> TreeId {
            0
        }
        fn postorder(&self) -> &[TsNodeId] {
            &self.fixture.postorder
        }
        fn children(&self, node: TsNodeId) -> &[TsNodeId] {
            self.fixture
                .children
                .iter()
                .find(|(n, _)| *n == node)
                .map(|(_, c)| c.as_slice())
                .unwrap_or(&[])
        }
        fn is_root(&self, node: TsNodeId) -> bool {
            node == self.fixture.root
        }
        fn is_sample(&self, node: TsNodeId) -> bool {
            node < self.fixture.num_samples
        }
    }

    /// A single tree over `num_samples` leaves, described by its postorder
    /// node list, each non-sample node's children, and its root.
    pub struct SingleTreeFixture {
        pub num_samples: u32,
        pub postorder: Vec<TsNodeId>,
        pub children: Vec<(TsNodeId, Vec<TsNodeId>)>,
        pub root: TsNodeId,
        pub ancestral: Vec<AllelicState>,
        pub mutations: Vec<Vec<MutationRecord>>,
    }

    impl TreeSequenceReader for SingleTreeFixture {
        type Cursor<'a> = FixtureCursor<'a> where Self: 'a;

        fn num_samples(&self) -> u32 {
            self.num_samples
        }
        fn num_trees(&self) -> TreeId {
            1
        }
        fn num_sites(&self) -> SiteId {
            self.ancestral.len() as SiteId
        }
        fn num_mutations(&self) -> MutationId {
            self.mutations.iter().map(|v| v.len() as MutationId).sum()
        }
        fn sample_ids_are_consecutive(&self) -> bool {
            true
        }
        fn ancestral_state(&self, site: SiteId) -> AllelicState {
            self.ancestral[site as usize]
        }
        fn mutations_at_site(&self, site: SiteId) -> &[MutationRecord] {
            &self.mutations[site as usize]
        }
        fn tree_id_for_site(&self, _site: SiteId) -> TreeId {
            0
        }
        fn tree(&self, tree_id: TreeId) -> FixtureCursor<'_> {
            debug_assert_eq!(tree_id, 0);
            FixtureCursor { fixture: self }
        }
    }

    /// A fully-resolved binary tree over 20 samples (19 internal nodes,
    /// ids 20-38), built by independently merging two leaf groups —
    /// `{0..=12}` and `{13..=19}` — before joining them at the root. Shaped
    /// to exercise `num_samples_below` at interior nodes whose descendant
    /// leaf span and query-set coverage diverge: some nodes carry every
    /// descendant leaf in the query set, some none, some a strict subset.
    pub fn timon_twenty_samples() -> SingleTreeFixture {
        let children = vec![
            (20, vec![13, 14]),
            (21, vec![20, 15]),
            (22, vec![16, 17]),
            (23, vec![22, 18]),
            (24, vec![23, 19]),
            (25, vec![21, 24]),
            (26, vec![9, 10]),
            (27, vec![11, 12]),
            (28, vec![26, 27]),
            (29, vec![0, 1]),
            (30, vec![29, 2]),
            (31, vec![30, 3]),
            (32, vec![31, 4]),
            (33, vec![5, 6]),
            (34, vec![33, 7]),
            (35, vec![32, 34]),
            (36, vec![35, 8]),
            (37, vec![36, 28]),
            (38, vec![25, 37]),
        ];
        let postorder = vec![
            13, 14, 20, 15, 21, 16, 17, 22, 18, 23, 19, 24, 25, 9, 10, 26, 11, 12, 27, 28, 0, 1, 29, 2, 30, 3, 31, 4,
            32, 5, 6, 33, 7, 34, 35, 8, 36, 37, 38,
        ];
        SingleTreeFixture { num_samples: 20, postorder, children, root: 38, ancestral: vec![], mutations: vec![] }
    }

    /// A 4-sample caterpillar tree: `((0,1)4,(2,3)5)6`.
    pub fn caterpillar_four_samples() -> SingleTreeFixture {
        SingleTreeFixture {
            num_samples: 4,
            postorder: vec![0, 1, 4, 2, 3, 5, 6],
            children: vec![(4, vec![0, 1]), (5, vec![2, 3]), (6, vec![4, 5])],
            root: 6,
            ancestral: vec![],
            mutations: vec![],
        }
    }

    struct TreeDef {
        postorder: Vec<TsNodeId>,
        children: Vec<(TsNodeId, Vec<TsNodeId>)>,
        root: TsNodeId,
    }

    pub struct MultiTreeCursor<'a> {
        tree_id: TreeId,
        def: &'a TreeDef,
        num_samples: u32,
    }

    impl<'a> TreeCursor for MultiTreeCursor<'a> {
        fn tree_id(&self) -> TreeId {
            self.tree_id
        }
        fn postorder(&self) -> &[TsNodeId] {
            &self.def.postorder
        }
        fn children(&self, node: TsNodeId) -> &[TsNodeId] {
            self.def
                .children
                .iter()
                .find(|(n, _)| *n == node)
                .map(|(_, c)| c.as_slice())
                .unwrap_or(&[])
        }
        fn is_root(&self, node: TsNodeId) -> bool {
            node == self.def.root
        }
        fn is_sample(&self, node: TsNodeId) -> bool {
            node < self.num_samples
        }
    }

    /// Several trees over a shared sample set, each with independent
    /// topology — used to exercise subtree reuse across trees (identical
    /// subtrees in different trees must fold to the same sf-node id).
    pub struct MultiTreeFixture {
        num_samples: u32,
        trees: Vec<TreeDef>,
        ancestral: Vec<AllelicState>,
        mutations: Vec<Vec<MutationRecord>>,
        site_tree: Vec<TreeId>,
    }

    impl MultiTreeFixture {
        pub fn new(
            num_samples: u32,
            trees: Vec<(Vec<TsNodeId>, Vec<(TsNodeId, Vec<TsNodeId>)>, TsNodeId)>,
            ancestral: Vec<AllelicState>,
            mutations: Vec<Vec<MutationRecord>>,
            site_tree: Vec<TreeId>,
        ) -> Self {
            debug_assert_eq!(ancestral.len(), site_tree.len());
            MultiTreeFixture {
                num_samples,
                trees: trees
                    .into_iter()
                    .map(|(postorder, children, root)| TreeDef { postorder, children, root })
                    .collect(),
                ancestral,
                mutations,
                site_tree,
            }
        }

        /// Three trees over 4 samples, each a flat star (root directly
        /// parenting all four samples) across disjoint intervals — no two
        /// trees share an inner subtree, so `num_unique_subtrees` is just
        /// the 4 samples plus one freshly-minted root per tree. One site
        /// per tree: two singleton mutations and one mutation pair (a
        /// root-level mutation overridden by a reversion at a single
        /// sample) producing a net count of three.
        pub fn three_trees_star_topology() -> Self {
            let postorder = vec![0, 1, 2, 3, 4];
            let children = vec![(4, vec![0, 1, 2, 3])];
            let root = 4;
            MultiTreeFixture::new(
                4,
                vec![
                    (postorder.clone(), children.clone(), root),
                    (postorder.clone(), children.clone(), root),
                    (postorder, children, root),
                ],
                vec![0, 0, 0],
                vec![
                    vec![MutationRecord { site: 0, node: 0, derived_state: 1, parent_mutation: None }],
                    vec![MutationRecord { site: 1, node: 1, derived_state: 1, parent_mutation: None }],
                    vec![
                        MutationRecord { site: 2, node: 4, derived_state: 1, parent_mutation: None },
                        MutationRecord { site: 2, node: 3, derived_state: 0, parent_mutation: Some(2) },
                    ],
                ],
                vec![0, 1, 2],
            )
        }

        /// Three identical caterpillar trees over 4 samples — grounds the
        /// "three identical trees encoded in BP" back-reference scenario.
        pub fn three_identical_caterpillars() -> Self {
            let postorder = vec![0, 1, 4, 2, 3, 5, 6];
            let children = vec![(4, vec![0, 1]), (5, vec![2, 3]), (6, vec![4, 5])];
            let root = 6;
            MultiTreeFixture::new(
                4,
                vec![
                    (postorder.clone(), children.clone(), root),
                    (postorder.clone(), children.clone(), root),
                    (postorder, children, root),
                ],
                vec![],
                vec![],
                vec![],
            )
        }
    }

    impl TreeSequenceReader for MultiTreeFixture {
        type Cursor<'a> = MultiTreeCursor<'a> where Self: 'a;

        fn num_samples(&self) -> u32 {
            self.num_samples
        }
        fn num_trees(&self) -> TreeId {
            self.trees.len() as TreeId
        }
        fn num_sites(&self) -> SiteId {
            self.ancestral.len() as SiteId
        }
        fn num_mutations(&self) -> MutationId {
            self.mutations.iter().map(|v| v.len() as MutationId).sum()
        }
        fn sample_ids_are_consecutive(&self) -> bool {
            true
        }
        fn ancestral_state(&self, site: SiteId) -> AllelicState {
            self.ancestral[site as usize]
        }
        fn mutations_at_site(&self, site: SiteId) -> &[MutationRecord] {
            &self.mutations[site as usize]
        }
        fn tree_id_for_site(&self, site: SiteId) -> TreeId {
            self.site_tree[site as usize]
        }
        fn tree(&self, tree_id: TreeId) -> MultiTreeCursor<'_> {
            MultiTreeCursor { tree_id, def: &self.trees[tree_id as usize], num_samples: self.num_samples }
        }
    }
}
