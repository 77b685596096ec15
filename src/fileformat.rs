//! A concrete, file-backed [`crate::reader::TreeSequenceReader`].
//!
//! The input tskit tree-sequence reader is explicitly out of scope for the
//! core (it's "an external collaborator identified only by the interface
//! the core consumes") — but the CLI still needs *something* concrete to
//! read from disk. This is a small line-oriented text format, not a tskit
//! binding: good enough to drive `sfkit-cli compress` end to end without
//! pulling in a tskit dependency the rest of the pack never uses.
//!
//! Format (whitespace-delimited tokens, `#` starts a comment, blank lines
//! ignored):
//! ```text
//! NUM_SAMPLES <n>
//! TREE <tree_id>
//! POSTORDER <ts_node ts_node ...>
//! NODE <ts_node> <child ts_node>...
//! ROOT <ts_node>
//! SITE <site_id> <tree_id> <ancestral_state>
//! MUTATION <site_id> <ts_node> <derived_state> <parent_mutation_id|-1>
//! ```

use crate::error::{Result, SfkitError};
use crate::ids::{SiteId, TreeId};
use crate::reader::{MutationRecord, TreeCursor, TreeSequenceReader, TsNodeId};
use crate::sequence::AllelicState;
use std::collections::HashMap;
use std::path::Path;

struct TreeDef {
    postorder: Vec<TsNodeId>,
    children: HashMap<TsNodeId, Vec<TsNodeId>>,
    root: TsNodeId,
}

pub struct FileTreeSequenceReader {
    num_samples: u32,
    trees: Vec<TreeDef>,
    ancestral: Vec<AllelicState>,
    mutations: Vec<Vec<MutationRecord>>,
    site_tree: Vec<TreeId>,
}

pub struct FileTreeCursor<'a> {
    tree_id: TreeId,
    def: &'a TreeDef,
    num_samples: u32,
}

impl<'a> TreeCursor for FileTreeCursor<'a> {
    fn tree_id(&self) -> TreeId {
        self.tree_id
    }
    fn postorder(&self) -> &[TsNodeId] {
        &self.def.postorder
    }
    fn children(&self, node: TsNodeId) -> &[TsNodeId] {
        self.def.children.get(&node).map(|v| v.as_slice()).unwrap_or(&[])
    }
    fn is_root(&self, node: TsNodeId) -> bool {
        node == self.def.root
    }
    fn is_sample(&self, node: TsNodeId) -> bool {
        node < self.num_samples
    }
}

impl TreeSequenceReader for FileTreeSequenceReader {
    type Cursor<'a> = FileTreeCursor<'a> where Self: 'a;

    fn num_samples(&self) -> u32 {
        self.num_samples
    }
    fn num_trees(&self) -> TreeId {
        self.trees.len() as TreeId
    }
    fn num_sites(&self) -> SiteId {
        self.ancestral.len() as SiteId
    }
    fn num_mutations(&self) -> crate::ids::MutationId {
        self.mutations.iter().map(|v| v.len() as crate::ids::MutationId).sum()
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
    fn tree(&self, tree_id: TreeId) -> FileTreeCursor<'_> {
        FileTreeCursor { tree_id, def: &self.trees[tree_id as usize], num_samples: self.num_samples }
    }
}

impl FileTreeSequenceReader {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| SfkitError::Io { path: path.display().to_string(), source })?;

        let mut num_samples = None;
        let mut trees: Vec<TreeDef> = Vec::new();
        let mut current: Option<TreeDef> = None;
        let mut sites_raw: Vec<(TreeId, AllelicState)> = Vec::new();
        let mut muts_raw: Vec<(SiteId, MutationRecord)> = Vec::new();

        let fail = |detail: String| SfkitError::InputViolatesContract { detail };

        for (lineno, raw_line) in text.lines().enumerate() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                ["NUM_SAMPLES", n] => {
                    num_samples = Some(n.parse::<u32>().map_err(|_| fail(format!("line {lineno}: bad NUM_SAMPLES")))?);
                }
                ["TREE", id] => {
                    if let Some(t) = current.take() {
                        trees.push(t);
                    }
                    let _ = id.parse::<TreeId>().map_err(|_| fail(format!("line {lineno}: bad TREE id")))?;
                    current = Some(TreeDef { postorder: Vec::new(), children: HashMap::new(), root: 0 });
                }
                ["POSTORDER", rest @ ..] => {
                    let def = current.as_mut().ok_or_else(|| fail(format!("line {lineno}: POSTORDER outside TREE")))?;
                    for tok in rest {
                        def.postorder.push(tok.parse().map_err(|_| fail(format!("line {lineno}: bad node id")))?);
                    }
                }
                ["NODE", node, rest @ ..] => {
                    let def = current.as_mut().ok_or_else(|| fail(format!("line {lineno}: NODE outside TREE")))?;
                    let node: TsNodeId = node.parse().map_err(|_| fail(format!("line {lineno}: bad node id")))?;
                    let mut children = Vec::with_capacity(rest.len());
                    for tok in rest {
                        children.push(tok.parse().map_err(|_| fail(format!("line {lineno}: bad child id")))?);
                    }
                    def.children.insert(node, children);
                }
                ["ROOT", node] => {
                    let def = current.as_mut().ok_or_else(|| fail(format!("line {lineno}: ROOT outside TREE")))?;
                    def.root = node.parse().map_err(|_| fail(format!("line {lineno}: bad root id")))?;
                }
                ["SITE", site, tree_id, ancestral] => {
                    let site: SiteId = site.parse().map_err(|_| fail(format!("line {lineno}: bad site id")))?;
                    let tree_id: TreeId = tree_id.parse().map_err(|_| fail(format!("line {lineno}: bad tree id")))?;
                    let ancestral: AllelicState =
                        ancestral.parse().map_err(|_| fail(format!("line {lineno}: bad ancestral state")))?;
                    if site as usize != sites_raw.len() {
                        return Err(fail(format!("line {lineno}: sites must be declared in order starting at 0")));
                    }
                    sites_raw.push((tree_id, ancestral));
                }
                ["MUTATION", site, node, derived, parent] => {
                    let site: SiteId = site.parse().map_err(|_| fail(format!("line {lineno}: bad site id")))?;
                    let node: TsNodeId = node.parse().map_err(|_| fail(format!("line {lineno}: bad node id")))?;
                    let derived: AllelicState = derived.parse().map_err(|_| fail(format!("line {lineno}: bad derived state")))?;
                    let parent: i64 = parent.parse().map_err(|_| fail(format!("line {lineno}: bad parent mutation id")))?;
                    let parent_mutation = if parent < 0 { None } else { Some(parent as crate::ids::MutationId) };
                    muts_raw.push((site, MutationRecord { site, node, derived_state: derived, parent_mutation }));
                }
                _ => return Err(fail(format!("line {lineno}: unrecognized directive `{line}`"))),
            }
        }
        if let Some(t) = current.take() {
            trees.push(t);
        }

        let num_samples = num_samples.ok_or_else(|| fail("missing NUM_SAMPLES directive".into()))?;
        let mut ancestral = Vec::with_capacity(sites_raw.len());
        let mut site_tree = Vec::with_capacity(sites_raw.len());
        for (tree_id, state) in sites_raw {
            site_tree.push(tree_id);
            ancestral.push(state);
        }
        let mut mutations = vec![Vec::new(); ancestral.len()];
        for (site, rec) in muts_raw {
            mutations[site as usize].push(rec);
        }

        Ok(FileTreeSequenceReader { num_samples, trees, ancestral, mutations, site_tree })
    }
}
