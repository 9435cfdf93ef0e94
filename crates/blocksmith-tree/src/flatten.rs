//! Read-only traversal and ordering views of a block tree.
//!
//! Linearizes the tree for diffing, flat-array storage, and list rendering.
//! Traversal is pre-order depth-first with an explicit work stack; children
//! are visited ascending by `order` and none of the functions here assume
//! the stored child vectors are pre-sorted.

use std::collections::{HashMap, HashSet};

use blocksmith_types::{BlockId, BlockNode};

/// Children of `node` in canonical render order (ascending `order`).
///
/// Stable for equal `order` values, so accidental ties keep their stored
/// relative position until the validator flags them.
pub fn sorted_children(node: &BlockNode) -> Vec<&BlockNode> {
    let mut children: Vec<&BlockNode> = node.children.iter().collect();
    children.sort_by_key(|c| c.order);
    children
}

/// Pre-order depth-first traversal yielding `(depth, node)` pairs.
///
/// Depth is relative to the traversal root (0 for `root` itself), so the
/// iterator works unchanged on subtrees. A node always precedes its
/// children; siblings appear ascending by `order`.
pub fn flatten(root: &BlockNode) -> Flatten<'_> {
    Flatten {
        stack: vec![(0, root)],
    }
}

/// Greatest `depth` value present in the tree (a tree of one root ⇒ that
/// root's depth, 0 for a whole page). Stored fields are reported as-is —
/// stale values in externally merged fragments are the validator's concern.
pub fn max_depth(root: &BlockNode) -> u32 {
    root.depth.max(
        root.children
            .iter()
            .map(max_depth)
            .max()
            .unwrap_or(root.depth),
    )
}

/// Longest downward path from `node` counted in edges (leaf ⇒ 0).
pub fn subtree_height(node: &BlockNode) -> u32 {
    node.children
        .iter()
        .map(|c| 1 + subtree_height(c))
        .max()
        .unwrap_or(0)
}

/// Iterator behind [`flatten`].
pub struct Flatten<'a> {
    stack: Vec<(u32, &'a BlockNode)>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = (u32, &'a BlockNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Push children in reverse canonical order so the lowest `order`
        // pops first.
        for child in sorted_children(node).into_iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

/// Flatten a tree into its storage form: pre-order block list, child vectors
/// emptied. Together with [`from_block_list`] this is the shape the page
/// document persists.
pub fn to_block_list(root: &BlockNode) -> Vec<BlockNode> {
    flatten(root)
        .map(|(_, node)| {
            let mut flat = node.clone();
            flat.children = Vec::new();
            flat
        })
        .collect()
}

/// Reassemble a tree from its flat storage form using `parent_id` links.
///
/// Children attach ascending by `order`. Blocks whose `parent_id` names a
/// block that is not in the list are dropped with a warning rather than
/// failing the whole page; extra roots beyond the first are dropped the same
/// way. Returns `None` when the list holds no root at all.
pub fn from_block_list(blocks: Vec<BlockNode>) -> Option<BlockNode> {
    let ids: HashSet<BlockId> = blocks.iter().map(|b| b.id.clone()).collect();

    let mut roots: Vec<BlockNode> = Vec::new();
    let mut by_parent: HashMap<BlockId, Vec<BlockNode>> = HashMap::new();
    for block in blocks {
        match &block.parent_id {
            None => roots.push(block),
            Some(parent) if ids.contains(parent) => {
                by_parent.entry(parent.clone()).or_default().push(block);
            }
            Some(parent) => {
                tracing::warn!(
                    "block {} references missing parent {}, dropping",
                    block.id,
                    parent
                );
            }
        }
    }

    if roots.len() > 1 {
        for extra in &roots[1..] {
            tracing::warn!("block list has extra root {}, dropping", extra.id);
        }
        roots.truncate(1);
    }
    let root = roots.pop()?;
    Some(attach_children(root, &mut by_parent))
}

fn attach_children(
    mut node: BlockNode,
    by_parent: &mut HashMap<BlockId, Vec<BlockNode>>,
) -> BlockNode {
    if let Some(mut children) = by_parent.remove(&node.id) {
        children.sort_by_key(|c| c.order);
        node.children = children
            .into_iter()
            .map(|c| attach_children(c, by_parent))
            .collect();
    }
    node
}

// ============================================================================
// Tests
// ============================================================================
