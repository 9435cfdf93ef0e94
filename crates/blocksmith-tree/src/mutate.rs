//! Structural edit operations on block trees.
//!
//! Every operation is a pure function: it borrows the current parent value
//! and returns a fresh one (functional-update semantics). A rejected
//! operation returns [`TreeError`] and the caller's value is untouched —
//! there is no partially applied state to roll back.
//!
//! Attach goes through [`add_child`] only; nodes never receive `order`,
//! `depth`, or `parent_id` by ad hoc field assignment. That keeps the
//! sibling-order and depth invariants local to this module.

use blocksmith_types::{BlockId, BlockNode, BlockPatch, IdGenerator};

use crate::depth::DepthPolicy;
use crate::error::TreeError;
use crate::flatten::{flatten, subtree_height};
use crate::Result;

/// Attach `new_node` (possibly a whole pasted/cloned subtree) as the last
/// child of `parent`.
///
/// Rejections, in check order:
/// - [`TreeError::InvalidParent`] — `parent` is a leaf type.
/// - [`TreeError::DuplicateId`] — an id in the incoming subtree already
///   occurs under `parent`. Whole-tree uniqueness is re-checked by
///   `validate` before persistence; this seam can only see the subtree it
///   is handed.
/// - [`TreeError::DepthExceeded`] — the deepest incoming node would land
///   past `policy.max_depth`. The editor's drop-target filter makes this
///   unreachable in normal flows; the mutator re-checks anyway.
///
/// On success the new child gets `order` = max sibling order + 1 (0 when
/// there are no siblings), `parent_id` and `depth` assigned, and every
/// descendant's `parent_id`/`depth` renormalized to its new position.
pub fn add_child(parent: &BlockNode, new_node: BlockNode, policy: &DepthPolicy) -> Result<BlockNode> {
    if !parent.is_container() {
        return Err(TreeError::InvalidParent {
            id: parent.id.clone(),
            kind: parent.kind,
        });
    }

    for (_, incoming) in flatten(&new_node) {
        if parent.contains_id(&incoming.id) {
            return Err(TreeError::DuplicateId(incoming.id.clone()));
        }
    }

    let deepest = parent.depth + 1 + subtree_height(&new_node);
    if deepest > policy.max_depth {
        return Err(TreeError::DepthExceeded {
            parent: parent.id.clone(),
            depth: deepest,
            max: policy.max_depth,
        });
    }

    let mut updated = parent.clone();
    let mut child = new_node;
    child.order = updated
        .children
        .iter()
        .map(|c| c.order)
        .max()
        .map_or(0, |m| m + 1);
    child.parent_id = Some(updated.id.clone());
    child.depth = updated.depth + 1;
    renormalize(&mut child);
    updated.children.push(child);
    Ok(updated)
}

/// Remove the direct child `child_id` and its entire subtree.
///
/// Survivors are renumbered densely from 0, preserving their relative
/// order. A missing id is a silent no-op: editor flows routinely race a
/// remove against an already-completed remove.
pub fn remove_child(parent: &BlockNode, child_id: &BlockId) -> BlockNode {
    let mut updated = parent.clone();
    let before = updated.children.len();
    updated.children.retain(|c| c.id != *child_id);
    if updated.children.len() != before {
        renumber(&mut updated.children);
    }
    updated
}

/// Replace the fields present in `patch` on the direct child `child_id`.
///
/// Structural fields are not representable in a [`BlockPatch`], so they
/// cannot be touched here. Switching a populated container to a leaf type
/// is permitted at this seam and flagged by the validator. A missing id is
/// a silent no-op, mirroring [`remove_child`].
pub fn update_child(parent: &BlockNode, child_id: &BlockId, patch: BlockPatch) -> BlockNode {
    let mut updated = parent.clone();
    if let Some(child) = updated.children.iter_mut().find(|c| c.id == *child_id) {
        if let Some(kind) = patch.kind {
            child.kind = kind;
        }
        if let Some(content) = patch.content {
            child.content = content;
        }
        if let Some(style) = patch.style {
            child.style = style;
        }
    }
    updated
}

/// Reorder `parent`'s children to match `ordered_ids` exactly.
///
/// `ordered_ids` must be a permutation of the current children's ids —
/// same set, same cardinality — or the call fails with
/// [`TreeError::RejectedReorder`] and `parent` is unchanged. On success the
/// children follow the given sequence with `order` reassigned 0..n.
pub fn reorder_children(parent: &BlockNode, ordered_ids: &[BlockId]) -> Result<BlockNode> {
    if ordered_ids.len() != parent.children.len() {
        return Err(TreeError::RejectedReorder {
            parent: parent.id.clone(),
            reason: format!(
                "expected {} ids, got {}",
                parent.children.len(),
                ordered_ids.len()
            ),
        });
    }

    let current: std::collections::HashSet<&BlockId> =
        parent.children.iter().map(|c| &c.id).collect();
    let requested: std::collections::HashSet<&BlockId> = ordered_ids.iter().collect();
    if current != requested {
        return Err(TreeError::RejectedReorder {
            parent: parent.id.clone(),
            reason: "ids are not a permutation of the current children".to_string(),
        });
    }

    let mut updated = parent.clone();
    let mut pool: Vec<BlockNode> = std::mem::take(&mut updated.children);
    for (position, id) in ordered_ids.iter().enumerate() {
        // Permutation check above guarantees the id is present.
        if let Some(at) = pool.iter().position(|c| c.id == *id) {
            let mut child = pool.swap_remove(at);
            child.order = position as u32;
            updated.children.push(child);
        }
    }
    Ok(updated)
}

/// Deep-copy `node` and all descendants with fresh ids from `ids`.
///
/// Content, style, and relative `order`/`depth` are preserved (clone root
/// at depth 0); descendant `parent_id`s are rewritten to their cloned
/// parents. The clone root's `parent_id` is left unset and its `order`
/// zeroed — attach it with [`add_child`], which assigns both.
pub fn clone_subtree(node: &BlockNode, ids: &mut impl IdGenerator) -> BlockNode {
    let mut clone = clone_at(node, None, 0, ids);
    clone.order = 0;
    clone
}

fn clone_at(
    node: &BlockNode,
    parent_id: Option<&BlockId>,
    depth: u32,
    ids: &mut impl IdGenerator,
) -> BlockNode {
    let id = ids.generate();
    let children = node
        .children
        .iter()
        .map(|c| clone_at(c, Some(&id), depth + 1, ids))
        .collect();
    BlockNode {
        id: id.clone(),
        kind: node.kind,
        parent_id: parent_id.cloned(),
        order: node.order,
        depth,
        content: node.content.clone(),
        style: node.style.clone(),
        children,
    }
}

/// Rewrite descendant `parent_id`/`depth` below an already-positioned node.
fn renormalize(node: &mut BlockNode) {
    let id = node.id.clone();
    let depth = node.depth;
    for child in &mut node.children {
        child.parent_id = Some(id.clone());
        child.depth = depth + 1;
        renormalize(child);
    }
}

/// Reassign dense `order` values 0..n preserving relative order.
fn renumber(children: &mut [BlockNode]) {
    children.sort_by_key(|c| c.order);
    for (position, child) in children.iter_mut().enumerate() {
        child.order = position as u32;
    }
}

// ============================================================================
// Tests
// ============================================================================
