//! Error types for structural tree edits.
//!
//! Every variant is a *structural rejection*: the operation refused to apply
//! and the caller's tree value is untouched. Validation findings and binding
//! warnings are collected diagnostics, not errors — see `validate` and
//! `bind`.

use thiserror::Error;

use blocksmith_types::{BlockId, BlockType};

/// Errors that can occur during structural tree edits.
#[derive(Error, Debug)]
pub enum TreeError {
    /// Target parent is a leaf type and can never own children.
    #[error("parent block {id} has leaf type {kind} and cannot accept children")]
    InvalidParent { id: BlockId, kind: BlockType },

    /// The inserted subtree carries an id that already exists in the tree.
    #[error("block id already exists in tree: {0}")]
    DuplicateId(BlockId),

    /// Attaching would push a node past the nesting-depth policy.
    #[error("attach under {parent} would reach depth {depth}, exceeding max depth {max}")]
    DepthExceeded { parent: BlockId, depth: u32, max: u32 },

    /// The requested ordering is not a permutation of the current children.
    #[error("reorder rejected for {parent}: {reason}")]
    RejectedReorder { parent: BlockId, reason: String },
}
