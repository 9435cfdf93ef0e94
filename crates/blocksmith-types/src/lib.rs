//! Shared block and binding-config types for Blocksmith.
//!
//! This crate is the data foundation of the page-composition engine: block
//! identifiers, the block-node tree shape, and the dynamic-binding
//! configuration persisted alongside a page. It has **no internal blocksmith
//! dependencies** — a pure leaf crate that the engine builds on.
//!
//! # Entity-Relationship Overview
//!
//! ```text
//! Page document (external storage collaborator)
//!     └── owns BlockNode tree (root depth 0)
//!     └── owns DynamicConfig (templated pages only)
//!
//! BlockNode (BlockId)
//!     └── kind: BlockType (container types may own children)
//!     └── children: Vec<BlockNode> ← the only ownership edge
//!     └── parent_id: Option<BlockId> ← non-owning back-reference
//!     └── content / style: opaque key→value maps for the renderer
//!
//! DynamicConfig
//!     └── slug_pattern matches the request URL (SlugPattern)
//!     └── bindings map record fields onto block content (Binding)
//! ```
//!
//! # Key Types
//!
//! |--------------------|----------------------------------------------|
//! | Type               | Purpose                                      |
//! |--------------------|----------------------------------------------|
//! | [`BlockId`]        | Opaque block identifier                      |
//! | [`IdGenerator`]    | Fresh-id seam used by subtree cloning        |
//! | [`BlockType`]      | What a block is (container vs. leaf)         |
//! | [`BlockNode`]      | One node of the page tree (persisted shape)  |
//! | [`BlockPatch`]     | Non-structural field updates                 |
//! | [`DynamicConfig`]  | Templated-page binding configuration         |
//! | [`SlugPattern`]    | URL template with named parameters           |
//! |--------------------|----------------------------------------------|

pub mod block;
pub mod dynamic;
pub mod ids;

// Re-export primary types at crate root for convenience.
pub use block::{BlockNode, BlockNodeBuilder, BlockPatch, BlockType};
pub use dynamic::{Binding, DataSourceKind, DynamicConfig, PatternError, SlugPattern};
pub use ids::{BlockId, IdGenerator, UuidIds};
