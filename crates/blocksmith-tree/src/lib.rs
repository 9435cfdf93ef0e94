//! Block-tree manipulation and validation engine for Blocksmith pages.
//!
//! A page is a tree of composable blocks: container types own ordered
//! children, leaf types render atomic content. This crate is the one place
//! where the recursive structure is edited and checked — everything around
//! it (GraphQL persistence, React rendering, pointer handling, the
//! rich-text editor) consumes tree values produced here.
//!
//! # Design Philosophy
//!
//! Every operation is a pure function of its explicit inputs. Structural
//! edits return new tree values (functional updates) or a rejection with
//! the input untouched; nothing holds state between calls, performs I/O, or
//! suspends. Concurrent callers holding independent copies can never race.
//! Multi-writer merge over one shared reference is explicitly out of scope.
//!
//! # Modules
//!
//! - [`mutate`] — add/remove/update/reorder/clone, the only way blocks gain
//!   `order`/`depth`/`parent_id`
//! - [`validate`] — collected structural diagnostics for externally sourced
//!   trees, run before persisting
//! - [`flatten`] — ordering and linearization views, plus the flat
//!   block-list storage round trip
//! - [`depth`] — the configurable nesting-depth policy and drop-target
//!   checks
//! - [`bind`] — dynamic data binding for templated pages
//!
//! # Error Channels
//!
//! Three non-overlapping channels, none of which corrupt the tree or panic:
//!
//! - [`TreeError`] — a mutator call refused to apply (input unchanged)
//! - [`Violation`] — collected validator findings, surfaced as diagnostics
//! - [`BindingWarning`] — skipped bindings, collected during resolution

pub mod bind;
pub mod depth;
pub mod error;
pub mod flatten;
pub mod mutate;
pub mod validate;

pub use bind::{BindingWarning, Resolution, resolve};
pub use depth::{DEFAULT_MAX_DEPTH, DepthPolicy};
pub use error::TreeError;
pub use flatten::{flatten, from_block_list, max_depth, sorted_children, to_block_list};
pub use mutate::{add_child, clone_subtree, remove_child, reorder_children, update_child};
pub use validate::{Rule, Violation, validate, validate_linkage};

// Re-export the foundation types the engine's signatures are built from.
pub use blocksmith_types::{
    Binding, BlockId, BlockNode, BlockNodeBuilder, BlockPatch, BlockType, DataSourceKind,
    DynamicConfig, IdGenerator, SlugPattern, UuidIds,
};

/// Result type for structural tree edits.
pub type Result<T> = std::result::Result<T, TreeError>;
