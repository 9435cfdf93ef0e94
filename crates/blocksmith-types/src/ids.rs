//! Opaque block identifiers and the id-generation seam.
//!
//! A [`BlockId`] is an opaque string, unique within one page tree. Generated
//! ids are UUIDv7 hex (time-ordered, collision-free without coordination),
//! but the type never assumes that shape — externally authored documents use
//! human-chosen ids like `"hero"` and those are first-class. The `short()`
//! form (first 8 chars) is for human-facing UI, never a lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque block identifier, unique within one page tree.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh time-ordered id (UUIDv7, 32-char hex).
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().as_simple().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters — for human display only, not lookup.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Source of fresh block ids.
///
/// Subtree cloning consumes ids through this seam so callers control
/// generation — production uses [`UuidIds`], tests may substitute a
/// deterministic counter.
pub trait IdGenerator {
    /// Produce an id guaranteed collision-free in the destination tree.
    fn generate(&mut self) -> BlockId;
}

/// Production id source: time-ordered UUIDv7 hex.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn generate(&mut self) -> BlockId {
        BlockId::generate()
    }
}

// ============================================================================
// Tests
// ============================================================================
