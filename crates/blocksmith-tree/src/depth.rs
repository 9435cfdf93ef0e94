//! Nesting-depth policy.
//!
//! Maximum nesting depth is a host policy (rendering/performance limit), not
//! a structural law, so it travels as configuration rather than a constant
//! baked into the engine. The editor uses [`DepthPolicy::can_accept_drop`]
//! to pre-filter drop targets; the mutator independently re-checks on
//! attach, and the validator reports violations in already-persisted data.

use serde::{Deserialize, Serialize};

use blocksmith_types::BlockNode;

/// Default maximum nesting depth when the host configures nothing.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Configurable nesting-depth limit for one page tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthPolicy {
    /// Greatest permitted `depth` value for any node (root is 0).
    pub max_depth: u32,
}

impl Default for DepthPolicy {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DepthPolicy {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }

    /// Check if `target` may receive one more level of nesting: it must be a
    /// container type and a new child must not exceed the depth limit.
    pub fn can_accept_drop(&self, target: &BlockNode) -> bool {
        target.is_container() && target.depth + 1 <= self.max_depth
    }

    /// Levels of nesting still available below `node`. Non-negative for any
    /// tree that has passed validation (saturates otherwise).
    pub fn remaining_depth(&self, node: &BlockNode) -> u32 {
        self.max_depth.saturating_sub(node.depth)
    }
}

// ============================================================================
// Tests
// ============================================================================
