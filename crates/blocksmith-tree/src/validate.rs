//! Structural-invariant checking for whole trees.
//!
//! The mutator keeps its own invariants, but it cannot protect against
//! malformed subtrees introduced by external means — a pasted fragment, a
//! document authored against a different depth policy, a buggy migration.
//! [`validate`] runs before persisting and after merging any externally
//! sourced subtree; findings are collected diagnostics, never errors, and
//! nothing here mutates.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use blocksmith_types::{BlockId, BlockNode};

use crate::depth::DepthPolicy;
use crate::flatten::sorted_children;

/// Which structural rule a violation breaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    /// A leaf-type node owns children.
    LeafWithChildren,
    /// A node sits past the configured max depth.
    MaxDepthExceeded,
    /// An id occurs more than once in the tree.
    DuplicateId,
    /// A child's `parent_id` does not name its owning parent.
    ParentMismatch,
    /// A child's `depth` is not its parent's depth + 1.
    DepthMismatch,
    /// A sibling list's `order` values are not exactly `0..n`.
    OrderNotDense,
}

impl Rule {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::LeafWithChildren => "LEAF_WITH_CHILDREN",
            Rule::MaxDepthExceeded => "MAX_DEPTH_EXCEEDED",
            Rule::DuplicateId => "DUPLICATE_ID",
            Rule::ParentMismatch => "PARENT_MISMATCH",
            Rule::DepthMismatch => "DEPTH_MISMATCH",
            Rule::OrderNotDense => "ORDER_NOT_DENSE",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One collected structural finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// The offending node (for [`Rule::OrderNotDense`], the parent).
    pub node_id: BlockId,
    /// The rule broken.
    pub rule: Rule,
    /// Human-readable detail for editor diagnostics.
    pub message: String,
}

impl Violation {
    fn new(node_id: &BlockId, rule: Rule, message: String) -> Self {
        Self {
            node_id: node_id.clone(),
            rule,
            message,
        }
    }
}

/// Check the core invariants over the whole tree rooted at `root`:
/// leaf-type nodes owning children, nodes past `policy.max_depth`
/// (reporting the measured depth), and duplicate ids.
///
/// All findings are reported independently — nothing short-circuits. An
/// empty result means the tree is safe to persist. Depth is measured
/// structurally from `root` (offset by `root.depth`, which is 0 for a
/// whole page), so stale `depth` fields cannot mask an overflow.
pub fn validate(root: &BlockNode, policy: &DepthPolicy) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen: HashMap<&BlockId, u32> = HashMap::new();
    walk(root, root.depth, policy, &mut violations, &mut seen);

    for (id, count) in seen {
        if count > 1 {
            violations.push(Violation::new(
                id,
                Rule::DuplicateId,
                format!("id {id} occurs {count} times"),
            ));
        }
    }
    violations
}

fn walk<'a>(
    node: &'a BlockNode,
    measured_depth: u32,
    policy: &DepthPolicy,
    violations: &mut Vec<Violation>,
    seen: &mut HashMap<&'a BlockId, u32>,
) {
    *seen.entry(&node.id).or_insert(0) += 1;

    if node.is_leaf() && !node.children.is_empty() {
        violations.push(Violation::new(
            &node.id,
            Rule::LeafWithChildren,
            format!(
                "leaf type {} owns {} children",
                node.kind,
                node.children.len()
            ),
        ));
    }

    if measured_depth > policy.max_depth {
        violations.push(Violation::new(
            &node.id,
            Rule::MaxDepthExceeded,
            format!(
                "node sits at depth {measured_depth}, max is {}",
                policy.max_depth
            ),
        ));
    }

    for child in &node.children {
        walk(child, measured_depth + 1, policy, violations, seen);
    }
}

/// Check the linkage bookkeeping the flat storage form depends on: child
/// `parent_id` back-references, child `depth` fields, and dense sibling
/// `order`. Run alongside [`validate`] when merging externally sourced
/// fragments — the mutator maintains these for its own edits.
pub fn validate_linkage(root: &BlockNode) -> Vec<Violation> {
    let mut violations = Vec::new();
    walk_linkage(root, &mut violations);
    violations
}

fn walk_linkage(parent: &BlockNode, violations: &mut Vec<Violation>) {
    for child in &parent.children {
        if child.parent_id.as_ref() != Some(&parent.id) {
            violations.push(Violation::new(
                &child.id,
                Rule::ParentMismatch,
                format!(
                    "parent_id is {:?}, owning parent is {}",
                    child.parent_id.as_ref().map(BlockId::as_str),
                    parent.id
                ),
            ));
        }
        if child.depth != parent.depth + 1 {
            violations.push(Violation::new(
                &child.id,
                Rule::DepthMismatch,
                format!(
                    "depth is {}, parent {} sits at depth {}",
                    child.depth, parent.id, parent.depth
                ),
            ));
        }
    }

    if !parent.children.is_empty() {
        let mut orders: Vec<u32> = sorted_children(parent).iter().map(|c| c.order).collect();
        orders.dedup();
        let dense = orders.len() == parent.children.len()
            && orders.iter().enumerate().all(|(i, o)| *o == i as u32);
        if !dense {
            violations.push(Violation::new(
                &parent.id,
                Rule::OrderNotDense,
                format!("sibling orders are not exactly 0..{}", parent.children.len()),
            ));
        }
    }

    for child in &parent.children {
        walk_linkage(child, violations);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::DepthPolicy;
    use crate::mutate::add_child;
    use blocksmith_types::{BlockNodeBuilder, BlockType};

    fn rules(violations: &[Violation]) -> Vec<Rule> {
        violations.iter().map(|v| v.rule).collect()
    }

    #[test]
    fn test_valid_tree_reports_nothing() {
        let policy = DepthPolicy::default();
        let mut root = BlockNode::with_id("r", BlockType::Container);
        let section = BlockNodeBuilder::new(BlockType::Section)
            .id("s")
            .child(BlockNode::with_id("t", BlockType::Text))
            .build();
        root = add_child(&root, section, &policy).unwrap();

        assert!(validate(&root, &policy).is_empty());
        assert!(validate_linkage(&root).is_empty());
    }

    #[test]
    fn test_leaf_with_children_flagged() {
        let mut leaf = BlockNode::with_id("t", BlockType::Text);
        leaf.children.push(BlockNode::with_id("x", BlockType::Text));

        let violations = validate(&leaf, &DepthPolicy::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, Rule::LeafWithChildren);
        assert_eq!(violations[0].node_id.as_str(), "t");
    }

    #[test]
    fn test_depth_overflow_flagged_with_measured_depth() {
        // Fragment authored against a looser policy: 3 levels, checked at max 1.
        let mut root = BlockNode::with_id("r", BlockType::Container);
        let mut section = BlockNode::with_id("s", BlockType::Section);
        let mut grid = BlockNode::with_id("g", BlockType::Grid);
        grid.children.push(BlockNode::with_id("t", BlockType::Text));
        section.children.push(grid);
        root.children.push(section);

        let violations = validate(&root, &DepthPolicy::new(1));
        let overflow: Vec<_> = violations
            .iter()
            .filter(|v| v.rule == Rule::MaxDepthExceeded)
            .collect();
        assert_eq!(overflow.len(), 2); // "g" at depth 2, "t" at depth 3
        assert!(overflow.iter().any(|v| v.node_id.as_str() == "g" && v.message.contains("depth 2")));
        assert!(overflow.iter().any(|v| v.node_id.as_str() == "t" && v.message.contains("depth 3")));
    }

    #[test]
    fn test_depth_measured_structurally_not_from_fields() {
        // Stale depth fields (all zero) cannot mask an overflow.
        let mut root = BlockNode::with_id("r", BlockType::Container);
        let mut s = BlockNode::with_id("s", BlockType::Section);
        s.children.push(BlockNode::with_id("t", BlockType::Text));
        root.children.push(s);

        let violations = validate(&root, &DepthPolicy::new(1));
        assert!(rules(&violations).contains(&Rule::MaxDepthExceeded));
    }

    #[test]
    fn test_duplicate_ids_flagged_once_per_id() {
        let mut root = BlockNode::with_id("r", BlockType::Container);
        root.children.push(BlockNode::with_id("dup", BlockType::Text));
        root.children.push(BlockNode::with_id("dup", BlockType::Text));
        root.children.push(BlockNode::with_id("ok", BlockType::Text));

        let violations = validate(&root, &DepthPolicy::default());
        let dups: Vec<_> = violations
            .iter()
            .filter(|v| v.rule == Rule::DuplicateId)
            .collect();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].node_id.as_str(), "dup");
        assert!(dups[0].message.contains("2 times"));
    }

    #[test]
    fn test_findings_are_independent_not_short_circuited() {
        // One tree breaking all three core rules reports all three.
        let mut root = BlockNode::with_id("r", BlockType::Container);
        let mut leaf = BlockNode::with_id("r", BlockType::Text); // duplicate of root
        leaf.children.push(BlockNode::with_id("deep", BlockType::Text));
        root.children.push(leaf);

        let violations = validate(&root, &DepthPolicy::new(1));
        let found = rules(&violations);
        assert!(found.contains(&Rule::LeafWithChildren));
        assert!(found.contains(&Rule::MaxDepthExceeded));
        assert!(found.contains(&Rule::DuplicateId));
    }

    #[test]
    fn test_validate_never_mutates() {
        let mut leaf = BlockNode::with_id("t", BlockType::Text);
        leaf.children.push(BlockNode::with_id("x", BlockType::Text));
        let before = leaf.clone();
        let _ = validate(&leaf, &DepthPolicy::default());
        let _ = validate_linkage(&leaf);
        assert_eq!(leaf, before);
    }

    // ── linkage supplement ──────────────────────────────────────────────

    #[test]
    fn test_linkage_flags_parent_mismatch() {
        let mut root = BlockNode::with_id("r", BlockType::Container);
        let mut child = BlockNode::with_id("c", BlockType::Text);
        child.parent_id = Some("elsewhere".into());
        child.depth = 1;
        root.children.push(child);

        let violations = validate_linkage(&root);
        assert_eq!(rules(&violations), vec![Rule::ParentMismatch]);
    }

    #[test]
    fn test_linkage_flags_depth_mismatch() {
        let mut root = BlockNode::with_id("r", BlockType::Container);
        let mut child = BlockNode::with_id("c", BlockType::Text);
        child.parent_id = Some("r".into());
        child.depth = 4;
        root.children.push(child);

        let violations = validate_linkage(&root);
        assert_eq!(rules(&violations), vec![Rule::DepthMismatch]);
    }

    #[test]
    fn test_linkage_flags_non_dense_order() {
        let mut root = BlockNode::with_id("r", BlockType::Container);
        for (id, order) in [("a", 0), ("b", 2)] {
            let mut child = BlockNode::with_id(id, BlockType::Text);
            child.parent_id = Some("r".into());
            child.depth = 1;
            child.order = order;
            root.children.push(child);
        }

        let violations = validate_linkage(&root);
        assert_eq!(rules(&violations), vec![Rule::OrderNotDense]);
        assert_eq!(violations[0].node_id.as_str(), "r");
    }

    #[test]
    fn test_linkage_flags_duplicate_order_values() {
        let mut root = BlockNode::with_id("r", BlockType::Container);
        for id in ["a", "b"] {
            let mut child = BlockNode::with_id(id, BlockType::Text);
            child.parent_id = Some("r".into());
            child.depth = 1;
            child.order = 0;
            root.children.push(child);
        }

        let violations = validate_linkage(&root);
        assert_eq!(rules(&violations), vec![Rule::OrderNotDense]);
    }

    #[test]
    fn test_violation_serializes_for_diagnostics() {
        let violation = Violation::new(
            &"t".into(),
            Rule::LeafWithChildren,
            "leaf type TEXT owns 1 children".to_string(),
        );
        let json = serde_json::to_string(&violation).unwrap();
        assert!(json.contains("\"nodeId\":\"t\""));
        assert!(json.contains("\"rule\":\"LEAF_WITH_CHILDREN\""));
    }
}
