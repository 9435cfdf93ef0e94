//! Block types and the page-tree node shape.
//!
//! A page is a tree of [`BlockNode`]s. A fixed subset of [`BlockType`]s are
//! *container types* and may own ordered children; every other type is a
//! *leaf type* and renders atomic content. The node struct here is the exact
//! shape persisted as JSON inside the page document — the storage
//! collaborator reads and writes it verbatim.
//!
//! ## Design: ownership vs. back-reference
//!
//! `children` is the only ownership edge in the model. `parent_id` is a
//! plain non-owning back-reference used for lookup when the tree is stored
//! as a flat block list; it never carries lifetime or sharing semantics.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::EnumString;

use crate::ids::BlockId;

/// What a block *is* (render type).
///
/// Container types (`Container`, `Section`, `Grid`, `FlexRow`, `FlexColumn`)
/// may own children. The remaining variants are leaf types — atomic content
/// that must never own children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    /// Generic container.
    Container,
    /// Page section (top-level container).
    Section,
    /// CSS-grid container.
    Grid,
    /// Horizontal flex container.
    FlexRow,
    /// Vertical flex container.
    FlexColumn,
    /// Plain text.
    #[default]
    Text,
    /// Heading text.
    Heading,
    /// Rich text (edited by the rich-text collaborator).
    RichText,
    /// Image.
    Image,
    /// Video embed.
    Video,
    /// Button / call to action.
    Button,
    /// Horizontal rule.
    Divider,
    /// Vertical whitespace.
    Spacer,
    /// Arbitrary third-party embed.
    Embed,
}

impl BlockType {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Container => "CONTAINER",
            BlockType::Section => "SECTION",
            BlockType::Grid => "GRID",
            BlockType::FlexRow => "FLEX_ROW",
            BlockType::FlexColumn => "FLEX_COLUMN",
            BlockType::Text => "TEXT",
            BlockType::Heading => "HEADING",
            BlockType::RichText => "RICH_TEXT",
            BlockType::Image => "IMAGE",
            BlockType::Video => "VIDEO",
            BlockType::Button => "BUTTON",
            BlockType::Divider => "DIVIDER",
            BlockType::Spacer => "SPACER",
            BlockType::Embed => "EMBED",
        }
    }

    /// Check if this type may own children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockType::Container
                | BlockType::Section
                | BlockType::Grid
                | BlockType::FlexRow
                | BlockType::FlexColumn
        )
    }

    /// Check if this type renders atomic content (must never own children).
    pub fn is_leaf(&self) -> bool {
        !self.is_container()
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One node of the page-composition tree.
///
/// This is the persisted shape: serde field names match the page document
/// JSON (camelCase, `"type"` for the block type). Empty maps and child lists
/// are omitted on the wire.
///
/// ## Invariants (enforced by the engine, checked by its validator)
///
/// - children non-empty ⇒ `kind` is a container type
/// - each child's `parent_id` names this node and its `depth` is ours + 1
/// - sibling `order` values are exactly `0..n`
/// - ids are unique across the whole tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockNode {
    /// Block id — unique across the whole tree.
    pub id: BlockId,
    /// Render type (container vs. leaf).
    #[serde(rename = "type")]
    pub kind: BlockType,
    /// Non-owning back-reference to the parent block (None at the root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<BlockId>,
    /// Position within the sibling list — dense, ascending defines render order.
    #[serde(default)]
    pub order: u32,
    /// Edge-distance from the tree root (0 at the root).
    #[serde(default)]
    pub depth: u32,
    /// Leaf content — opaque to the engine, interpreted by the renderer.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, Value>,
    /// Styling — opaque to the engine, interpreted by the renderer.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub style: IndexMap<String, Value>,
    /// Owned children, canonical order ascending by `order`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    /// Create a root-positioned node with a freshly generated id.
    pub fn new(kind: BlockType) -> Self {
        Self::with_id(BlockId::generate(), kind)
    }

    /// Create a root-positioned node with a caller-chosen id.
    pub fn with_id(id: impl Into<BlockId>, kind: BlockType) -> Self {
        Self {
            id: id.into(),
            kind,
            parent_id: None,
            order: 0,
            depth: 0,
            content: IndexMap::new(),
            style: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Check if this node's type may own children.
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Check if this node's type renders atomic content.
    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    /// Look up a direct child by id.
    pub fn child(&self, id: &BlockId) -> Option<&BlockNode> {
        self.children.iter().find(|c| c.id == *id)
    }

    /// Look up any node in this subtree by id (pre-order search, self included).
    pub fn find(&self, id: &BlockId) -> Option<&BlockNode> {
        if self.id == *id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Check if an id occurs anywhere in this subtree (self included).
    pub fn contains_id(&self, id: &BlockId) -> bool {
        self.find(id).is_some()
    }

    /// Total number of nodes in this subtree (self included).
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(BlockNode::node_count).sum::<usize>()
    }
}

/// Non-structural field updates for a block.
///
/// Structural fields (id, parent_id, depth, order, children) are not
/// representable here — a patch can only touch what the editor's property
/// panel edits. `None` fields are left untouched; `Some` fields replace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    /// Replace the block's render type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<BlockType>,
    /// Replace the content map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, Value>>,
    /// Replace the style map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<IndexMap<String, Value>>,
}

impl BlockPatch {
    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.content.is_none() && self.style.is_none()
    }
}

/// Builder for [`BlockNode`] — reduces boilerplate for content-rich nodes.
///
/// Starts from the node kind (id generated unless overridden) and sane
/// defaults for the rest.
///
/// ```
/// # use blocksmith_types::*;
/// let hero = BlockNodeBuilder::new(BlockType::Heading)
///     .id("hero")
///     .content_entry("text", "Welcome")
///     .style_entry("fontSize", 32)
///     .build();
/// assert_eq!(hero.id.as_str(), "hero");
/// ```
pub struct BlockNodeBuilder {
    node: BlockNode,
}

impl BlockNodeBuilder {
    /// Start building a node of the given kind with a generated id.
    pub fn new(kind: BlockType) -> Self {
        Self {
            node: BlockNode::new(kind),
        }
    }

    pub fn id(mut self, id: impl Into<BlockId>) -> Self {
        self.node.id = id.into();
        self
    }

    pub fn parent_id(mut self, id: impl Into<BlockId>) -> Self {
        self.node.parent_id = Some(id.into());
        self
    }

    pub fn order(mut self, order: u32) -> Self {
        self.node.order = order;
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.node.depth = depth;
        self
    }

    pub fn content_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.node.content.insert(key.into(), value.into());
        self
    }

    pub fn style_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.node.style.insert(key.into(), value.into());
        self
    }

    pub fn content(mut self, content: IndexMap<String, Value>) -> Self {
        self.node.content = content;
        self
    }

    pub fn style(mut self, style: IndexMap<String, Value>) -> Self {
        self.node.style = style;
        self
    }

    /// Append a pre-built child. The builder does not touch order/depth —
    /// attach through the engine's mutator to get invariants assigned.
    pub fn child(mut self, child: BlockNode) -> Self {
        self.node.children.push(child);
        self
    }

    /// Consume the builder and return the node.
    pub fn build(self) -> BlockNode {
        self.node
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── BlockType ───────────────────────────────────────────────────────

    #[test]
    fn test_block_type_parsing() {
        assert_eq!(BlockType::from_str("CONTAINER"), Some(BlockType::Container));
        assert_eq!(BlockType::from_str("FLEX_ROW"), Some(BlockType::FlexRow));
        assert_eq!(BlockType::from_str("flex_column"), Some(BlockType::FlexColumn));
        assert_eq!(BlockType::from_str("Rich_Text"), Some(BlockType::RichText));
        assert_eq!(BlockType::from_str("invalid"), None);
    }

    #[test]
    fn test_block_type_container_classification() {
        for t in [
            BlockType::Container,
            BlockType::Section,
            BlockType::Grid,
            BlockType::FlexRow,
            BlockType::FlexColumn,
        ] {
            assert!(t.is_container(), "{t} should be a container type");
            assert!(!t.is_leaf());
        }
        for t in [
            BlockType::Text,
            BlockType::Heading,
            BlockType::RichText,
            BlockType::Image,
            BlockType::Video,
            BlockType::Button,
            BlockType::Divider,
            BlockType::Spacer,
            BlockType::Embed,
        ] {
            assert!(t.is_leaf(), "{t} should be a leaf type");
            assert!(!t.is_container());
        }
    }

    #[test]
    fn test_block_type_serde_roundtrip() {
        let json = serde_json::to_string(&BlockType::FlexRow).unwrap();
        assert_eq!(json, "\"FLEX_ROW\"");
        let parsed: BlockType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BlockType::FlexRow);
    }

    #[test]
    fn test_block_type_as_str_matches_wire_form() {
        for t in [BlockType::RichText, BlockType::FlexColumn, BlockType::Text] {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    // ── BlockNode ───────────────────────────────────────────────────────

    #[test]
    fn test_node_new_defaults() {
        let node = BlockNode::new(BlockType::Section);
        assert_eq!(node.kind, BlockType::Section);
        assert!(node.parent_id.is_none());
        assert_eq!(node.order, 0);
        assert_eq!(node.depth, 0);
        assert!(node.content.is_empty());
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_node_find_searches_subtree() {
        let mut root = BlockNode::with_id("r", BlockType::Container);
        let mut section = BlockNode::with_id("s", BlockType::Section);
        section.children.push(BlockNode::with_id("t", BlockType::Text));
        root.children.push(section);

        assert_eq!(root.find(&"r".into()).unwrap().id.as_str(), "r");
        assert_eq!(root.find(&"t".into()).unwrap().id.as_str(), "t");
        assert!(root.find(&"missing".into()).is_none());
        assert!(root.contains_id(&"t".into()));
        assert_eq!(root.node_count(), 3);
    }

    #[test]
    fn test_node_child_is_direct_only() {
        let mut root = BlockNode::with_id("r", BlockType::Container);
        let mut section = BlockNode::with_id("s", BlockType::Section);
        section.children.push(BlockNode::with_id("t", BlockType::Text));
        root.children.push(section);

        assert!(root.child(&"s".into()).is_some());
        assert!(root.child(&"t".into()).is_none());
    }

    #[test]
    fn test_node_serde_wire_shape() {
        let node = BlockNodeBuilder::new(BlockType::Heading)
            .id("hero")
            .content_entry("text", "Welcome")
            .build();
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"HEADING\""));
        assert!(json.contains("\"id\":\"hero\""));
        // Empty/None fields absent, not null
        assert!(!json.contains("parentId"));
        assert!(!json.contains("style"));
        assert!(!json.contains("children"));
    }

    #[test]
    fn test_node_serde_roundtrip() {
        let mut root = BlockNode::with_id("r", BlockType::Container);
        let mut child = BlockNode::with_id("c", BlockType::Text);
        child.parent_id = Some("r".into());
        child.depth = 1;
        child.content.insert("text".into(), "hi".into());
        root.children.push(child);

        let json = serde_json::to_string(&root).unwrap();
        assert!(json.contains("\"parentId\":\"r\""));
        let parsed: BlockNode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, root);
    }

    #[test]
    fn test_node_deserializes_sparse_document() {
        // Storage may omit everything the wire form skips.
        let parsed: BlockNode =
            serde_json::from_str(r#"{"id":"hero","type":"TEXT"}"#).unwrap();
        assert_eq!(parsed.id.as_str(), "hero");
        assert_eq!(parsed.kind, BlockType::Text);
        assert_eq!(parsed.order, 0);
        assert!(parsed.children.is_empty());
    }

    #[test]
    fn test_node_content_preserves_insertion_order() {
        let node = BlockNodeBuilder::new(BlockType::Image)
            .content_entry("src", "/a.png")
            .content_entry("alt", "A")
            .content_entry("caption", "c")
            .build();
        let keys: Vec<_> = node.content.keys().cloned().collect();
        assert_eq!(keys, vec!["src", "alt", "caption"]);
    }

    // ── BlockPatch ──────────────────────────────────────────────────────

    #[test]
    fn test_patch_default_is_empty() {
        assert!(BlockPatch::default().is_empty());
    }

    #[test]
    fn test_patch_serde_skips_absent_fields() {
        let patch = BlockPatch {
            kind: Some(BlockType::Button),
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, "{\"type\":\"BUTTON\"}");
    }

    // ── Builder ─────────────────────────────────────────────────────────

    #[test]
    fn test_builder_minimal() {
        let node = BlockNodeBuilder::new(BlockType::Text).build();
        assert_eq!(node.kind, BlockType::Text);
        assert!(!node.id.as_str().is_empty());
    }

    #[test]
    fn test_builder_exhaustive() {
        // Exercises every builder method to catch any that forget to map their field.
        let child = BlockNode::with_id("c", BlockType::Text);
        let node = BlockNodeBuilder::new(BlockType::Grid)
            .id("g")
            .parent_id("r")
            .order(3)
            .depth(2)
            .content_entry("gap", 8)
            .style_entry("background", "#fff")
            .child(child)
            .build();

        assert_eq!(node.id.as_str(), "g");
        assert_eq!(node.parent_id.as_ref().unwrap().as_str(), "r");
        assert_eq!(node.order, 3);
        assert_eq!(node.depth, 2);
        assert_eq!(node.content.get("gap"), Some(&serde_json::json!(8)));
        assert_eq!(node.style.get("background"), Some(&serde_json::json!("#fff")));
        assert_eq!(node.children.len(), 1);
    }

}
