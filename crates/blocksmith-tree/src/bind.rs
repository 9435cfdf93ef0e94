//! Dynamic data binding: materializing templated pages from a record.
//!
//! [`resolve`] consumes a validated tree, the record the dynamic-page
//! collaborator fetched, and the page's [`DynamicConfig`], and returns a new
//! tree with bound values written into block content. Bindings are applied
//! independently of one another — each one reads only the record and writes
//! only its own target path, so the result is identical regardless of
//! application order.
//!
//! Failure tolerance: a source path that resolves to nothing is skipped
//! silently (records legitimately omit optional fields); a binding naming a
//! block the tree does not contain is collected as a [`BindingWarning`].
//! One misconfigured binding never blocks the rest of the page.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use blocksmith_types::{BlockId, BlockNode, DynamicConfig};

/// A skipped (not failed) data binding, collected for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingWarning {
    /// The block the binding named.
    pub block_id: BlockId,
    /// Why the binding was skipped.
    pub message: String,
}

impl fmt::Display for BindingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding for {} skipped: {}", self.block_id, self.message)
    }
}

/// Result of resolving a page: the bound tree plus collected warnings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// New tree value with bound content substituted in.
    pub tree: BlockNode,
    /// Bindings that were skipped, in binding-list order.
    pub warnings: Vec<BindingWarning>,
}

/// Apply every binding in `config` to `tree` against `record`.
///
/// Returns a new tree; the input is untouched. See the module docs for the
/// skip/warn contract and the order-independence guarantee.
pub fn resolve(tree: &BlockNode, record: &Value, config: &DynamicConfig) -> Resolution {
    let mut resolved = tree.clone();
    let mut warnings = Vec::new();

    for binding in &config.bindings {
        let Some(value) = lookup_path(record, &binding.source_field_path) else {
            // Absent source field: legitimate for optional record fields.
            continue;
        };

        let Some(node) = find_mut(&mut resolved, &binding.block_id) else {
            tracing::warn!(
                "binding targets unknown block {}, skipping",
                binding.block_id
            );
            warnings.push(BindingWarning {
                block_id: binding.block_id.clone(),
                message: format!("no block with id {} in tree", binding.block_id),
            });
            continue;
        };

        let (map, path) = select_target(node, &binding.target_property);
        let Some(path) = path else {
            tracing::warn!(
                "binding for {} has empty target property, skipping",
                binding.block_id
            );
            warnings.push(BindingWarning {
                block_id: binding.block_id.clone(),
                message: "target property names no key".to_string(),
            });
            continue;
        };
        write_path(map, &path, value.clone());
    }

    Resolution {
        tree: resolved,
        warnings,
    }
}

/// Dotted-path lookup into the record. Object keys and numeric array
/// indices both resolve; anything else is an absent value.
fn lookup_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |value, segment| {
        match value {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    })
}

/// Pick the node map a target property addresses.
///
/// The leading path segment selects the bag: `content.title` writes `title`
/// into the content map, `style.background` into the style map. Any other
/// leading segment is treated as a content key, so `title` and
/// `content.title` land in the same place. Returns `None` for a path with
/// no key left.
fn select_target<'a>(
    node: &'a mut BlockNode,
    target: &str,
) -> (&'a mut IndexMap<String, Value>, Option<Vec<String>>) {
    let segments: Vec<String> = target
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    match segments.split_first() {
        Some((first, rest)) if first == "style" => {
            let path = if rest.is_empty() { None } else { Some(rest.to_vec()) };
            (&mut node.style, path)
        }
        Some((first, rest)) if first == "content" => {
            let path = if rest.is_empty() { None } else { Some(rest.to_vec()) };
            (&mut node.content, path)
        }
        Some(_) => (&mut node.content, Some(segments)),
        None => (&mut node.content, None),
    }
}

/// Write `value` at a dotted path inside a content/style map, creating
/// intermediate objects as needed. A non-object intermediate is replaced —
/// the binding owns its target path.
fn write_path(map: &mut IndexMap<String, Value>, path: &[String], value: Value) {
    let (first, rest) = match path.split_first() {
        Some(split) => split,
        None => return,
    };

    if rest.is_empty() {
        map.insert(first.clone(), value);
        return;
    }

    let slot = map
        .entry(first.clone())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(serde_json::Map::new());
    }
    write_value_path(slot, rest, value);
}

fn write_value_path(target: &mut Value, path: &[String], value: Value) {
    let (first, rest) = match path.split_first() {
        Some(split) => split,
        None => return,
    };

    // Guaranteed object by the caller.
    let Value::Object(map) = target else { return };

    if rest.is_empty() {
        map.insert(first.clone(), value);
        return;
    }

    let slot = map
        .entry(first.clone())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(serde_json::Map::new());
    }
    write_value_path(slot, rest, value);
}

/// Mutable pre-order lookup anywhere in the subtree (self included).
fn find_mut<'a>(node: &'a mut BlockNode, id: &BlockId) -> Option<&'a mut BlockNode> {
    if node.id == *id {
        return Some(node);
    }
    node.children.iter_mut().find_map(|c| find_mut(c, id))
}

// ============================================================================
// Tests
// ============================================================================
