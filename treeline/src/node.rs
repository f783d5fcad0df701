//! Input node model.
//!
//! A tree is an ordered sequence of [`TreeNode`]s. Nodes are immutable for a
//! render cycle: whenever the caller swaps in a new tree, the index and the
//! flattened rows are rebuilt from scratch.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Node key. Keys must be unique across the whole tree.
pub type Key = String;

/// An ordered set of keys. Serializes as a JSON array.
pub type KeySet = BTreeSet<Key>;

/// Position path of the synthetic root. Every node position starts with it.
pub const ROOT_POS: &str = "0";

/// Per-node checkbox policy.
///
/// `Inherit` defers to the tree-level setting and is resolved once, while
/// indexing, into a concrete flag on each entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Checkable {
    #[default]
    Inherit,
    Enabled,
    Disabled,
}

impl Checkable {
    pub fn is_inherit(&self) -> bool {
        matches!(self, Checkable::Inherit)
    }

    /// Resolve against the tree-level default.
    pub fn resolve(self, tree_default: bool) -> bool {
        match self {
            Checkable::Inherit => tree_default,
            Checkable::Enabled => true,
            Checkable::Disabled => false,
        }
    }
}

impl From<Option<bool>> for Checkable {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Checkable::Inherit,
            Some(true) => Checkable::Enabled,
            Some(false) => Checkable::Disabled,
        }
    }
}

impl From<Checkable> for Option<bool> {
    fn from(value: Checkable) -> Self {
        match value {
            Checkable::Inherit => None,
            Checkable::Enabled => Some(true),
            Checkable::Disabled => Some(false),
        }
    }
}

/// The properties of a single node, without its children.
///
/// Unknown fields are kept in `extra` so auxiliary indices (see
/// [`crate::entity::FieldIndex`]) can key on caller-defined data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub key: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_checkbox: bool,
    #[serde(default, skip_serializing_if = "Checkable::is_inherit")]
    pub checkable: Checkable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_leaf: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectable: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    /// Whether the node opts out of checkbox conduction on its own
    /// (disabled, checkbox disabled, or explicitly not checkable).
    pub fn is_check_disabled(&self) -> bool {
        self.disabled || self.disable_checkbox || self.checkable == Checkable::Disabled
    }
}

/// A node of the input tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub data: NodeData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a node with the given key.
    pub fn new(key: impl Into<Key>) -> Self {
        Self {
            data: NodeData {
                key: Some(key.into()),
                ..Default::default()
            },
            children: Vec::new(),
        }
    }

    /// Create a node without a key; its position path will be used instead.
    pub fn unkeyed() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.data.title = Some(title.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.data.disabled = true;
        self
    }

    pub fn disable_checkbox(mut self) -> Self {
        self.data.disable_checkbox = true;
        self
    }

    pub fn checkable(mut self, checkable: bool) -> Self {
        self.data.checkable = Some(checkable).into();
        self
    }

    pub fn leaf(mut self, is_leaf: bool) -> Self {
        self.data.is_leaf = Some(is_leaf);
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.data.selectable = Some(selectable);
        self
    }

    /// Attach an extra, caller-defined field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.extra.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// The explicit key, if any.
    pub fn key(&self) -> Option<&str> {
        self.data.key.as_deref()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Build a nested tree from a flat `{ key, parentKey }` list.
    ///
    /// Sibling order follows record order. A record whose parent key is not
    /// in the list (or that is only reachable through a parent cycle) is
    /// promoted to a root.
    pub fn from_flat_list(records: Vec<FlatRecord>) -> Vec<TreeNode> {
        let mut by_key: HashMap<Key, usize> = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if let Some(key) = &record.data.key {
                by_key.insert(key.clone(), index);
            }
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
        let mut roots = Vec::new();
        for (index, record) in records.iter().enumerate() {
            match record.parent_key.as_ref() {
                Some(parent) => match by_key.get(parent) {
                    Some(&parent_index) if parent_index != index => {
                        children[parent_index].push(index)
                    }
                    _ => {
                        warn!("Tree record parent '{}' not found, treating as root", parent);
                        roots.push(index);
                    }
                },
                None => roots.push(index),
            }
        }

        let mut data: Vec<Option<NodeData>> = records.into_iter().map(|r| Some(r.data)).collect();
        let mut visited = vec![false; data.len()];
        let mut tree: Vec<TreeNode> = roots
            .into_iter()
            .filter_map(|index| assemble(index, &children, &mut data, &mut visited))
            .collect();

        // Anything left was only reachable through a parent cycle.
        for index in 0..visited.len() {
            if !visited[index] {
                warn!("Tree record at index {} is part of a parent cycle, treating as root", index);
                if let Some(node) = assemble(index, &children, &mut data, &mut visited) {
                    tree.push(node);
                }
            }
        }
        tree
    }
}

fn assemble(
    index: usize,
    children: &[Vec<usize>],
    data: &mut [Option<NodeData>],
    visited: &mut [bool],
) -> Option<TreeNode> {
    if visited[index] {
        return None;
    }
    visited[index] = true;
    let node_data = data[index].take()?;
    let kids = children[index]
        .iter()
        .filter_map(|&child| assemble(child, children, data, visited))
        .collect();
    Some(TreeNode {
        data: node_data,
        children: kids,
    })
}

/// One record of a flat `{ key, parentKey }` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    #[serde(flatten)]
    pub data: NodeData,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_key: Option<Key>,
}

impl FlatRecord {
    pub fn new(key: impl Into<Key>, parent_key: Option<&str>) -> Self {
        Self {
            data: NodeData {
                key: Some(key.into()),
                ..Default::default()
            },
            parent_key: parent_key.map(str::to_string),
        }
    }
}

/// Position path of the `index`-th child under `parent_pos`.
pub fn position(parent_pos: &str, index: usize) -> String {
    format!("{}-{}", parent_pos, index)
}

/// The effective key of a node: its explicit key, or its position path.
pub fn merged_key(key: Option<&str>, pos: &str) -> Key {
    match key {
        Some(key) => key.to_string(),
        None => pos.to_string(),
    }
}

/// Sibling indices below the synthetic root, e.g. `0-3-0` → `[3, 0]`.
pub(crate) fn pos_path(pos: &str) -> Vec<usize> {
    pos.split('-')
        .skip(1)
        .filter_map(|segment| segment.parse().ok())
        .collect()
}

/// The node at position path `pos`.
pub(crate) fn node_at_mut<'a>(roots: &'a mut [TreeNode], pos: &str) -> Option<&'a mut TreeNode> {
    let path = pos_path(pos);
    let (&first, rest) = path.split_first()?;
    let mut node = roots.get_mut(first)?;
    for &index in rest {
        node = node.children.get_mut(index)?;
    }
    Some(node)
}

/// Compare two position paths segment by segment, numerically.
///
/// This ordering equals document (pre-order) order.
pub fn compare_pos(a: &str, b: &str) -> Ordering {
    let left = a.split('-').map(|s| s.parse::<u64>().unwrap_or(0));
    let right = b.split('-').map(|s| s.parse::<u64>().unwrap_or(0));
    left.cmp(right)
}

/// Convert a primitive JSON value into a key.
///
/// Strings are used as-is and numbers by their decimal representation.
/// Anything else is not a key.
pub fn key_from_value(value: &Value) -> Option<Key> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_optional_key<'de, D>(deserializer: D) -> Result<Option<Key>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(key_from_value))
}

fn is_false(value: &bool) -> bool {
    !*value
}
