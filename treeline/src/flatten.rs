//! Projects a node tree plus an expanded-key set into visible rows.

use log::trace;

use crate::node::{Key, KeySet, NodeData, ROOT_POS, TreeNode, merged_key, position};

/// A visible row in the flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenNode {
    /// Effective key (explicit key, or `pos`).
    pub key: Key,
    pub pos: String,
    /// Depth (top-level rows are level 0).
    pub level: usize,
    /// The node's own data (children excluded).
    pub data: NodeData,
    /// Whether the underlying node has children, visible or not.
    pub has_children: bool,
    /// Whether this row's children follow it in the flattened list.
    pub expanded: bool,
    pub parent: Option<Key>,
    /// Keys of the child rows that follow this one (empty when collapsed).
    pub children: Vec<Key>,
    /// Per ancestor level (including this row's own), whether that
    /// segment is the first sibling.
    pub is_start: Vec<bool>,
    /// Per ancestor level (including this row's own), whether that
    /// segment is the last sibling.
    pub is_end: Vec<bool>,
}

/// Flatten `roots`, descending only into nodes whose key is in `expanded`.
///
/// Collapsed subtrees are skipped entirely, so the cost is proportional to
/// the number of visible rows.
pub fn flatten_tree_data(roots: &[TreeNode], expanded: &KeySet) -> Vec<FlattenNode> {
    let mut out = Vec::new();
    collect_visible(roots, None, &|key: &str| expanded.contains(key), &mut out);
    trace!("Flattened {} rows ({} expanded keys)", out.len(), expanded.len());
    out
}

/// Flatten `roots` with every node expanded.
pub fn flatten_all(roots: &[TreeNode]) -> Vec<FlattenNode> {
    let mut out = Vec::new();
    collect_visible(roots, None, &|_: &str| true, &mut out);
    out
}

/// Index of the row with `key`, if visible.
pub fn row_index(rows: &[FlattenNode], key: &str) -> Option<usize> {
    rows.iter().position(|row| row.key == key)
}

fn collect_visible(
    nodes: &[TreeNode],
    parent: Option<&FlattenNode>,
    is_expanded: &dyn Fn(&str) -> bool,
    out: &mut Vec<FlattenNode>,
) {
    let parent_pos = parent.map(|p| p.pos.as_str()).unwrap_or(ROOT_POS);
    let last = nodes.len().saturating_sub(1);

    for (index, node) in nodes.iter().enumerate() {
        let pos = position(parent_pos, index);
        let key = merged_key(node.key(), &pos);
        let expanded = is_expanded(&key);

        let mut is_start = parent.map(|p| p.is_start.clone()).unwrap_or_default();
        is_start.push(index == 0);
        let mut is_end = parent.map(|p| p.is_end.clone()).unwrap_or_default();
        is_end.push(index == last);

        let children = if expanded {
            node.children
                .iter()
                .enumerate()
                .map(|(i, child)| merged_key(child.key(), &position(&pos, i)))
                .collect()
        } else {
            Vec::new()
        };

        let row = FlattenNode {
            key,
            pos,
            level: parent.map(|p| p.level + 1).unwrap_or(0),
            data: node.data.clone(),
            has_children: node.has_children(),
            expanded,
            parent: parent.map(|p| p.key.clone()),
            children,
            is_start,
            is_end,
        };

        if expanded && node.has_children() {
            // Children inherit the row's connector arrays, so keep a copy
            // around while they are emitted after it.
            out.push(row.clone());
            collect_visible(&node.children, Some(&row), is_expanded, out);
        } else {
            out.push(row);
        }
    }
}
