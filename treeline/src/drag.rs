//! Data side of drag-reordering.
//!
//! Pointer handling and drop indicators belong to the renderer; this module
//! only answers "what is being dragged" and applies a drop to the tree.

use log::debug;

use crate::entity::{IndexOptions, KeyEntities, build_entities};
use crate::error::TreeError;
use crate::node::{Key, TreeNode, pos_path};

/// Where a dragged node lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    /// Sibling, directly before the target.
    Before,
    /// Last child of the target.
    Inside,
    /// Sibling, directly after the target.
    After,
}

/// The row currently hovered during a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOver {
    pub key: Key,
    pub position: DropPosition,
}

impl DragOver {
    pub fn new(key: impl Into<Key>, position: DropPosition) -> Self {
        Self {
            key: key.into(),
            position,
        }
    }
}

/// The dragged key plus all of its descendants.
///
/// Empty when `key` is not in the index.
pub fn drag_nodes_keys(key: &str, entities: &KeyEntities) -> Vec<Key> {
    entities.subtree_keys(key)
}

/// Whether dropping `drag_key` at `drop_key` is structurally allowed.
pub fn allow_drop(drag_key: &str, drop_key: &str, entities: &KeyEntities) -> bool {
    validate_drop(drag_key, drop_key, entities).is_ok()
}

/// Move the subtree rooted at `drag_key` relative to `drop_key`.
///
/// The tree is left untouched when the move is rejected.
pub fn move_node(
    roots: &mut Vec<TreeNode>,
    drag_key: &str,
    drop_key: &str,
    position: DropPosition,
) -> Result<(), TreeError> {
    let entities = build_entities(roots, &IndexOptions::default());
    validate_drop(drag_key, drop_key, &entities)?;

    let (Some(drag), Some(drop)) = (entities.get(drag_key), entities.get(drop_key)) else {
        return Err(invalid(drag_key, drop_key, "node not found"));
    };
    let drag_path = pos_path(&drag.pos);
    let mut drop_path = pos_path(&drop.pos);

    let (drag_index, drag_parent) = split_last(&drag_path);
    let node = match siblings_mut(roots, drag_parent) {
        Some(siblings) if drag_index < siblings.len() => siblings.remove(drag_index),
        _ => return Err(invalid(drag_key, drop_key, "node not found")),
    };

    // Removing the dragged node shifts later siblings on its level.
    let depth = drag_parent.len();
    if drop_path.len() > depth
        && drop_path[..depth] == *drag_parent
        && drop_path[depth] > drag_index
    {
        drop_path[depth] -= 1;
    }

    let (drop_index, drop_parent) = split_last(&drop_path);
    let (target, insert_at) = match position {
        DropPosition::Inside => (drop_path.as_slice(), None),
        DropPosition::Before => (drop_parent, Some(drop_index)),
        DropPosition::After => (drop_parent, Some(drop_index + 1)),
    };

    match siblings_mut(roots, target) {
        Some(siblings) => {
            let at = insert_at.unwrap_or(siblings.len()).min(siblings.len());
            siblings.insert(at, node);
            debug!("Moved '{}' {:?} '{}'", drag_key, position, drop_key);
            Ok(())
        }
        None => {
            if let Some(siblings) = siblings_mut(roots, drag_parent) {
                siblings.insert(drag_index, node);
            }
            Err(invalid(drag_key, drop_key, "drop target vanished"))
        }
    }
}

fn validate_drop(drag_key: &str, drop_key: &str, entities: &KeyEntities) -> Result<(), TreeError> {
    if !entities.contains(drag_key) || !entities.contains(drop_key) {
        return Err(invalid(drag_key, drop_key, "node not found"));
    }
    if entities.subtree_keys(drag_key).iter().any(|k| k == drop_key) {
        return Err(invalid(drag_key, drop_key, "cannot drop a node into its own subtree"));
    }
    Ok(())
}

fn invalid(drag: &str, drop: &str, reason: &'static str) -> TreeError {
    TreeError::InvalidDrop {
        drag: drag.to_string(),
        drop: drop.to_string(),
        reason,
    }
}

fn split_last(path: &[usize]) -> (usize, &[usize]) {
    match path.split_last() {
        Some((last, parent)) => (*last, parent),
        None => (0, &[]),
    }
}

fn siblings_mut<'a>(roots: &'a mut Vec<TreeNode>, parent: &[usize]) -> Option<&'a mut Vec<TreeNode>> {
    let mut siblings = roots;
    for &index in parent {
        siblings = &mut siblings.get_mut(index)?.children;
    }
    Some(siblings)
}
