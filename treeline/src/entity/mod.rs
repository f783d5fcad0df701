//! Key-addressable index over a node tree.
//!
//! The index is an arena: entities are owned by the key → entity map, and
//! `parent`/`children` are plain keys used for navigation. The whole index
//! is rebuilt whenever the input tree changes.

mod indexer;

use std::collections::HashMap;

use crate::node::{Key, KeySet, NodeData};

pub use indexer::{EntityHooks, FieldIndex, IndexOptions, build_entities, build_entities_with};

/// One indexed node, augmented with structural metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEntity {
    /// Effective key (explicit key, or `pos` when the node has none).
    pub key: Key,
    /// Position path, e.g. `0-3-0` for the first child of the fourth root.
    pub pos: String,
    /// Ordinal index among siblings.
    pub index: usize,
    /// Depth (top-level nodes are level 0).
    pub level: usize,
    pub parent: Option<Key>,
    pub children: Vec<Key>,
    /// The node's own data (children excluded).
    pub node: NodeData,
    /// Node or tree is disabled.
    pub disabled: bool,
    /// Node is excluded from checkbox conduction.
    pub check_disabled: bool,
}

impl KeyEntity {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// The key → entity index produced by [`build_entities`].
#[derive(Debug, Clone, Default)]
pub struct KeyEntities {
    pub(crate) entities: HashMap<Key, KeyEntity>,
    pub(crate) roots: Vec<Key>,
    pub(crate) duplicates: Vec<Key>,
    pub(crate) max_level: usize,
}

impl KeyEntities {
    pub fn get(&self, key: &str) -> Option<&KeyEntity> {
        self.entities.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entities.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over all entities (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &KeyEntity> {
        self.entities.values()
    }

    /// Keys of the top-level nodes, in order.
    pub fn roots(&self) -> &[Key] {
        &self.roots
    }

    /// Keys that appeared more than once while indexing. The last
    /// occurrence in document order owns the key.
    pub fn duplicate_keys(&self) -> &[Key] {
        &self.duplicates
    }

    /// Deepest level present in the tree.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    pub fn parent_of(&self, key: &str) -> Option<&KeyEntity> {
        let entity = self.get(key)?;
        let parent = self.get(entity.parent.as_deref()?)?;
        // Duplicate keys can make a parent key resolve elsewhere; only
        // strictly shallower entities count as parents.
        (parent.level < entity.level).then_some(parent)
    }

    /// Child entities of `key`, in sibling order.
    pub fn children_of<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a KeyEntity> + use<'a> {
        let entity = self.get(key);
        let level = entity.map(|e| e.level).unwrap_or(0);
        entity
            .into_iter()
            .flat_map(|e| e.children.iter())
            .filter_map(move |child| self.get(child))
            .filter(move |child| child.level > level)
    }

    /// Ancestors of `key`, nearest first.
    pub fn ancestors(&self, key: &str) -> Vec<&KeyEntity> {
        let mut out = Vec::new();
        let mut current = key;
        while let Some(parent) = self.parent_of(current) {
            out.push(parent);
            current = &parent.key;
        }
        out
    }

    /// `key` and all of its descendants, in document order.
    pub fn subtree_keys(&self, key: &str) -> Vec<Key> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            out.push(current.to_string());
            let children: Vec<&KeyEntity> = self.children_of(current).collect();
            stack.extend(children.iter().rev().map(|c| c.key.as_str()));
        }
        out
    }

    /// Every key that has children (the "expand all" set).
    pub fn expandable_keys(&self) -> KeySet {
        self.entities
            .values()
            .filter(|e| e.has_children())
            .map(|e| e.key.clone())
            .collect()
    }
}

/// Expand `keys` together with all of their ancestors.
///
/// Keys missing from the index are skipped.
pub fn conduct_expand_parent<'a>(
    keys: impl IntoIterator<Item = &'a Key>,
    entities: &KeyEntities,
) -> KeySet {
    let mut expanded = KeySet::new();
    for key in keys {
        if !entities.contains(key) || !expanded.insert(key.clone()) {
            continue;
        }
        for ancestor in entities.ancestors(key) {
            if !expanded.insert(ancestor.key.clone()) {
                break;
            }
        }
    }
    expanded
}
