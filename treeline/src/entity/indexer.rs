//! Builds the [`KeyEntities`] index in a single pre-order traversal.

use std::collections::HashMap;

use log::{debug, warn};

use crate::node::{Key, ROOT_POS, TreeNode, key_from_value, merged_key, position};

use super::{KeyEntities, KeyEntity};

/// Tree-level settings that individual nodes inherit while indexing.
#[derive(Debug, Clone, Copy)]
pub struct IndexOptions {
    /// Default for nodes whose `checkable` is `Inherit`.
    pub checkable: bool,
    /// Whole tree disabled.
    pub disabled: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            checkable: true,
            disabled: false,
        }
    }
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkable(mut self, checkable: bool) -> Self {
        self.checkable = checkable;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Side-effect hooks run during indexing, so callers can build auxiliary
/// indices without a second traversal.
pub trait EntityHooks {
    /// Called once per entity, in document order.
    fn process_entity(&mut self, _entity: &KeyEntity) {}

    /// Called once after the traversal completes.
    fn on_process_finished(&mut self, _entities: &KeyEntities) {}
}

impl EntityHooks for () {}

/// Secondary index from a caller-defined node field to the node's key.
///
/// Reads the field from [`crate::node::NodeData::extra`]; string and number
/// values are indexed, anything else is ignored.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    field: String,
    entries: HashMap<String, Key>,
}

impl FieldIndex {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            entries: HashMap::new(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Key of the node whose field equals `value`.
    pub fn get(&self, value: &str) -> Option<&Key> {
        self.entries.get(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntityHooks for FieldIndex {
    fn process_entity(&mut self, entity: &KeyEntity) {
        if let Some(value) = entity.node.extra.get(&self.field).and_then(key_from_value) {
            self.entries.insert(value, entity.key.clone());
        }
    }

    fn on_process_finished(&mut self, entities: &KeyEntities) {
        debug!(
            "FieldIndex '{}': {} of {} entities indexed",
            self.field,
            self.entries.len(),
            entities.len()
        );
    }
}

/// Index `roots` with default options and no hooks.
pub fn build_entities(roots: &[TreeNode], options: &IndexOptions) -> KeyEntities {
    build_entities_with(roots, options, &mut ())
}

/// Index `roots`, invoking `hooks` during the same traversal.
///
/// Duplicate keys are not fatal: the later entity (in document order)
/// replaces the earlier one and the key is reported through
/// [`KeyEntities::duplicate_keys`].
pub fn build_entities_with<H: EntityHooks + ?Sized>(
    roots: &[TreeNode],
    options: &IndexOptions,
    hooks: &mut H,
) -> KeyEntities {
    let mut entities = KeyEntities::default();
    let root_keys = child_keys(roots, ROOT_POS);
    entities.roots = root_keys.clone();

    let mut indexer = Indexer {
        options,
        hooks: &mut *hooks,
        out: &mut entities,
    };
    indexer.traverse(roots, None, ROOT_POS, 0, &root_keys);

    debug!(
        "Indexed {} entities ({} roots, max level {})",
        entities.len(),
        entities.roots.len(),
        entities.max_level
    );
    hooks.on_process_finished(&entities);
    entities
}

struct Indexer<'a, H: EntityHooks + ?Sized> {
    options: &'a IndexOptions,
    hooks: &'a mut H,
    out: &'a mut KeyEntities,
}

impl<H: EntityHooks + ?Sized> Indexer<'_, H> {
    fn traverse(
        &mut self,
        nodes: &[TreeNode],
        parent: Option<&Key>,
        parent_pos: &str,
        level: usize,
        keys: &[Key],
    ) {
        for (index, (node, key)) in nodes.iter().zip(keys).enumerate() {
            let pos = position(parent_pos, index);
            let children = child_keys(&node.children, &pos);

            let entity = KeyEntity {
                key: key.clone(),
                pos: pos.clone(),
                index,
                level,
                parent: parent.cloned(),
                children: children.clone(),
                node: node.data.clone(),
                disabled: self.options.disabled || node.data.disabled,
                check_disabled: node.data.disabled
                    || node.data.disable_checkbox
                    || !node.data.checkable.resolve(self.options.checkable),
            };
            self.hooks.process_entity(&entity);

            if let Some(previous) = self.out.entities.insert(key.clone(), entity) {
                warn!(
                    "Duplicate tree key '{}' at {} (previously at {})",
                    key, pos, previous.pos
                );
                self.out.duplicates.push(key.clone());
            }
            self.out.max_level = self.out.max_level.max(level);

            self.traverse(&node.children, Some(key), &pos, level + 1, &children);
        }
    }
}

fn child_keys(nodes: &[TreeNode], parent_pos: &str) -> Vec<Key> {
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| merged_key(node.key(), &position(parent_pos, index)))
        .collect()
}
