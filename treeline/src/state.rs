//! Caller-owned key sets and per-row annotation.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::check::{CheckedKeys, parse_key_list, try_parse_checked_keys};
use crate::drag::{DragOver, DropPosition};
use crate::entity::{KeyEntities, KeyEntity};
use crate::node::KeySet;

/// Snapshot of every key set a tree carries between renders.
///
/// Serializes with the conventional prop names (`expandedKeys`,
/// `checkedKeys`, ...) so it can be persisted as plain JSON arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeKeys {
    #[serde(rename = "expandedKeys")]
    pub expanded: KeySet,
    #[serde(rename = "selectedKeys")]
    pub selected: KeySet,
    #[serde(rename = "checkedKeys")]
    pub checked: KeySet,
    #[serde(rename = "halfCheckedKeys")]
    pub half_checked: KeySet,
    #[serde(rename = "loadedKeys")]
    pub loaded: KeySet,
    #[serde(rename = "loadingKeys")]
    pub loading: KeySet,
}

impl TreeKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient restore from persisted JSON.
    ///
    /// Each field is parsed on its own; a malformed field is logged and
    /// treated as empty. `checkedKeys` may also be a
    /// `{ checked, halfChecked }` object.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            if !value.is_null() {
                warn!("Tree key snapshot is not an object, starting empty");
            }
            return Self::default();
        };

        let list = |field: &'static str| match map.get(field) {
            Some(raw) => parse_key_list(raw, field).unwrap_or_else(|err| {
                warn!("{}", err);
                KeySet::new()
            }),
            None => KeySet::new(),
        };

        let mut keys = Self {
            expanded: list("expandedKeys"),
            selected: list("selectedKeys"),
            loaded: list("loadedKeys"),
            loading: list("loadingKeys"),
            ..Default::default()
        };

        match map.get("checkedKeys").map(try_parse_checked_keys) {
            Some(Ok(Some(checked))) => keys.set_checked(checked),
            Some(Err(err)) => warn!("{}", err),
            Some(Ok(None)) | None => {}
        }
        if let Some(raw) = map.get("halfCheckedKeys") {
            match parse_key_list(raw, "halfCheckedKeys") {
                Ok(half) => keys.half_checked.extend(half),
                Err(err) => warn!("{}", err),
            }
        }
        keys
    }

    pub fn checked_keys(&self) -> CheckedKeys {
        CheckedKeys::new(self.checked.clone(), self.half_checked.clone())
    }

    pub fn set_checked(&mut self, keys: CheckedKeys) {
        self.checked = keys.checked;
        self.half_checked = keys.half_checked;
    }

    // -------------------------------------------------------------------------
    // Async loading
    // -------------------------------------------------------------------------

    /// Mark `key` as loading.
    ///
    /// Returns `false` (and changes nothing) when the key is already
    /// loading or loaded, so callers never start a second load.
    pub fn begin_load(&mut self, key: &str) -> bool {
        if self.loading.contains(key) || self.loaded.contains(key) {
            return false;
        }
        debug!("Loading tree node '{}'", key);
        self.loading.insert(key.to_string())
    }

    /// The loader resolved for `key`.
    pub fn finish_load(&mut self, key: &str) {
        self.loading.remove(key);
        self.loaded.insert(key.to_string());
    }

    /// The loader failed for `key`; it may be retried later.
    pub fn fail_load(&mut self, key: &str) {
        if self.loading.remove(key) {
            debug!("Load failed for tree node '{}'", key);
        }
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.loading.contains(key)
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.loaded.contains(key)
    }
}

/// Whether the node behind `entity` is rendered as a leaf.
///
/// An explicit `isLeaf` wins. Otherwise a childless node is a leaf unless a
/// loader is attached and it has not been loaded yet.
pub fn is_leaf(entity: &KeyEntity, has_loader: bool, loaded: bool) -> bool {
    if let Some(explicit) = entity.node.is_leaf {
        return explicit;
    }
    !entity.has_children() && (!has_loader || loaded)
}

/// Whether expanding `entity` should invoke the external loader.
pub fn needs_load(entity: &KeyEntity, has_loader: bool, keys: &TreeKeys) -> bool {
    let loaded = keys.is_loaded(&entity.key);
    has_loader
        && !is_leaf(entity, has_loader, loaded)
        && !entity.has_children()
        && !loaded
        && !keys.is_loading(&entity.key)
}

/// Per-row booleans handed to the row renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowState {
    pub expanded: bool,
    pub selected: bool,
    pub checked: bool,
    pub half_checked: bool,
    pub loaded: bool,
    pub loading: bool,
    pub disabled: bool,
    /// Hovered as a drop target (drop inside).
    pub drag_over: bool,
    /// Hovered with the drop indicator above the row.
    pub drag_over_gap_top: bool,
    /// Hovered with the drop indicator below the row.
    pub drag_over_gap_bottom: bool,
    /// Empty when the key is not indexed.
    pub pos: String,
}

impl RowState {
    /// Look `key` up in the current key sets.
    ///
    /// A key missing from `entities` yields the all-`false` default.
    pub fn resolve(
        key: &str,
        keys: &TreeKeys,
        entities: &KeyEntities,
        drag_over: Option<&DragOver>,
    ) -> Self {
        let Some(entity) = entities.get(key) else {
            return Self::default();
        };
        let hovered = drag_over.filter(|d| d.key == key).map(|d| d.position);

        Self {
            expanded: keys.expanded.contains(key),
            selected: keys.selected.contains(key),
            checked: keys.checked.contains(key),
            half_checked: keys.half_checked.contains(key),
            loaded: keys.loaded.contains(key),
            loading: keys.loading.contains(key),
            disabled: entity.disabled,
            drag_over: hovered == Some(DropPosition::Inside),
            drag_over_gap_top: hovered == Some(DropPosition::Before),
            drag_over_gap_bottom: hovered == Some(DropPosition::After),
            pos: entity.pos.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_load_is_not_reentrant() {
        let mut keys = TreeKeys::new();
        assert!(keys.begin_load("a"));
        assert!(!keys.begin_load("a"));
        keys.finish_load("a");
        assert!(!keys.begin_load("a"));
        assert!(keys.is_loaded("a"));
        assert!(!keys.is_loading("a"));
    }

    #[test]
    fn test_fail_load_allows_retry() {
        let mut keys = TreeKeys::new();
        keys.begin_load("a");
        keys.fail_load("a");
        assert!(!keys.is_loading("a"));
        assert!(keys.begin_load("a"));
    }
}
