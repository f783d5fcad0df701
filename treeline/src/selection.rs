//! Key-based row selection.
//!
//! Selection is tracked by node key so it stays stable when rows are
//! added, removed or re-ordered.

use crate::node::{Key, KeySet};

/// Selection discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// No selection allowed
    None,
    /// At most one selected key
    #[default]
    Single,
    /// Any number of selected keys
    Multiple,
}

/// Key-based selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: KeySet,
    /// Anchor for range selection (Shift+click starting point)
    anchor: Option<Key>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing (e.g. controlled) set of keys.
    pub fn from_keys(keys: KeySet) -> Self {
        Self {
            selected: keys,
            anchor: None,
        }
    }

    /// All selected keys, in key order.
    pub fn selected(&self) -> &KeySet {
        &self.selected
    }

    pub fn into_keys(self) -> KeySet {
        self.selected
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Clear all selection.
    /// Returns the keys that were deselected.
    pub fn clear(&mut self) -> Vec<Key> {
        let removed: Vec<_> = std::mem::take(&mut self.selected).into_iter().collect();
        self.anchor = None;
        removed
    }

    /// Select a single key (clears others).
    /// Returns (added, removed) keys.
    pub fn select(&mut self, key: &str) -> (Vec<Key>, Vec<Key>) {
        let removed: Vec<_> = self.selected.iter().filter(|&k| k != key).cloned().collect();
        let was_selected = self.selected.contains(key);
        self.selected.clear();
        self.selected.insert(key.to_string());
        self.anchor = Some(key.to_string());
        let added = if was_selected {
            vec![]
        } else {
            vec![key.to_string()]
        };
        (added, removed)
    }

    /// Toggle selection of a key (Ctrl+click behavior).
    /// Returns (added, removed) keys.
    pub fn toggle(&mut self, key: &str) -> (Vec<Key>, Vec<Key>) {
        self.anchor = Some(key.to_string());
        if self.selected.remove(key) {
            (vec![], vec![key.to_string()])
        } else {
            self.selected.insert(key.to_string());
            (vec![key.to_string()], vec![])
        }
    }

    /// Plain click on a row under `mode`.
    ///
    /// Clicking a selected row deselects it. Otherwise single mode replaces
    /// the selection and multiple mode adds to it.
    /// Returns (added, removed) keys.
    pub fn click(&mut self, key: &str, mode: SelectionMode) -> (Vec<Key>, Vec<Key>) {
        match mode {
            SelectionMode::None => (vec![], vec![]),
            _ if self.selected.contains(key) => self.toggle(key),
            SelectionMode::Single => self.select(key),
            SelectionMode::Multiple => self.toggle(key),
        }
    }

    /// Range select from anchor to target key (Shift+click behavior).
    ///
    /// Requires the ordered list of all visible keys to determine the range.
    /// If `extend` is false, clears selection outside the range first.
    ///
    /// Returns (added, removed) keys.
    pub fn range_select<'a>(
        &mut self,
        target: &str,
        visible_keys: impl IntoIterator<Item = &'a str>,
        extend: bool,
    ) -> (Vec<Key>, Vec<Key>) {
        let anchor = self.anchor.clone().unwrap_or_else(|| target.to_string());
        let ordered: Vec<&str> = visible_keys.into_iter().collect();

        let anchor_pos = ordered.iter().position(|k| *k == anchor);
        let target_pos = ordered.iter().position(|k| *k == target);

        let (start, end) = match (anchor_pos, target_pos) {
            (Some(a), Some(t)) => (a.min(t), a.max(t)),
            // If anchor or target not visible, just select the target
            _ => return self.select(target),
        };

        let range: KeySet = ordered[start..=end].iter().map(|k| k.to_string()).collect();

        let mut removed = Vec::new();
        if !extend {
            removed = self.selected.difference(&range).cloned().collect();
            for key in &removed {
                self.selected.remove(key);
            }
        }

        let mut added = Vec::new();
        for key in range {
            if !self.selected.contains(&key) {
                self.selected.insert(key.clone());
                added.push(key);
            }
        }
        // The anchor stays put so consecutive Shift+clicks pivot around it.
        self.anchor = Some(anchor);

        (added, removed)
    }

    /// Select every key from `keys`.
    /// Returns the keys that were newly selected.
    pub fn select_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) -> Vec<Key> {
        let mut added = Vec::new();
        for key in keys {
            if self.selected.insert(key.to_string()) {
                added.push(key.to_string());
            }
        }
        added
    }
}
