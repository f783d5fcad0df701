//! Stateful tree controller.
//!
//! [`Tree`] ties the pure pieces together: it owns the node tree, rebuilds
//! the key index and the visible rows whenever the tree or the expanded set
//! changes, and drives check conduction, selection, async-load bookkeeping
//! and expand/collapse transitions.
//!
//! `Tree` is a cheap, clonable handle; clones share state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use log::{debug, warn};

use crate::check::{CheckedKeys, check_strictly, conduct_check};
use crate::config::{TreeConfig, Viewport};
use crate::drag::{DragOver, DropPosition, drag_nodes_keys, move_node};
use crate::entity::{KeyEntities, KeyEntity, build_entities, conduct_expand_parent};
use crate::error::TreeError;
use crate::flatten::{FlattenNode, flatten_tree_data};
use crate::motion::{ListRow, MotionState, TransitionPlan};
use crate::node::{Key, KeySet, TreeNode, node_at_mut};
use crate::selection::{Selection, SelectionMode};
use crate::state::{RowState, TreeKeys, needs_load};

/// Outcome of an expand/collapse that changed something.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandEvent {
    pub key: Key,
    /// New expanded state of `key`.
    pub expanded: bool,
    /// The external loader should run for `key`. The key is already marked
    /// as loading.
    pub load: bool,
    /// Animation to play (only when motion is enabled).
    pub transition: Option<TransitionPlan>,
}

#[derive(Debug, Default)]
struct TreeInner {
    roots: Vec<TreeNode>,
    entities: KeyEntities,
    /// Latest flattened rows (without the transition placeholder).
    rows: Vec<FlattenNode>,
    keys: TreeKeys,
    selection: Selection,
    config: TreeConfig,
    motion: MotionState,
    /// Keys of the subtree being dragged.
    dragging: Vec<Key>,
    drag_over: Option<DragOver>,
}

impl TreeInner {
    fn reindex(&mut self) {
        self.entities = build_entities(&self.roots, &self.config.index_options());
    }

    /// Re-flatten and feed the transition controller.
    fn refresh_rows(&mut self, animate: bool) -> Option<TransitionPlan> {
        self.rows = flatten_tree_data(&self.roots, &self.keys.expanded);
        self.config.viewport.clamp_scroll(self.rows.len());
        if animate && self.config.motion {
            self.motion
                .update(&self.keys.expanded, &self.rows, &self.config.viewport)
        } else {
            self.motion.reset(&self.keys.expanded, &self.rows);
            None
        }
    }

    fn apply_expanded(&mut self, expanded: KeySet) {
        self.keys.expanded = if self.config.auto_expand_parent {
            conduct_expand_parent(expanded.iter(), &self.entities)
        } else {
            expanded
        };
    }

    /// Recompute half-checked state for a controlled checked set.
    fn apply_checked(&mut self, checked: CheckedKeys) {
        if self.config.check_strictly {
            self.keys.set_checked(checked);
            return;
        }

        let (known, missing): (Vec<Key>, Vec<Key>) = checked
            .checked
            .into_iter()
            .partition(|key| self.entities.contains(key));
        if !missing.is_empty() {
            warn!("{}", TreeError::unknown_keys(missing));
        }
        let conducted = conduct_check(&known, true, &self.entities, None).unwrap_or_default();
        self.keys.set_checked(conducted);
    }

    fn apply_selected(&mut self, selected: KeySet) {
        let selected = match self.config.effective_selection_mode() {
            SelectionMode::None => KeySet::new(),
            SelectionMode::Single => selected.into_iter().take(1).collect(),
            SelectionMode::Multiple => selected,
        };
        self.selection = Selection::from_keys(selected);
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        self.keys.selected = self.selection.selected().clone();
    }

    fn is_selectable(&self, entity: &KeyEntity) -> bool {
        entity.node.selectable != Some(false) && !entity.disabled
    }

    fn visible_keys(&self) -> Vec<Key> {
        self.rows.iter().map(|row| row.key.clone()).collect()
    }
}

/// A tree of [`TreeNode`]s with expand, check, select, load and drag state.
///
/// # Example
///
/// ```
/// use treeline::config::TreeConfig;
/// use treeline::node::TreeNode;
/// use treeline::tree::Tree;
///
/// let roots = vec![TreeNode::new("docs").child(TreeNode::new("readme"))];
/// let tree = Tree::with_config(roots, TreeConfig::default().checkable(true));
///
/// tree.expand("docs");
/// tree.check("readme", true).unwrap();
/// assert!(tree.is_checked("docs"));
/// assert_eq!(tree.visible_len(), 2);
/// ```
#[derive(Debug)]
pub struct Tree {
    inner: Arc<RwLock<TreeInner>>,
    /// Dirty flag for re-render.
    dirty: Arc<AtomicBool>,
}

impl Tree {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Vec::new(), TreeConfig::default())
    }

    /// Create a tree with the default configuration.
    pub fn with_items(roots: Vec<TreeNode>) -> Self {
        Self::with_config(roots, TreeConfig::default())
    }

    /// Create a tree. `default_expand_all` only applies here.
    pub fn with_config(roots: Vec<TreeNode>, config: TreeConfig) -> Self {
        let mut inner = TreeInner {
            roots,
            config,
            ..Default::default()
        };
        inner.reindex();
        if inner.config.default_expand_all {
            inner.keys.expanded = inner.entities.expandable_keys();
        }
        inner.refresh_rows(false);

        Self {
            inner: Arc::new(RwLock::new(inner)),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Item access
    // -------------------------------------------------------------------------

    pub fn roots(&self) -> Vec<TreeNode> {
        self.inner
            .read()
            .map(|g| g.roots.clone())
            .unwrap_or_default()
    }

    /// Replace the node tree.
    ///
    /// A pending transition is force-completed first. Expanded, selected and
    /// load state is kept; checked state is re-conducted against the new
    /// tree.
    pub fn set_items(&self, roots: Vec<TreeNode>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.motion.on_motion_end();
            guard.roots = roots;
            guard.reindex();
            let checked = guard.keys.checked_keys();
            guard.apply_checked(checked);
            guard.refresh_rows(false);
            debug!("Tree items replaced ({} nodes)", guard.entities.len());
            self.mark_dirty();
        }
    }

    pub fn config(&self) -> TreeConfig {
        self.inner
            .read()
            .map(|g| g.config.clone())
            .unwrap_or_default()
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.entities.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entity for `key`, if indexed.
    pub fn entity(&self, key: &str) -> Option<KeyEntity> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.entities.get(key).cloned())
    }

    /// Run `f` against the current key index.
    pub fn with_entities<R>(&self, f: impl FnOnce(&KeyEntities) -> R) -> Option<R> {
        self.inner.read().ok().map(|g| f(&g.entities))
    }

    // -------------------------------------------------------------------------
    // Key snapshot
    // -------------------------------------------------------------------------

    /// Snapshot of every key set.
    pub fn keys(&self) -> TreeKeys {
        self.inner
            .read()
            .map(|g| g.keys.clone())
            .unwrap_or_default()
    }

    /// Adopt controlled or restored key sets.
    ///
    /// Expanded keys gain their ancestors when `auto_expand_parent` is set,
    /// checked keys are conducted unless `check_strictly` is set, and the
    /// selection is trimmed to the selection mode.
    pub fn set_keys(&self, keys: TreeKeys) {
        if let Ok(mut guard) = self.inner.write() {
            let checked = keys.checked_keys();
            guard.apply_expanded(keys.expanded);
            guard.apply_checked(checked);
            guard.apply_selected(keys.selected);
            guard.keys.loaded = keys.loaded;
            guard.keys.loading = keys.loading;
            guard.refresh_rows(false);
            self.mark_dirty();
        }
    }

    // -------------------------------------------------------------------------
    // Expand/Collapse
    // -------------------------------------------------------------------------

    /// Expand a node by key.
    pub fn expand(&self, key: &str) -> Option<ExpandEvent> {
        self.change_expanded(key, Some(true))
    }

    /// Collapse a node by key.
    pub fn collapse(&self, key: &str) -> Option<ExpandEvent> {
        self.change_expanded(key, Some(false))
    }

    /// Toggle expand/collapse for a node.
    pub fn toggle(&self, key: &str) -> Option<ExpandEvent> {
        self.change_expanded(key, None)
    }

    fn change_expanded(&self, key: &str, expand: Option<bool>) -> Option<ExpandEvent> {
        let mut guard = self.inner.write().ok()?;
        let Some(entity) = guard.entities.get(key) else {
            warn!("{}", TreeError::unknown_keys(vec![key.to_string()]));
            return None;
        };

        let expand = expand.unwrap_or(!guard.keys.expanded.contains(key));
        let load = expand && needs_load(entity, guard.config.load_data, &guard.keys);
        let changed = if expand {
            guard.keys.expanded.insert(key.to_string())
        } else {
            guard.keys.expanded.remove(key)
        };
        if !changed && !load {
            return None;
        }
        if load {
            guard.keys.begin_load(key);
        }

        let transition = guard.refresh_rows(true);
        self.mark_dirty();
        Some(ExpandEvent {
            key: key.to_string(),
            expanded: expand,
            load,
            transition,
        })
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.inner
            .read()
            .map(|g| g.keys.expanded.contains(key))
            .unwrap_or(false)
    }

    pub fn expanded_keys(&self) -> KeySet {
        self.inner
            .read()
            .map(|g| g.keys.expanded.clone())
            .unwrap_or_default()
    }

    /// Replace the expanded set. Animates only when exactly one key changed.
    pub fn set_expanded_keys(&self, keys: KeySet) -> Option<TransitionPlan> {
        let mut guard = self.inner.write().ok()?;
        guard.apply_expanded(keys);
        let transition = guard.refresh_rows(true);
        self.mark_dirty();
        transition
    }

    /// Expand all expandable nodes.
    pub fn expand_all(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.keys.expanded = guard.entities.expandable_keys();
            guard.refresh_rows(true);
            self.mark_dirty();
        }
    }

    /// Collapse all nodes.
    pub fn collapse_all(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.keys.expanded.clear();
            guard.refresh_rows(true);
            self.mark_dirty();
        }
    }

    // -------------------------------------------------------------------------
    // Checkboxes
    // -------------------------------------------------------------------------

    /// Check or uncheck a node.
    ///
    /// Returns `Ok(false)` when the click is ignored: checkboxes are off, or
    /// the node is disabled or not checkable. An unknown key leaves the
    /// state unchanged and is reported as an error.
    pub fn check(&self, key: &str, checked: bool) -> Result<bool, TreeError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(false);
        };
        let Some(entity) = guard.entities.get(key) else {
            let err = TreeError::unknown_keys(vec![key.to_string()]);
            warn!("{}", err);
            return Err(err);
        };
        if !guard.config.checkable || entity.disabled || entity.check_disabled {
            debug!("Ignoring check on '{}'", key);
            return Ok(false);
        }

        let prior = guard.keys.checked_keys();
        let next = if guard.config.check_strictly {
            check_strictly(key, checked, &prior)
        } else {
            conduct_check([key], checked, &guard.entities, Some(&prior))?
        };
        guard.keys.set_checked(next);
        self.mark_dirty();
        Ok(true)
    }

    pub fn checked_keys(&self) -> CheckedKeys {
        self.inner
            .read()
            .map(|g| g.keys.checked_keys())
            .unwrap_or_default()
    }

    pub fn is_checked(&self, key: &str) -> bool {
        self.inner
            .read()
            .map(|g| g.keys.checked.contains(key))
            .unwrap_or(false)
    }

    pub fn is_half_checked(&self, key: &str) -> bool {
        self.inner
            .read()
            .map(|g| g.keys.half_checked.contains(key))
            .unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Click-select a node.
    ///
    /// Clicking a selected node deselects it; otherwise single mode replaces
    /// the selection and multiple mode adds to it. Disabled and
    /// non-selectable nodes are ignored.
    /// Returns (added keys, removed keys).
    pub fn select(&self, key: &str) -> (Vec<Key>, Vec<Key>) {
        if let Ok(mut guard) = self.inner.write() {
            let mode = guard.config.effective_selection_mode();
            let selectable = guard
                .entities
                .get(key)
                .is_some_and(|entity| guard.is_selectable(entity));
            if mode != SelectionMode::None && selectable {
                let result = guard.selection.click(key, mode);
                guard.sync_selection();
                self.mark_dirty();
                return result;
            }
        }
        (vec![], vec![])
    }

    /// Range select from the anchor to `key` over the visible rows.
    pub fn range_select(&self, key: &str, extend: bool) -> (Vec<Key>, Vec<Key>) {
        if let Ok(mut guard) = self.inner.write()
            && guard.config.effective_selection_mode() == SelectionMode::Multiple
        {
            let visible = guard.visible_keys();
            let result = guard
                .selection
                .range_select(key, visible.iter().map(String::as_str), extend);
            guard.sync_selection();
            self.mark_dirty();
            return result;
        }
        (vec![], vec![])
    }

    /// Clear all selection.
    pub fn deselect_all(&self) -> Vec<Key> {
        if let Ok(mut guard) = self.inner.write() {
            let result = guard.selection.clear();
            guard.sync_selection();
            self.mark_dirty();
            return result;
        }
        vec![]
    }

    pub fn selected_keys(&self) -> KeySet {
        self.inner
            .read()
            .map(|g| g.keys.selected.clone())
            .unwrap_or_default()
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.inner
            .read()
            .map(|g| g.keys.selected.contains(key))
            .unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Async loading
    // -------------------------------------------------------------------------

    /// Mark `key` as loading. Returns `false` if it is already loading or
    /// loaded.
    pub fn begin_load(&self, key: &str) -> bool {
        self.inner
            .write()
            .map(|mut g| g.keys.begin_load(key))
            .unwrap_or(false)
    }

    /// The loader resolved: attach `children` to `key` and mark it loaded.
    pub fn finish_load(&self, key: &str, children: Vec<TreeNode>) {
        if let Ok(mut guard) = self.inner.write() {
            let node = match guard.entities.get(key).map(|e| e.pos.clone()) {
                Some(pos) => node_at_mut(&mut guard.roots, &pos),
                None => None,
            };
            match node {
                Some(node) => node.children = children,
                None => warn!("{}", TreeError::unknown_keys(vec![key.to_string()])),
            }
            guard.keys.finish_load(key);
            guard.motion.on_motion_end();
            guard.reindex();
            guard.refresh_rows(false);
            self.mark_dirty();
        }
    }

    /// The loader failed; the key may be loaded again later.
    pub fn fail_load(&self, key: &str) {
        if let Ok(mut guard) = self.inner.write() {
            guard.keys.fail_load(key);
            self.mark_dirty();
        }
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Run `f` against the rows to render, with the transition placeholder
    /// spliced in while an expand/collapse animates.
    ///
    /// `f` runs under the tree's read lock: it must not call back into this
    /// tree or any clone of it. Collect what you need and act afterwards.
    pub fn with_rows<R>(&self, f: impl FnOnce(&[ListRow<'_>]) -> R) -> Option<R> {
        self.inner.read().ok().map(|g| f(&g.motion.rows()))
    }

    /// Item keys of the rows to render, placeholder included.
    pub fn row_keys(&self) -> Vec<Key> {
        self.with_rows(|rows| rows.iter().map(|row| row.item_key().to_string()).collect())
            .unwrap_or_default()
    }

    /// Latest visible rows, ignoring any running transition.
    ///
    /// Indexed like [`Tree::visible_node`], not like [`Tree::row_keys`].
    pub fn visible_rows(&self) -> Vec<FlattenNode> {
        self.inner
            .read()
            .map(|g| g.rows.clone())
            .unwrap_or_default()
    }

    pub fn visible_len(&self) -> usize {
        self.inner.read().map(|g| g.rows.len()).unwrap_or(0)
    }

    /// Visible row at `index`, ignoring any running transition.
    ///
    /// While a transition plays, [`Tree::visible_range`] and
    /// [`Tree::row_keys`] count the placeholder row and this does not, so
    /// their indices can differ.
    pub fn visible_node(&self, index: usize) -> Option<FlattenNode> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.rows.get(index).cloned())
    }

    /// Per-row booleans for `key`.
    pub fn row_state(&self, key: &str) -> RowState {
        self.inner
            .read()
            .map(|g| RowState::resolve(key, &g.keys, &g.entities, g.drag_over.as_ref()))
            .unwrap_or_default()
    }

    pub fn is_animating(&self) -> bool {
        self.inner
            .read()
            .map(|g| g.motion.is_animating())
            .unwrap_or(false)
    }

    /// Called by the animation runtime once a transition has played.
    pub fn on_motion_end(&self) {
        if let Ok(mut guard) = self.inner.write()
            && guard.motion.is_animating()
        {
            guard.motion.on_motion_end();
            self.mark_dirty();
        }
    }

    // -------------------------------------------------------------------------
    // Drag and drop
    // -------------------------------------------------------------------------

    /// Start dragging `key`. The dragged node is collapsed.
    ///
    /// Returns the dragged key plus its descendants (empty when dragging is
    /// off or the key is unknown).
    pub fn start_drag(&self, key: &str) -> Vec<Key> {
        let Ok(mut guard) = self.inner.write() else {
            return vec![];
        };
        if !guard.config.draggable {
            return vec![];
        }
        let keys = drag_nodes_keys(key, &guard.entities);
        if keys.is_empty() {
            return keys;
        }
        guard.dragging = keys.clone();
        if guard.keys.expanded.remove(key) {
            guard.refresh_rows(false);
        }
        self.mark_dirty();
        keys
    }

    pub fn dragging_keys(&self) -> Vec<Key> {
        self.inner
            .read()
            .map(|g| g.dragging.clone())
            .unwrap_or_default()
    }

    /// Update the hovered drop target.
    pub fn set_drag_over(&self, over: Option<DragOver>) {
        if let Ok(mut guard) = self.inner.write()
            && guard.drag_over != over
        {
            guard.drag_over = over;
            self.mark_dirty();
        }
    }

    /// Finish a drag without dropping.
    pub fn end_drag(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.dragging.clear();
            guard.drag_over = None;
            guard.motion.on_motion_end();
            self.mark_dirty();
        }
    }

    /// Drop the node being dragged relative to `drop_key`.
    pub fn drop_dragged(&self, drop_key: &str, position: DropPosition) -> Result<(), TreeError> {
        let drag_key = self
            .dragging_keys()
            .into_iter()
            .next()
            .ok_or_else(|| TreeError::InvalidDrop {
                drag: Key::new(),
                drop: drop_key.to_string(),
                reason: "no drag in progress",
            })?;
        let result = self.move_node(&drag_key, drop_key, position);
        self.end_drag();
        result
    }

    /// Move the subtree at `drag_key` relative to `drop_key`.
    pub fn move_node(
        &self,
        drag_key: &str,
        drop_key: &str,
        position: DropPosition,
    ) -> Result<(), TreeError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(());
        };
        move_node(&mut guard.roots, drag_key, drop_key, position)?;
        guard.motion.on_motion_end();
        guard.reindex();
        guard.refresh_rows(false);
        self.mark_dirty();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Viewport
    // -------------------------------------------------------------------------

    /// Set the viewport geometry (called by renderer).
    pub fn set_viewport(&self, viewport: Viewport) {
        if let Ok(mut guard) = self.inner.write() {
            let total = guard.rows.len();
            guard.config.viewport = viewport;
            guard.config.viewport.clamp_scroll(total);
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.inner
            .read()
            .map(|g| g.config.viewport)
            .unwrap_or_default()
    }

    /// Set the scroll offset, clamped to the content.
    pub fn set_scroll_offset(&self, offset: u16) {
        if let Ok(mut guard) = self.inner.write() {
            let total = guard.rows.len();
            guard.config.viewport.scroll_offset = offset;
            guard.config.viewport.clamp_scroll(total);
            self.mark_dirty();
        }
    }

    /// Row range to mount. Everything is mounted while a transition plays.
    ///
    /// Indices refer to the rendered rows ([`Tree::with_rows`],
    /// [`Tree::row_keys`]), placeholder included.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        self.inner
            .read()
            .map(|g| {
                let total = g.motion.rows().len();
                if g.motion.virtual_disabled() {
                    0..total
                } else {
                    g.config.viewport.visible_range(total)
                }
            })
            .unwrap_or(0..0)
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the tree has changed.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl Clone for Tree {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
