//! Tree configuration.

use crate::entity::IndexOptions;
use crate::selection::SelectionMode;

/// Geometry of the windowed list the rows are rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Viewport height (0 = unknown / not virtualized).
    pub height: u16,
    /// Height of one row. Rows have a constant height.
    pub item_height: u16,
    /// Scroll offset, in the same unit as `height`.
    pub scroll_offset: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            height: 0,
            item_height: 1,
            scroll_offset: 0,
        }
    }
}

impl Viewport {
    pub fn new(height: u16, item_height: u16) -> Self {
        Self {
            height,
            item_height,
            scroll_offset: 0,
        }
    }

    fn row_height(&self) -> u16 {
        self.item_height.max(1)
    }

    /// Number of rows needed to cover the viewport (partial rows count).
    pub fn item_capacity(&self) -> usize {
        self.height.div_ceil(self.row_height()) as usize
    }

    /// Largest valid scroll offset for `total_rows` rows.
    pub fn max_scroll_offset(&self, total_rows: usize) -> u16 {
        let total_height = (total_rows as u32 * self.row_height() as u32).min(u16::MAX as u32) as u16;
        total_height.saturating_sub(self.height)
    }

    /// Clamp the scroll offset after the row count changed.
    pub fn clamp_scroll(&mut self, total_rows: usize) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset(total_rows));
    }

    /// Row indices to mount for `total_rows` rows, with one row of overscan.
    pub fn visible_range(&self, total_rows: usize) -> std::ops::Range<usize> {
        if total_rows == 0 || self.height == 0 {
            return 0..0;
        }
        let start = ((self.scroll_offset / self.row_height()) as usize).min(total_rows);
        let end = (start + self.item_capacity() + 1).min(total_rows);
        start..end
    }
}

/// Tree-level behaviour switches.
///
/// # Example
///
/// ```
/// use treeline::config::{TreeConfig, Viewport};
///
/// let config = TreeConfig::default()
///     .checkable(true)
///     .multiple(true)
///     .viewport(Viewport::new(200, 20));
/// assert!(config.checkable);
/// ```
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Show checkboxes.
    pub checkable: bool,
    /// Check only the clicked node; no ancestor/descendant propagation.
    pub check_strictly: bool,
    /// Rows can be selected.
    pub selectable: bool,
    /// Selection discipline when `selectable` is set.
    pub selection_mode: SelectionMode,
    /// Disable every node.
    pub disabled: bool,
    /// Rows can be drag-reordered.
    pub draggable: bool,
    /// Animate expand/collapse.
    pub motion: bool,
    /// Expand the ancestors of initially expanded keys.
    pub auto_expand_parent: bool,
    /// Start with every node expanded.
    pub default_expand_all: bool,
    /// An async loader is attached; childless non-leaf nodes load on expand.
    pub load_data: bool,
    pub viewport: Viewport,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            checkable: false,
            check_strictly: false,
            selectable: true,
            selection_mode: SelectionMode::Single,
            disabled: false,
            draggable: false,
            motion: false,
            auto_expand_parent: true,
            default_expand_all: false,
            load_data: false,
            viewport: Viewport::default(),
        }
    }
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkable(mut self, checkable: bool) -> Self {
        self.checkable = checkable;
        self
    }

    pub fn check_strictly(mut self, strict: bool) -> Self {
        self.check_strictly = strict;
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Allow multiple selection.
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.selection_mode = if multiple {
            SelectionMode::Multiple
        } else {
            SelectionMode::Single
        };
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn motion(mut self, motion: bool) -> Self {
        self.motion = motion;
        self
    }

    pub fn auto_expand_parent(mut self, auto: bool) -> Self {
        self.auto_expand_parent = auto;
        self
    }

    pub fn default_expand_all(mut self, expand_all: bool) -> Self {
        self.default_expand_all = expand_all;
        self
    }

    pub fn load_data(mut self, load_data: bool) -> Self {
        self.load_data = load_data;
        self
    }

    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Effective selection mode (`None` when rows are not selectable).
    pub fn effective_selection_mode(&self) -> SelectionMode {
        if self.selectable {
            self.selection_mode
        } else {
            SelectionMode::None
        }
    }

    /// Indexing options derived from this configuration.
    ///
    /// Nodes with an inherited `checkable` are always eligible for
    /// conduction; whether checkboxes are shown is a rendering concern.
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions::new().checkable(true).disabled(self.disabled)
    }
}
