//! Expand/collapse transition bookkeeping for the windowed list.

use log::debug;

use crate::config::Viewport;
use crate::flatten::{FlattenNode, row_index};
use crate::node::{Key, KeySet};

use super::diff::{diff_expanded, expand_range, minimum_transition_range};

/// Item key of the synthetic placeholder row that hosts a transition.
///
/// Real rows are told apart from the placeholder by [`ListRow`], so this
/// only needs to be stable for the renderer's item keying.
pub const MOTION_KEY: &str = "__treeline_motion__";

/// Direction of an expand/collapse transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionDirection {
    /// Rows appear (expand).
    Show,
    /// Rows leave (collapse).
    Hide,
}

/// Work handed to the animation runtime.
///
/// The runtime plays `direction` over `range` and calls
/// [`MotionState::on_motion_end`] when done.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    /// The toggled key.
    pub key: Key,
    pub direction: MotionDirection,
    /// Rows inside the placeholder, capped to the viewport.
    pub range: Vec<FlattenNode>,
}

/// A row as seen by the windowed-list renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListRow<'a> {
    Node(&'a FlattenNode),
    /// The placeholder that hosts the transitioning rows.
    Motion {
        nodes: &'a [FlattenNode],
        direction: MotionDirection,
    },
}

impl ListRow<'_> {
    /// Stable item key for the renderer.
    pub fn item_key(&self) -> &str {
        match self {
            ListRow::Node(row) => &row.key,
            ListRow::Motion { .. } => MOTION_KEY,
        }
    }

    pub fn is_motion(&self) -> bool {
        matches!(self, ListRow::Motion { .. })
    }
}

/// Tracks the rows of the previous render so an expand/collapse can be
/// animated against the new ones.
#[derive(Debug, Clone, Default)]
pub struct MotionState {
    prev_expanded: KeySet,
    /// Rows that were on screen before the pending transition.
    prev_rows: Vec<FlattenNode>,
    /// Most recent rows passed to `update`/`reset`.
    latest_rows: Vec<FlattenNode>,
    /// Rows rendered while a transition plays; the placeholder is spliced
    /// in at `placeholder`.
    transition_rows: Vec<FlattenNode>,
    placeholder: Option<usize>,
    range: Vec<FlattenNode>,
    direction: Option<MotionDirection>,
}

impl MotionState {
    pub fn new(expanded: &KeySet, rows: &[FlattenNode]) -> Self {
        let mut state = Self::default();
        state.reset(expanded, rows);
        state
    }

    /// Feed the latest expanded set and rows.
    ///
    /// Returns a plan when exactly one key was toggled and the toggle
    /// reveals or hides at least one row. A transition still pending from an
    /// earlier call is force-completed first, so there is never more than
    /// one placeholder.
    pub fn update(
        &mut self,
        expanded: &KeySet,
        rows: &[FlattenNode],
        viewport: &Viewport,
    ) -> Option<TransitionPlan> {
        if self.is_animating() {
            debug!("Superseding pending tree transition");
            self.on_motion_end();
        }

        let diff = diff_expanded(&self.prev_expanded, expanded);
        self.prev_expanded = expanded.clone();

        let Some(key) = diff.key else {
            self.commit(rows);
            return None;
        };

        let (base, direction, range) = if diff.add {
            let range = expand_range(&self.prev_rows, rows, &key);
            (self.prev_rows.as_slice(), MotionDirection::Show, range)
        } else {
            let range = expand_range(rows, &self.prev_rows, &key);
            (rows, MotionDirection::Hide, range)
        };
        let range = minimum_transition_range(range, viewport);

        let Some(key_index) = row_index(base, &key).filter(|_| !range.is_empty()) else {
            self.commit(rows);
            return None;
        };

        debug!(
            "Tree transition {:?} for '{}' over {} rows",
            direction,
            key,
            range.len()
        );
        let range = range.to_vec();
        self.transition_rows = base.to_vec();
        self.placeholder = Some(key_index + 1);
        self.range = range.clone();
        self.direction = Some(direction);
        self.latest_rows = rows.to_vec();

        Some(TransitionPlan {
            key,
            direction,
            range,
        })
    }

    /// Finish the pending transition and show the latest rows.
    pub fn on_motion_end(&mut self) {
        self.prev_rows = self.latest_rows.clone();
        self.clear_transition();
    }

    /// Adopt new state without animating (bulk or structural change).
    ///
    /// Any pending transition is dropped.
    pub fn reset(&mut self, expanded: &KeySet, rows: &[FlattenNode]) {
        self.prev_expanded = expanded.clone();
        self.commit(rows);
    }

    pub fn is_animating(&self) -> bool {
        self.direction.is_some()
    }

    pub fn direction(&self) -> Option<MotionDirection> {
        self.direction
    }

    /// Rows inside the placeholder (empty when idle).
    pub fn range(&self) -> &[FlattenNode] {
        &self.range
    }

    /// Whether the renderer should stop virtualizing while the
    /// placeholder is mounted.
    pub fn virtual_disabled(&self) -> bool {
        self.is_animating()
    }

    /// Rows to render, with the placeholder spliced in during a transition.
    pub fn rows(&self) -> Vec<ListRow<'_>> {
        match (self.placeholder, self.direction) {
            (Some(at), Some(direction)) => {
                let at = at.min(self.transition_rows.len());
                let mut out = Vec::with_capacity(self.transition_rows.len() + 1);
                out.extend(self.transition_rows[..at].iter().map(ListRow::Node));
                out.push(ListRow::Motion {
                    nodes: &self.range,
                    direction,
                });
                out.extend(self.transition_rows[at..].iter().map(ListRow::Node));
                out
            }
            _ => self.latest_rows.iter().map(ListRow::Node).collect(),
        }
    }

    fn commit(&mut self, rows: &[FlattenNode]) {
        self.prev_rows = rows.to_vec();
        self.latest_rows = rows.to_vec();
        self.clear_transition();
    }

    fn clear_transition(&mut self) {
        self.transition_rows.clear();
        self.placeholder = None;
        self.range.clear();
        self.direction = None;
    }
}
