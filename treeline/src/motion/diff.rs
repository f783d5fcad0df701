//! Expanded-key diffing and transition range computation.

use crate::config::Viewport;
use crate::flatten::{FlattenNode, row_index};
use crate::node::{Key, KeySet};

/// The single key whose expanded state changed between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandDiff {
    /// `None` when nothing changed or more than one key changed.
    pub key: Option<Key>,
    /// `true` for an expand, `false` for a collapse.
    pub add: bool,
}

/// Find the single key added to or removed from the expanded set.
///
/// Bulk changes (more than one key) report no key, so they render
/// instantly without a transition.
pub fn diff_expanded(prev: &KeySet, next: &KeySet) -> ExpandDiff {
    if prev.len().abs_diff(next.len()) != 1 {
        return ExpandDiff::default();
    }

    fn find(shorter: &KeySet, longer: &KeySet) -> Option<Key> {
        let mut added = longer.difference(shorter);
        match (added.next(), added.next()) {
            (Some(key), None) => Some(key.clone()),
            _ => None,
        }
    }

    if prev.len() < next.len() {
        ExpandDiff {
            key: find(prev, next),
            add: true,
        }
    } else {
        ExpandDiff {
            key: find(next, prev),
            add: false,
        }
    }
}

/// Rows of `longer` that appear directly below `key` but not in `shorter`.
///
/// `shorter` is the row list with `key` collapsed, `longer` the one with it
/// expanded. The result is empty for leaves and for keys that are not
/// visible in both lists.
pub fn expand_range<'a>(
    shorter: &[FlattenNode],
    longer: &'a [FlattenNode],
    key: &str,
) -> &'a [FlattenNode] {
    let (Some(shorter_start), Some(longer_start)) = (row_index(shorter, key), row_index(longer, key))
    else {
        return &[];
    };

    let start = longer_start + 1;
    match shorter.get(shorter_start + 1) {
        Some(end_row) => match row_index(longer, &end_row.key) {
            Some(end) if end >= start => &longer[start..end],
            Some(_) => &[],
            None => &longer[start..],
        },
        None => &longer[start.min(longer.len())..],
    }
}

/// Rows that must stay mounted while `diff` animates from `before` to
/// `after`.
pub fn transition_range<'a>(
    before: &'a [FlattenNode],
    after: &'a [FlattenNode],
    diff: &ExpandDiff,
) -> &'a [FlattenNode] {
    match (&diff.key, diff.add) {
        (Some(key), true) => expand_range(before, after, key),
        (Some(key), false) => expand_range(after, before, key),
        (None, _) => &[],
    }
}

/// Cap a transition range to the rows that can be on screen at once.
///
/// Only on-screen rows need to animate; an unknown (zero) viewport height
/// keeps the whole range.
pub fn minimum_transition_range<'a>(
    rows: &'a [FlattenNode],
    viewport: &Viewport,
) -> &'a [FlattenNode] {
    if viewport.height == 0 {
        return rows;
    }
    let count = viewport.item_capacity() + 1;
    &rows[..count.min(rows.len())]
}
