//! Tests for expand diffing and transition bookkeeping.

mod common;

use treeline::config::Viewport;
use treeline::flatten::{FlattenNode, flatten_tree_data};
use treeline::motion::{
    ExpandDiff, ListRow, MOTION_KEY, MotionDirection, MotionState, diff_expanded, expand_range,
    minimum_transition_range, transition_range,
};
use treeline::node::{KeySet, TreeNode};

use common::{keys, node, numbered_tree, spoon_tree};

fn row_keys(rows: &[FlattenNode]) -> Vec<&str> {
    rows.iter().map(|row| row.key.as_str()).collect()
}

fn list_keys(rows: &[ListRow<'_>]) -> Vec<String> {
    rows.iter().map(|row| row.item_key().to_string()).collect()
}

/// One root with `count` leaf children.
fn wide_tree(count: usize) -> Vec<TreeNode> {
    let children = (0..count).map(|i| node(&format!("c{}", i), vec![])).collect();
    vec![node("root", children), node("after", vec![])]
}

#[test]
fn test_diff_single_add() {
    let diff = diff_expanded(&keys(["a"]), &keys(["a", "b"]));
    assert_eq!(
        diff,
        ExpandDiff {
            key: Some("b".to_string()),
            add: true
        }
    );
}

#[test]
fn test_diff_single_remove() {
    let diff = diff_expanded(&keys(["a", "b"]), &keys(["b"]));
    assert_eq!(diff.key.as_deref(), Some("a"));
    assert!(!diff.add);
}

#[test]
fn test_diff_bulk_or_unchanged_reports_nothing() {
    assert_eq!(diff_expanded(&keys(["a"]), &keys(["a"])).key, None);
    assert_eq!(diff_expanded(&KeySet::new(), &keys(["a", "b"])).key, None);
    // Same size, different members.
    assert_eq!(diff_expanded(&keys(["a"]), &keys(["b"])).key, None);
    // One removed and two added.
    assert_eq!(diff_expanded(&keys(["a"]), &keys(["b", "c"])).key, None);
}

#[test]
fn test_expand_range_for_expand() {
    let before = flatten_tree_data(&numbered_tree(), &keys(["0"]));
    let after = flatten_tree_data(&numbered_tree(), &keys(["0", "0-2"]));
    let range = expand_range(&before, &after, "0-2");
    assert_eq!(row_keys(range), ["0-2-0", "0-2-1"]);
}

#[test]
fn test_expand_range_for_collapse() {
    let before = flatten_tree_data(&numbered_tree(), &keys(["0"]));
    let after = flatten_tree_data(&numbered_tree(), &KeySet::new());
    let diff = diff_expanded(&keys(["0"]), &KeySet::new());
    let range = transition_range(&before, &after, &diff);
    assert_eq!(row_keys(range), ["0-0", "0-1", "0-2"]);
}

#[test]
fn test_expand_range_last_row() {
    let tree = vec![node("a", vec![]), node("b", vec![node("b0", vec![]), node("b1", vec![])])];
    let before = flatten_tree_data(&tree, &KeySet::new());
    let after = flatten_tree_data(&tree, &keys(["b"]));
    assert_eq!(row_keys(expand_range(&before, &after, "b")), ["b0", "b1"]);
}

#[test]
fn test_expand_range_leaf_or_missing_is_empty() {
    let rows = flatten_tree_data(&numbered_tree(), &keys(["0"]));
    let expanded_leaf = flatten_tree_data(&numbered_tree(), &keys(["0", "0-1"]));
    assert!(expand_range(&rows, &expanded_leaf, "0-1").is_empty());
    assert!(expand_range(&rows, &rows, "ghost").is_empty());
}

#[test]
fn test_minimum_transition_range_caps_to_viewport() {
    let tree = wide_tree(50);
    let rows = flatten_tree_data(&tree, &keys(["root"]));
    // ceil(100 / 24) + 1 = 6 rows.
    let capped = minimum_transition_range(&rows, &Viewport::new(100, 24));
    assert_eq!(capped.len(), 6);
    assert_eq!(capped[0].key, "root");

    let unknown_height = minimum_transition_range(&rows, &Viewport::new(0, 24));
    assert_eq!(unknown_height.len(), rows.len());
}

#[test]
fn test_motion_expand_plans_show() {
    let tree = spoon_tree();
    let before = flatten_tree_data(&tree, &KeySet::new());
    let mut motion = MotionState::new(&KeySet::new(), &before);

    let expanded = keys(["good"]);
    let after = flatten_tree_data(&tree, &expanded);
    let plan = motion.update(&expanded, &after, &Viewport::default()).unwrap();

    assert_eq!(plan.key, "good");
    assert_eq!(plan.direction, MotionDirection::Show);
    assert_eq!(row_keys(&plan.range), ["there", "is"]);
    assert!(motion.is_animating());

    // The placeholder is spliced in directly after the toggled row.
    assert_eq!(list_keys(&motion.rows()), ["greed", "good", MOTION_KEY]);

    motion.on_motion_end();
    assert!(!motion.is_animating());
    assert_eq!(list_keys(&motion.rows()), ["greed", "good", "there", "is"]);
}

#[test]
fn test_motion_collapse_plans_hide() {
    let tree = spoon_tree();
    let expanded = keys(["good"]);
    let before = flatten_tree_data(&tree, &expanded);
    let mut motion = MotionState::new(&expanded, &before);

    let after = flatten_tree_data(&tree, &KeySet::new());
    let plan = motion.update(&KeySet::new(), &after, &Viewport::default()).unwrap();
    assert_eq!(plan.direction, MotionDirection::Hide);
    assert_eq!(row_keys(&plan.range), ["there", "is"]);

    let rows = motion.rows();
    assert_eq!(list_keys(&rows), ["greed", "good", MOTION_KEY]);
    match rows[2] {
        ListRow::Motion { nodes, direction } => {
            assert_eq!(nodes.len(), 2);
            assert_eq!(direction, MotionDirection::Hide);
        }
        ListRow::Node(_) => panic!("expected placeholder"),
    }
}

#[test]
fn test_motion_leaf_toggle_does_not_animate() {
    let tree = numbered_tree();
    let expanded = keys(["0"]);
    let rows = flatten_tree_data(&tree, &expanded);
    let mut motion = MotionState::new(&expanded, &rows);

    let next = keys(["0", "0-1"]);
    let next_rows = flatten_tree_data(&tree, &next);
    assert!(motion.update(&next, &next_rows, &Viewport::default()).is_none());
    assert!(!motion.is_animating());
    assert_eq!(motion.rows().len(), next_rows.len());
}

#[test]
fn test_motion_bulk_change_does_not_animate() {
    let tree = spoon_tree();
    let rows = flatten_tree_data(&tree, &KeySet::new());
    let mut motion = MotionState::new(&KeySet::new(), &rows);

    let all = keys(["good", "is", "spoon"]);
    let all_rows = flatten_tree_data(&tree, &all);
    assert!(motion.update(&all, &all_rows, &Viewport::default()).is_none());
    assert_eq!(motion.rows().len(), all_rows.len());
}

#[test]
fn test_rapid_toggles_keep_one_placeholder() {
    let tree = spoon_tree();
    let mut expanded = KeySet::new();
    let rows = flatten_tree_data(&tree, &expanded);
    let mut motion = MotionState::new(&expanded, &rows);

    expanded.insert("good".to_string());
    let rows = flatten_tree_data(&tree, &expanded);
    assert!(motion.update(&expanded, &rows, &Viewport::default()).is_some());

    // No end callback before the next toggle.
    expanded.insert("is".to_string());
    let rows = flatten_tree_data(&tree, &expanded);
    let plan = motion.update(&expanded, &rows, &Viewport::default()).unwrap();
    assert_eq!(plan.key, "is");
    assert_eq!(row_keys(&plan.range), ["no", "spoon"]);

    let rendered = motion.rows();
    assert_eq!(rendered.iter().filter(|row| row.is_motion()).count(), 1);
    assert_eq!(
        list_keys(&rendered),
        ["greed", "good", "there", "is", MOTION_KEY]
    );
}

#[test]
fn test_motion_range_is_capped_by_viewport() {
    let tree = wide_tree(40);
    let rows = flatten_tree_data(&tree, &KeySet::new());
    let mut motion = MotionState::new(&KeySet::new(), &rows);

    let expanded = keys(["root"]);
    let next = flatten_tree_data(&tree, &expanded);
    let plan = motion
        .update(&expanded, &next, &Viewport::new(10, 1))
        .unwrap();
    assert_eq!(plan.range.len(), 11);
    assert_eq!(motion.range().len(), 11);
}

#[test]
fn test_reset_drops_pending_transition() {
    let tree = spoon_tree();
    let rows = flatten_tree_data(&tree, &KeySet::new());
    let mut motion = MotionState::new(&KeySet::new(), &rows);

    let expanded = keys(["good"]);
    let next = flatten_tree_data(&tree, &expanded);
    motion.update(&expanded, &next, &Viewport::default());
    assert!(motion.virtual_disabled());

    motion.reset(&expanded, &next);
    assert!(!motion.is_animating());
    assert!(motion.range().is_empty());
    assert!(motion.rows().iter().all(|row| !row.is_motion()));
}
