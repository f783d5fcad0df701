//! Tests for key-based selection.

mod common;

use treeline::selection::{Selection, SelectionMode};

use common::keys;

#[test]
fn test_single_click_replaces() {
    let mut selection = Selection::new();
    selection.click("a", SelectionMode::Single);
    let (added, removed) = selection.click("b", SelectionMode::Single);
    assert_eq!(added, ["b"]);
    assert_eq!(removed, ["a"]);
    assert_eq!(selection.selected(), &keys(["b"]));
}

#[test]
fn test_click_on_selected_deselects() {
    let mut selection = Selection::new();
    selection.click("a", SelectionMode::Single);
    let (added, removed) = selection.click("a", SelectionMode::Single);
    assert!(added.is_empty());
    assert_eq!(removed, ["a"]);
    assert!(selection.is_empty());
}

#[test]
fn test_multiple_click_adds() {
    let mut selection = Selection::new();
    selection.click("a", SelectionMode::Multiple);
    selection.click("b", SelectionMode::Multiple);
    assert_eq!(selection.selected(), &keys(["a", "b"]));
    selection.click("a", SelectionMode::Multiple);
    assert_eq!(selection.selected(), &keys(["b"]));
}

#[test]
fn test_none_mode_ignores_clicks() {
    let mut selection = Selection::new();
    let (added, removed) = selection.click("a", SelectionMode::None);
    assert!(added.is_empty() && removed.is_empty());
    assert!(selection.is_empty());
}

#[test]
fn test_range_select_from_anchor() {
    let visible = ["a", "b", "c", "d", "e"];
    let mut selection = Selection::new();
    selection.click("b", SelectionMode::Multiple);

    let (added, _) = selection.range_select("d", visible, false);
    assert_eq!(added, ["c", "d"]);
    assert_eq!(selection.selected(), &keys(["b", "c", "d"]));
    assert_eq!(selection.anchor(), Some("b"));

    // Pivot around the same anchor without extending.
    let (_, removed) = selection.range_select("a", visible, false);
    assert_eq!(removed, ["c", "d"]);
    assert_eq!(selection.selected(), &keys(["a", "b"]));
}

#[test]
fn test_range_select_without_anchor_starts_at_target() {
    let mut selection = Selection::from_keys(keys(["x"]));
    selection.range_select("b", ["a", "b"], true);
    assert_eq!(selection.selected(), &keys(["b", "x"]));
    assert_eq!(selection.anchor(), Some("b"));
}

#[test]
fn test_range_select_hidden_anchor_selects_target() {
    let mut selection = Selection::new();
    selection.click("x", SelectionMode::Multiple);
    selection.range_select("b", ["a", "b"], true);
    assert_eq!(selection.selected(), &keys(["b"]));
}

#[test]
fn test_select_all_and_clear() {
    let mut selection = Selection::new();
    selection.click("a", SelectionMode::Multiple);
    let added = selection.select_all(["a", "b", "c"]);
    assert_eq!(added, ["b", "c"]);
    let removed = selection.clear();
    assert_eq!(removed, ["a", "b", "c"]);
    assert_eq!(selection.anchor(), None);
}
