//! Tests for the key entity index.

mod common;

use std::cmp::Ordering;

use serde_json::json;
use treeline::entity::{
    EntityHooks, FieldIndex, IndexOptions, KeyEntities, KeyEntity, build_entities,
    build_entities_with, conduct_expand_parent,
};
use treeline::node::{FlatRecord, TreeNode, compare_pos};

use common::{keys, spoon_tree};

fn index(roots: &[TreeNode]) -> KeyEntities {
    build_entities(roots, &IndexOptions::default())
}

#[test]
fn test_entity_structure() {
    let entities = index(&spoon_tree());
    assert_eq!(entities.len(), 11);
    assert_eq!(entities.roots(), ["greed", "good"]);
    assert_eq!(entities.max_level(), 4);

    let spoon = entities.get("spoon").unwrap();
    assert_eq!(spoon.pos, "0-1-1-1");
    assert_eq!(spoon.index, 1);
    assert_eq!(spoon.level, 2);
    assert_eq!(spoon.parent.as_deref(), Some("is"));
    assert_eq!(spoon.children, ["i", "see", "dead"]);

    let greed = entities.get("greed").unwrap();
    assert!(greed.is_root());
    assert!(!greed.has_children());
}

#[test]
fn test_pos_order_matches_preorder() {
    let entities = index(&spoon_tree());
    let mut all: Vec<&KeyEntity> = entities.iter().collect();
    all.sort_by(|a, b| compare_pos(&a.pos, &b.pos));
    let order: Vec<&str> = all.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(
        order,
        ["greed", "good", "there", "is", "no", "spoon", "i", "see", "dead", "people", "!"]
    );
    assert_eq!(compare_pos("0-1", "0-1-0"), Ordering::Less);
}

#[test]
fn test_unkeyed_nodes_use_pos() {
    let roots = vec![
        TreeNode::unkeyed().child(TreeNode::unkeyed()),
        TreeNode::new("named"),
    ];
    let entities = index(&roots);
    assert!(entities.contains("0-0"));
    assert!(entities.contains("0-0-0"));
    assert_eq!(entities.get("0-0-0").unwrap().parent.as_deref(), Some("0-0"));
    assert_eq!(entities.get("named").unwrap().pos, "0-1");
}

#[test]
fn test_navigation_helpers() {
    let entities = index(&spoon_tree());
    let ancestors: Vec<&str> = entities
        .ancestors("people")
        .iter()
        .map(|e| e.key.as_str())
        .collect();
    assert_eq!(ancestors, ["dead", "spoon", "is", "good"]);

    let children: Vec<&str> = entities.children_of("is").map(|e| e.key.as_str()).collect();
    assert_eq!(children, ["no", "spoon"]);

    assert_eq!(
        entities.subtree_keys("spoon"),
        ["spoon", "i", "see", "dead", "people", "!"]
    );
    assert!(entities.subtree_keys("missing").is_empty());
    assert_eq!(entities.expandable_keys(), keys(["good", "is", "spoon", "dead"]));
}

#[test]
fn test_duplicate_keys_last_wins() {
    let roots = vec![
        TreeNode::new("a").child(TreeNode::new("dup").title("first")),
        TreeNode::new("dup").title("second"),
    ];
    let entities = index(&roots);
    assert_eq!(entities.duplicate_keys(), ["dup"]);
    let dup = entities.get("dup").unwrap();
    assert_eq!(dup.pos, "0-1");
    assert_eq!(dup.node.title.as_deref(), Some("second"));
    // The stale child link must not be followed into a shallower node.
    assert_eq!(entities.children_of("a").count(), 0);
}

#[test]
fn test_check_disabled_flags() {
    let roots = vec![
        TreeNode::new("plain"),
        TreeNode::new("off").disabled(),
        TreeNode::new("no-box").disable_checkbox(),
        TreeNode::new("not-checkable").checkable(false),
    ];
    let entities = index(&roots);
    assert!(!entities.get("plain").unwrap().check_disabled);
    assert!(entities.get("off").unwrap().check_disabled);
    assert!(entities.get("off").unwrap().disabled);
    assert!(entities.get("no-box").unwrap().check_disabled);
    assert!(!entities.get("no-box").unwrap().disabled);
    assert!(entities.get("not-checkable").unwrap().check_disabled);

    let tree_disabled = build_entities(&roots, &IndexOptions::new().disabled(true));
    assert!(tree_disabled.get("plain").unwrap().disabled);
}

#[test]
fn test_field_index_hook() {
    let roots = vec![TreeNode::new("key").title("test").field("value", "ttt")];
    let mut values = FieldIndex::new("value");
    let entities = build_entities_with(&roots, &IndexOptions::default(), &mut values);
    assert_eq!(values.len(), 1);
    assert_eq!(values.get("ttt").map(String::as_str), Some("key"));
    assert!(entities.contains("key"));
}

#[derive(Default)]
struct Recorder {
    seen: Vec<String>,
    finished: usize,
}

impl EntityHooks for Recorder {
    fn process_entity(&mut self, entity: &KeyEntity) {
        self.seen.push(entity.key.clone());
    }

    fn on_process_finished(&mut self, entities: &KeyEntities) {
        self.finished = entities.len();
    }
}

#[test]
fn test_hooks_run_in_document_order() {
    let mut recorder = Recorder::default();
    build_entities_with(&spoon_tree(), &IndexOptions::default(), &mut recorder);
    assert_eq!(recorder.seen.first().map(String::as_str), Some("greed"));
    assert_eq!(recorder.seen.last().map(String::as_str), Some("!"));
    assert_eq!(recorder.finished, 11);
}

#[test]
fn test_conduct_expand_parent() {
    let roots = vec![TreeNode::new("bamboo").child(TreeNode::new("is").child(TreeNode::new("good")))];
    let entities = index(&roots);
    let expanded = conduct_expand_parent(&keys(["good", "ghost"]), &entities);
    assert_eq!(expanded, keys(["bamboo", "is", "good"]));
}

#[test]
fn test_from_flat_list_matches_nested() {
    let records = vec![
        FlatRecord::new("greed", None),
        FlatRecord::new("good", None),
        FlatRecord::new("there", Some("good")),
        FlatRecord::new("is", Some("good")),
        FlatRecord::new("no", Some("is")),
        FlatRecord::new("spoon", Some("is")),
        FlatRecord::new("i", Some("spoon")),
        FlatRecord::new("see", Some("spoon")),
        FlatRecord::new("dead", Some("spoon")),
        FlatRecord::new("people", Some("dead")),
        FlatRecord::new("!", Some("dead")),
    ];
    let from_flat = index(&TreeNode::from_flat_list(records));
    let nested = index(&spoon_tree());
    for entity in nested.iter() {
        let other = from_flat.get(&entity.key).unwrap();
        assert_eq!(other.pos, entity.pos);
        assert_eq!(other.parent, entity.parent);
    }
}

#[test]
fn test_from_flat_list_orphans_become_roots() {
    let records = vec![
        FlatRecord::new("a", Some("missing")),
        FlatRecord::new("b", Some("c")),
        FlatRecord::new("c", Some("b")),
    ];
    let roots = TreeNode::from_flat_list(records);
    let entities = index(&roots);
    assert_eq!(entities.len(), 3);
    assert_eq!(entities.get("a").unwrap().level, 0);
}

#[test]
fn test_nodes_deserialize_from_json() {
    let roots: Vec<TreeNode> = serde_json::from_value(json!([
        { "key": 1, "title": "One", "disableCheckbox": true, "children": [
            { "key": "1-a", "isLeaf": true, "custom": 7 }
        ]}
    ]))
    .unwrap();
    let entities = index(&roots);
    assert!(entities.get("1").unwrap().check_disabled);
    let child = entities.get("1-a").unwrap();
    assert_eq!(child.node.is_leaf, Some(true));
    assert_eq!(child.node.extra.get("custom"), Some(&json!(7)));
}
