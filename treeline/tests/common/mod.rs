//! Shared fixtures.

#![allow(dead_code)]

use treeline::node::TreeNode;

/// greed, good(there, is(no, spoon(i, see, dead(people, !))))
pub fn spoon_tree() -> Vec<TreeNode> {
    vec![
        TreeNode::new("greed").title("Greed"),
        TreeNode::new("good").title("Good").children([
            TreeNode::new("there"),
            TreeNode::new("is").children([
                TreeNode::new("no"),
                TreeNode::new("spoon").children([
                    TreeNode::new("i"),
                    TreeNode::new("see"),
                    TreeNode::new("dead").children([TreeNode::new("people"), TreeNode::new("!")]),
                ]),
            ]),
        ]),
    ]
}

/// war(are, not(it, used[disabled](to, be)))
pub fn war_tree() -> Vec<TreeNode> {
    vec![TreeNode::new("war").children([
        TreeNode::new("are"),
        TreeNode::new("not").children([
            TreeNode::new("it"),
            TreeNode::new("used")
                .disabled()
                .children([TreeNode::new("to"), TreeNode::new("be")]),
        ]),
    ])]
}

/// Node whose key doubles as its title.
pub fn node(key: &str, children: Vec<TreeNode>) -> TreeNode {
    TreeNode::new(key).title(key).children(children)
}

/// 0(0-0, 0-1, 0-2(0-2-0, 0-2-1)), 1
pub fn numbered_tree() -> Vec<TreeNode> {
    vec![
        node(
            "0",
            vec![
                node("0-0", vec![]),
                node("0-1", vec![]),
                node("0-2", vec![node("0-2-0", vec![]), node("0-2-1", vec![])]),
            ],
        ),
        node("1", vec![]),
    ]
}

pub fn keys<'a>(items: impl IntoIterator<Item = &'a str>) -> treeline::node::KeySet {
    items.into_iter().map(str::to_string).collect()
}
