use std::fs::File;

use serde_json::json;
use simplelog::{Config, LevelFilter, WriteLogger};
use treeline::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up file logging
    let log_file = File::create("explorer.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;

    let roots: Vec<TreeNode> = serde_json::from_value(json!([
        { "key": "src", "title": "src", "children": [
            { "key": "src/lib.rs", "title": "lib.rs" },
            { "key": "src/tree.rs", "title": "tree.rs" },
            { "key": "src/motion", "title": "motion", "children": [
                { "key": "src/motion/diff.rs", "title": "diff.rs" },
                { "key": "src/motion/state.rs", "title": "state.rs" }
            ]}
        ]},
        { "key": "target", "title": "target", "disableCheckbox": true },
        { "key": "Cargo.toml", "title": "Cargo.toml", "isLeaf": true }
    ]))?;

    let config = TreeConfig::new()
        .checkable(true)
        .motion(true)
        .load_data(true)
        .viewport(Viewport::new(8, 1));
    let tree = Tree::with_config(roots, config);

    println!("== initial");
    print_rows(&tree);

    if let Some(event) = tree.expand("src")
        && let Some(plan) = event.transition
    {
        println!("== expanding 'src' ({} rows animate)", plan.range.len());
        print_rows(&tree);
        tree.on_motion_end();
    }

    tree.expand("src/motion");
    tree.check("src/motion", true)?;
    println!("== checked 'src/motion'");
    print_rows(&tree);

    // `target` has no children yet, so expanding it asks for a load.
    if let Some(event) = tree.expand("target")
        && event.load
    {
        tree.finish_load("target", vec![TreeNode::new("target/debug").title("debug")]);
    }
    tree.on_motion_end();
    println!("== loaded 'target'");
    print_rows(&tree);

    println!("== persisted keys");
    println!("{}", serde_json::to_string_pretty(&tree.keys())?);
    Ok(())
}

enum Line {
    Row(FlattenNode),
    Placeholder(String),
}

fn print_rows(tree: &Tree) {
    let lines = tree
        .with_rows(|rows| {
            rows.iter()
                .map(|row| match row {
                    ListRow::Node(node) => Line::Row((*node).clone()),
                    ListRow::Motion { nodes, direction } => {
                        Line::Placeholder(format!("~ {:?} {} rows ~", direction, nodes.len()))
                    }
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    for line in lines {
        match line {
            Line::Row(node) => {
                let state = tree.row_state(&node.key);
                println!("{}{} {}", guides(&node), checkbox(&state), title(&node));
            }
            Line::Placeholder(text) => println!("   {}", text),
        }
    }
}

/// Connector lines from the per-level first/last markers.
fn guides(node: &FlattenNode) -> String {
    let depth = node.is_end.len();
    node.is_end
        .iter()
        .enumerate()
        .map(|(level, last)| match (level + 1 == depth, last) {
            (true, true) => "└─",
            (true, false) => "├─",
            (false, true) => "  ",
            (false, false) => "│ ",
        })
        .collect()
}

fn checkbox(state: &RowState) -> &'static str {
    if state.checked {
        "[x]"
    } else if state.half_checked {
        "[-]"
    } else {
        "[ ]"
    }
}

fn title(node: &FlattenNode) -> &str {
    node.data.title.as_deref().unwrap_or(&node.key)
}
