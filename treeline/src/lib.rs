//! Tree state engine
//!
//! Headless state for large, virtualized tree widgets: a key-addressable
//! index over a nested node tree, three-state checkbox conduction, projection
//! of the tree into visible rows, and the bookkeeping needed to animate an
//! expand/collapse inside a windowed list.

pub mod check;
pub mod config;
pub mod drag;
pub mod entity;
pub mod error;
pub mod flatten;
pub mod motion;
pub mod node;
pub mod selection;
pub mod state;
pub mod tree;

pub use error::TreeError;
pub use tree::Tree;

pub mod prelude {
    pub use crate::check::{CheckedKeys, check_strictly, conduct_check, parse_checked_keys};
    pub use crate::config::{TreeConfig, Viewport};
    pub use crate::drag::{DragOver, DropPosition, drag_nodes_keys, move_node};
    pub use crate::entity::{
        EntityHooks, FieldIndex, IndexOptions, KeyEntities, KeyEntity, build_entities,
        build_entities_with, conduct_expand_parent,
    };
    pub use crate::error::TreeError;
    pub use crate::flatten::{FlattenNode, flatten_tree_data};
    pub use crate::motion::{
        ExpandDiff, ListRow, MOTION_KEY, MotionDirection, MotionState, TransitionPlan,
        diff_expanded, expand_range,
    };
    pub use crate::node::{FlatRecord, Key, KeySet, TreeNode};
    pub use crate::selection::{Selection, SelectionMode};
    pub use crate::state::{RowState, TreeKeys};
    pub use crate::tree::{ExpandEvent, Tree};
}
