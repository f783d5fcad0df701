//! Expand/collapse transitions over a virtualized row list.
//!
//! When exactly one key is expanded or collapsed, the rows that appear or
//! leave are grouped under a single placeholder row so the animation runtime
//! has a stable block to transition. Everything else renders instantly.

mod diff;
mod state;

pub use diff::{ExpandDiff, diff_expanded, expand_range, minimum_transition_range, transition_range};
pub use state::{ListRow, MOTION_KEY, MotionDirection, MotionState, TransitionPlan};
