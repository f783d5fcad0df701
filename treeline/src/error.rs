//! Error types for tree state operations.

use thiserror::Error;

use crate::node::Key;

/// Maximum number of keys listed in an unknown-key diagnostic.
const MAX_REPORTED_KEYS: usize = 100;

/// Errors produced by tree state operations.
///
/// None of these are fatal for an interactive tree: callers are expected to
/// fall back to an empty or unchanged result and keep rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// One or more requested keys are not present in the current index.
    ///
    /// Stale keys after an async tree update are expected, so this is
    /// surfaced as a warning rather than a hard failure.
    #[error("Tree missing follow keys: {}", quote_keys(keys))]
    UnknownKeys {
        /// The keys that could not be found.
        keys: Vec<Key>,
    },

    /// A controlled/persisted key-set input had an unrecognised shape.
    #[error("`{field}` is not an array or an object (found {found})")]
    MalformedState {
        /// Name of the input being parsed (e.g. "checkedKeys").
        field: &'static str,
        /// Short description of the value that was found.
        found: String,
    },

    /// A drag/drop move could not be applied.
    #[error("cannot drop '{drag}' on '{drop}': {reason}")]
    InvalidDrop {
        /// Key of the dragged node.
        drag: Key,
        /// Key of the drop target.
        drop: Key,
        /// Why the move was rejected.
        reason: &'static str,
    },
}

impl TreeError {
    /// Create an unknown-keys error.
    pub fn unknown_keys(keys: Vec<Key>) -> Self {
        Self::UnknownKeys { keys }
    }

    /// Keys reported by an [`TreeError::UnknownKeys`] error, if any.
    pub fn missing_keys(&self) -> &[Key] {
        match self {
            TreeError::UnknownKeys { keys } => keys,
            _ => &[],
        }
    }
}

fn quote_keys(keys: &[Key]) -> String {
    keys.iter()
        .take(MAX_REPORTED_KEYS)
        .map(|key| format!("'{}'", key))
        .collect::<Vec<_>>()
        .join(", ")
}
