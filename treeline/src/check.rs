//! Checkbox state conduction.
//!
//! In conductive mode, checking a node checks its eligible descendants and
//! recomputes its ancestors as checked / half-checked / clear. Nodes that
//! are check-disabled (`disabled`, `disableCheckbox` or not checkable) stop
//! propagation in both directions, but keep whatever value they were
//! given directly.

use std::collections::HashMap;

use log::{trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{KeyEntities, KeyEntity};
use crate::error::TreeError;
use crate::node::{KeySet, key_from_value};

/// Checked and half-checked key sets.
///
/// Serializes as `{ "checked": [...], "halfChecked": [...] }`, the same
/// shape accepted by [`parse_checked_keys`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckedKeys {
    #[serde(default)]
    pub checked: KeySet,
    #[serde(default)]
    pub half_checked: KeySet,
}

impl CheckedKeys {
    pub fn new(checked: KeySet, half_checked: KeySet) -> Self {
        Self {
            checked,
            half_checked,
        }
    }

    pub fn is_checked(&self, key: &str) -> bool {
        self.checked.contains(key)
    }

    pub fn is_half_checked(&self, key: &str) -> bool {
        self.half_checked.contains(key)
    }
}

/// Conduct a check (`checked == true`) or uncheck of `keys` through the tree.
///
/// `prior` is the current state; it is never mutated. Every requested key
/// must exist in `entities`, otherwise nothing is applied and
/// [`TreeError::UnknownKeys`] lists the offenders.
pub fn conduct_check<I, K>(
    keys: I,
    checked: bool,
    entities: &KeyEntities,
    prior: Option<&CheckedKeys>,
) -> Result<CheckedKeys, TreeError>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut requested = Vec::new();
    let mut missing = Vec::new();
    for key in keys {
        match entities.get(key.as_ref()) {
            Some(entity) => requested.push(entity),
            None => missing.push(key.as_ref().to_string()),
        }
    }
    if !missing.is_empty() {
        let err = TreeError::unknown_keys(missing);
        warn!("{}", err);
        return Err(err);
    }

    let mut conductor = Conductor::new(entities, checked, prior);
    for entity in requested {
        conductor.conduct(entity);
    }
    let result = conductor.finish();
    trace!(
        "conduct_check({}): {} checked, {} half-checked",
        checked,
        result.checked.len(),
        result.half_checked.len()
    );
    Ok(result)
}

/// Strict discipline: only `key` changes, nothing is propagated.
pub fn check_strictly(key: &str, checked: bool, prior: &CheckedKeys) -> CheckedKeys {
    let mut next = prior.clone();
    if checked {
        next.checked.insert(key.to_string());
    } else {
        next.checked.remove(key);
    }
    next.half_checked.remove(key);
    next
}

struct Conductor<'a> {
    entities: &'a KeyEntities,
    target: bool,
    // Absent means "never touched", which differs from an explicit `false`.
    checked: HashMap<&'a str, bool>,
    half_checked: HashMap<&'a str, bool>,
}

impl<'a> Conductor<'a> {
    fn new(entities: &'a KeyEntities, target: bool, prior: Option<&'a CheckedKeys>) -> Self {
        let mut checked = HashMap::new();
        let mut half_checked = HashMap::new();
        if let Some(prior) = prior {
            checked.extend(prior.checked.iter().map(|k| (k.as_str(), true)));
            half_checked.extend(prior.half_checked.iter().map(|k| (k.as_str(), true)));
        }
        Self {
            entities,
            target,
            checked,
            half_checked,
        }
    }

    fn is_at_target(&self, key: &str) -> bool {
        self.checked.get(key) == Some(&self.target)
    }

    fn conduct(&mut self, entity: &'a KeyEntity) {
        self.checked.insert(&entity.key, self.target);
        if entity.check_disabled {
            return;
        }
        self.half_checked.insert(&entity.key, false);

        let entities = self.entities;
        for child in entities.children_of(&entity.key) {
            if !child.check_disabled {
                self.conduct_down(child);
            }
        }
        if let Some(parent) = entities.parent_of(&entity.key) {
            self.conduct_up(parent);
        }
    }

    fn conduct_down(&mut self, entity: &'a KeyEntity) {
        if self.is_at_target(&entity.key) || entity.check_disabled {
            return;
        }
        self.checked.insert(&entity.key, self.target);
        self.half_checked.insert(&entity.key, false);

        let entities = self.entities;
        for child in entities.children_of(&entity.key) {
            self.conduct_down(child);
        }
    }

    /// Recompute `entity` from its eligible children, then its ancestors
    /// for as long as something changes.
    fn conduct_up(&mut self, entity: &'a KeyEntity) {
        if entity.check_disabled {
            return;
        }

        let entities = self.entities;
        let mut every_checked = true;
        let mut some_checked = false;
        for child in entities.children_of(&entity.key) {
            if child.check_disabled {
                continue;
            }
            let child_checked = is_on(&self.checked, &child.key);
            let child_half = is_on(&self.half_checked, &child.key);
            if child_checked || child_half {
                some_checked = true;
            }
            if !child_checked {
                every_checked = false;
            }
        }

        let was_checked = is_on(&self.checked, &entity.key);
        let was_half = !was_checked && is_on(&self.half_checked, &entity.key);
        let half = some_checked && !every_checked;
        if was_checked == every_checked && was_half == half {
            return;
        }

        self.checked.insert(&entity.key, every_checked);
        self.half_checked.insert(&entity.key, half);

        if let Some(parent) = entities.parent_of(&entity.key) {
            self.conduct_up(parent);
        }
    }

    fn finish(self) -> CheckedKeys {
        let checked: KeySet = self
            .checked
            .iter()
            .filter(|(_, on)| **on)
            .map(|(key, _)| key.to_string())
            .collect();
        let half_checked = self
            .half_checked
            .iter()
            .filter(|(key, on)| **on && !checked.contains(**key))
            .map(|(key, _)| key.to_string())
            .collect();
        CheckedKeys {
            checked,
            half_checked,
        }
    }
}

fn is_on(states: &HashMap<&str, bool>, key: &str) -> bool {
    states.get(key) == Some(&true)
}

/// Parse a controlled `checkedKeys` value.
///
/// Accepts an array of keys, or an object `{ checked, halfChecked }`.
/// `null`/`false` mean "not controlled" and yield `None` silently; any other
/// shape yields `None` plus a warning. Never fails.
pub fn parse_checked_keys(value: &Value) -> Option<CheckedKeys> {
    match try_parse_checked_keys(value) {
        Ok(keys) => keys,
        Err(err) => {
            warn!("{}", err);
            None
        }
    }
}

/// Strict variant of [`parse_checked_keys`] that reports malformed input.
pub fn try_parse_checked_keys(value: &Value) -> Result<Option<CheckedKeys>, TreeError> {
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Array(_) => Ok(Some(CheckedKeys {
            checked: parse_key_list(value, "checkedKeys")?,
            half_checked: KeySet::new(),
        })),
        Value::Object(map) => {
            let field = |name: &'static str| match map.get(name) {
                Some(list) => parse_key_list(list, name),
                None => Ok(KeySet::new()),
            };
            Ok(Some(CheckedKeys {
                checked: field("checked")?,
                half_checked: field("halfChecked")?,
            }))
        }
        other => Err(TreeError::MalformedState {
            field: "checkedKeys",
            found: describe(other),
        }),
    }
}

/// Parse a persisted key list (an array of string/number keys).
///
/// `null` is an empty list. Array entries that are not primitive keys are
/// dropped.
pub fn parse_key_list(value: &Value, field: &'static str) -> Result<KeySet, TreeError> {
    match value {
        Value::Null => Ok(KeySet::new()),
        Value::Array(items) => Ok(items.iter().filter_map(key_from_value).collect()),
        other => Err(TreeError::MalformedState {
            field,
            found: describe(other),
        }),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}
