//! Flattening of nested JSON-style mappings into single-level mappings.
//!
//! A nested mapping is a [`serde_json::Map`]; any [`Value::Object`] inside
//! it is treated as a nested mapping and every other value is a leaf. Key
//! order follows insertion order, so flattened keys appear root-to-leaf in
//! the order the source mapping was built.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Separator used between path segments when none is given.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Options controlling how key paths are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Prefix applied to every produced key, followed by `sep`. Ignored when empty.
    pub parent_key: String,
    /// Separator placed between path segments.
    pub sep: String,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            parent_key: String::new(),
            sep: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl FlattenOptions {
    /// Returns options with the given parent key prefix.
    pub fn with_parent_key(mut self, parent_key: impl Into<String>) -> Self {
        self.parent_key = parent_key.into();
        self
    }

    /// Returns options with the given separator.
    pub fn with_separator(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }
}

/// Flattens `map` using the default options (no prefix, `_` separator).
pub fn flatten(map: &Map<String, Value>) -> Map<String, Value> {
    flatten_dict(map, &FlattenOptions::default())
}

/// Collapses a nested mapping into a single-level mapping.
///
/// Every leaf is stored under the path of its ancestor keys joined by
/// `options.sep`, prefixed by `options.parent_key` when that is non-empty.
/// Leaf values are cloned unchanged. Nested mappings with no entries
/// contribute no keys.
///
/// If two paths produce the same key string the last one assigned in
/// iteration order wins; the key keeps the position of its first
/// insertion.
pub fn flatten_dict(map: &Map<String, Value>, options: &FlattenOptions) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(&mut flat, map, &options.parent_key, &options.sep);
    flat
}

fn flatten_into(flat: &mut Map<String, Value>, map: &Map<String, Value>, parent: &str, sep: &str) {
    for (key, value) in map {
        let new_key = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}{sep}{key}")
        };
        match value {
            Value::Object(nested) => flatten_into(flat, nested, &new_key, sep),
            leaf => {
                flat.insert(new_key, leaf.clone());
            }
        }
    }
}

/// Rebuilds a nested mapping by splitting each key on `sep`.
///
/// This is the inverse of [`flatten_dict`] with an empty parent key, for
/// mappings whose original keys do not contain `sep`.
///
/// Returns [`Error::InvalidArgument`] when `sep` is empty, or when one key
/// is a strict prefix path of another (a leaf and a nested mapping would
/// need the same slot).
pub fn unflatten_dict(flat: &Map<String, Value>, sep: &str) -> Result<Map<String, Value>> {
    if sep.is_empty() {
        return Err(Error::invalid_argument("separator must not be empty"));
    }

    let mut root = Map::new();
    for (key, value) in flat {
        let mut segments = key.split(sep).peekable();
        let mut node = &mut root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                if node.contains_key(segment) {
                    return Err(path_conflict(key));
                }
                node.insert(segment.to_string(), value.clone());
                break;
            }
            let child = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            node = match child {
                Value::Object(nested) => nested,
                _ => return Err(path_conflict(key)),
            };
        }
    }
    Ok(root)
}

fn path_conflict(key: &str) -> Error {
    Error::invalid_argument(format!(
        "key '{key}' conflicts with another flattened path"
    ))
}

/// Counts the leaves of a nested mapping, ignoring empty nested mappings.
pub fn leaf_count(map: &Map<String, Value>) -> usize {
    map.values()
        .map(|value| match value {
            Value::Object(nested) => leaf_count(nested),
            _ => 1,
        })
        .sum()
}
