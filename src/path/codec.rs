use std::fmt;

use serde_json::{Map, Value};

use crate::path::path_model::ConfigPath;

/// Flat mapping of `__`-delimited paths to leaf values, in walk order.
pub type FlatConfig = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// An intermediate segment already holds a non-object value
    PathConflict { path: String, segment: String },

    /// Nothing to assign to: the path has no segments
    EmptyPath,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::PathConflict { path, segment } => {
                write!(f, "cannot set '{}': '{}' is not an object", path, segment)
            }
            CodecError::EmptyPath => write!(f, "cannot set a value at the empty path"),
        }
    }
}

impl std::error::Error for CodecError {}

// ============================================================================
// Nested -> flat
// ============================================================================

/// Flatten a nested configuration object into `path -> leaf`.
///
/// Objects are walked; everything else (null, scalars, arrays) is a leaf.
/// A non-object root is recorded under the empty path.
pub fn flatten(config: &Value) -> FlatConfig {
    let mut out = FlatConfig::new();
    for (path, value) in flatten_paths(config) {
        out.insert(path.to_string(), value);
    }
    out
}

/// Same walk as [`flatten`], keeping paths as segment sequences.
pub fn flatten_paths(config: &Value) -> Vec<(ConfigPath, Value)> {
    let mut out = Vec::new();
    walk(config, ConfigPath::root(), &mut out);
    out
}

fn walk(value: &Value, path: ConfigPath, out: &mut Vec<(ConfigPath, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                walk(child, path.child(key), out);
            }
        }
        leaf => out.push((path, leaf.clone())),
    }
}

// ============================================================================
// Flat -> nested
// ============================================================================

/// Assign `value` at `path` inside `target`, creating intermediate objects.
///
/// Sibling keys already present are kept. A null `target` becomes an object.
pub fn unflatten(path: &ConfigPath, value: Value, target: &mut Value) -> Result<(), CodecError> {
    let (last, parents) = path.segments().split_last().ok_or(CodecError::EmptyPath)?;

    if target.is_null() {
        *target = Value::Object(Map::new());
    }

    let mut node = target;
    for segment in parents {
        let map = node.as_object_mut().ok_or_else(|| CodecError::PathConflict {
            path: path.to_string(),
            segment: segment.clone(),
        })?;
        node = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = node.as_object_mut().ok_or_else(|| CodecError::PathConflict {
        path: path.to_string(),
        segment: last.clone(),
    })?;
    map.insert(last.clone(), value);
    Ok(())
}

/// Rebuild a nested object from every entry of a flat mapping.
pub fn unflatten_all(flat: &FlatConfig) -> Result<Value, CodecError> {
    let mut out = Value::Object(Map::new());
    for (path, value) in flat {
        unflatten(&ConfigPath::parse(path), value.clone(), &mut out)?;
    }
    Ok(out)
}
