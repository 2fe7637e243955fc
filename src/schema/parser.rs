use std::fmt;

use log::debug;
use serde_json::{Map, Value};

use crate::path::path_model::{ConfigPath, DELIMITER};
use crate::schema::schema_model::{
    Dependency, Dtype, DtypeSpec, FieldSpec, GroupSpec, Schema, SchemaNode,
};

#[derive(Debug)]
pub enum SchemaError {
    /// Schema text is not valid JSON
    Json(serde_json::Error),

    /// Top-level schema value is not an object
    NotAnObject,

    /// Schema key is empty or contains the path delimiter
    InvalidKey { path: String, key: String },

    /// `dtype` names a type nobody renders
    UnknownDtype { path: String, dtype: String },

    /// Field has neither `dtype` nor `allowed_values`
    MissingDtype { path: String },

    /// `array` field without a usable `length`
    MissingLength { path: String },

    /// `depends_on` is not of the form `<path>=<value>`
    InvalidDependency { path: String, clause: String },

    /// Attribute present with the wrong JSON type
    InvalidAttribute { path: String, attribute: String, reason: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Json(e) => write!(f, "schema is not valid JSON: {}", e),
            SchemaError::NotAnObject => write!(f, "schema root must be a JSON object"),
            SchemaError::InvalidKey { path, key } => write!(
                f,
                "invalid key '{}' under '{}': keys must be non-empty and must not contain '{}'",
                key, path, DELIMITER
            ),
            SchemaError::UnknownDtype { path, dtype } => {
                write!(f, "{}: unknown dtype '{}'", path, dtype)
            }
            SchemaError::MissingDtype { path } => {
                write!(f, "{}: field has no dtype and no allowed_values", path)
            }
            SchemaError::MissingLength { path } => {
                write!(f, "{}: array field needs a positive length", path)
            }
            SchemaError::InvalidDependency { path, clause } => {
                write!(f, "{}: depends_on '{}' is not '<path>=<value>'", path, clause)
            }
            SchemaError::InvalidAttribute { path, attribute, reason } => {
                write!(f, "{}: attribute '{}' {}", path, attribute, reason)
            }
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Json(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// Entry points
// ============================================================================

pub fn parse_schema_str(text: &str) -> Result<Schema, SchemaError> {
    let value: Value = serde_json::from_str(text).map_err(SchemaError::Json)?;
    parse_schema(&value)
}

/// Convert a schema document into the typed tree.
///
/// Labeled object values become nodes; everything else under a node is either
/// one of its attributes or noise and is skipped.
pub fn parse_schema(value: &Value) -> Result<Schema, SchemaError> {
    let root = value.as_object().ok_or(SchemaError::NotAnObject)?;
    let children = parse_children(root, &ConfigPath::root())?;
    Ok(Schema { children })
}

fn parse_children(
    object: &Map<String, Value>,
    path: &ConfigPath,
) -> Result<Vec<(String, SchemaNode)>, SchemaError> {
    let mut children = Vec::new();

    for (key, value) in object {
        let Some(item) = value.as_object() else {
            continue;
        };
        if !item.contains_key("label") {
            debug!("skipping unlabeled entry '{}' under '{}'", key, path);
            continue;
        }
        if key.is_empty() || key.contains(DELIMITER) {
            return Err(SchemaError::InvalidKey {
                path: path.to_string(),
                key: key.clone(),
            });
        }

        let child_path = path.child(key);
        children.push((key.clone(), parse_node(item, &child_path)?));
    }

    Ok(children)
}

fn parse_node(item: &Map<String, Value>, path: &ConfigPath) -> Result<SchemaNode, SchemaError> {
    let role = opt_string(item, "role", path)?;

    match role.as_deref() {
        Some("group") => Ok(SchemaNode::Group(parse_group(item, path)?)),
        Some("optional-group") => Ok(SchemaNode::OptionalGroup(parse_group(item, path)?)),
        _ => Ok(SchemaNode::Field(parse_field(item, path, role)?)),
    }
}

fn parse_group(item: &Map<String, Value>, path: &ConfigPath) -> Result<GroupSpec, SchemaError> {
    Ok(GroupSpec {
        label: label_of(item),
        description: opt_string(item, "description", path)?,
        depends_on: parse_dependency(item, path)?,
        children: parse_children(item, path)?,
    })
}

fn parse_field(
    item: &Map<String, Value>,
    path: &ConfigPath,
    role: Option<String>,
) -> Result<FieldSpec, SchemaError> {
    let allowed_values = match item.get("allowed_values") {
        None | Some(Value::Null) => None,
        Some(Value::Array(values)) => Some(values.clone()),
        Some(_) => return Err(invalid(path, "allowed_values", "must be an array")),
    };

    let dtype = parse_dtype(item.get("dtype"), path)?;
    match (&dtype, &allowed_values) {
        (DtypeSpec::Unspecified, None) => {
            return Err(SchemaError::MissingDtype { path: path.to_string() });
        }
        (DtypeSpec::One(Dtype::Enum), None) => {
            return Err(SchemaError::MissingDtype { path: path.to_string() });
        }
        _ => {}
    }

    let subdtype = match opt_string(item, "subdtype", path)? {
        Some(name) => Some(Dtype::parse(&name).ok_or_else(|| SchemaError::UnknownDtype {
            path: path.to_string(),
            dtype: name.clone(),
        })?),
        None => None,
    };

    let length = match item.get("length") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| invalid(path, "length", "must be a non-negative integer"))?,
        ),
    };
    if dtype.is(Dtype::Array) && length.is_none_or(|n| n == 0) {
        return Err(SchemaError::MissingLength { path: path.to_string() });
    }

    let sublabels = match item.get("sublabels") {
        None | Some(Value::Null) => None,
        Some(Value::Array(labels)) => Some(labels.iter().map(plain_text).collect()),
        Some(_) => return Err(invalid(path, "sublabels", "must be an array")),
    };

    Ok(FieldSpec {
        label: label_of(item),
        description: opt_string(item, "description", path)?,
        dtype,
        subdtype,
        default: item.get("default").cloned(),
        min: opt_number(item, "min", path)?,
        max: opt_number(item, "max", path)?,
        allowed_values,
        length,
        sublabels,
        depends_on: parse_dependency(item, path)?,
        role,
        blank: opt_bool(item, "blank", path)?,
        required: opt_bool(item, "required", path)?,
    })
}

fn parse_dtype(value: Option<&Value>, path: &ConfigPath) -> Result<DtypeSpec, SchemaError> {
    let known = |name: &str| {
        Dtype::parse(name).ok_or_else(|| SchemaError::UnknownDtype {
            path: path.to_string(),
            dtype: name.to_string(),
        })
    };

    match value {
        None | Some(Value::Null) => Ok(DtypeSpec::Unspecified),
        Some(Value::String(name)) => Ok(DtypeSpec::One(known(name)?)),
        Some(Value::Array(names)) => {
            let mut dtypes = Vec::with_capacity(names.len());
            for name in names {
                let name = name
                    .as_str()
                    .ok_or_else(|| invalid(path, "dtype", "entries must be strings"))?;
                dtypes.push(known(name)?);
            }
            Ok(DtypeSpec::AnyOf(dtypes))
        }
        Some(_) => Err(invalid(path, "dtype", "must be a string or an array of strings")),
    }
}

/// `"mode=advanced"` -> trigger `mode`, expected `advanced`. Splits at the first `=`.
pub fn parse_dependency_clause(clause: &str) -> Option<Dependency> {
    let (trigger, expected) = clause.split_once('=')?;
    let trigger = trigger.trim();
    if trigger.is_empty() {
        return None;
    }
    Some(Dependency {
        trigger: ConfigPath::parse(trigger),
        expected: expected.to_string(),
    })
}

fn parse_dependency(
    item: &Map<String, Value>,
    path: &ConfigPath,
) -> Result<Option<Dependency>, SchemaError> {
    match opt_string(item, "depends_on", path)? {
        None => Ok(None),
        Some(clause) => parse_dependency_clause(&clause)
            .map(Some)
            .ok_or_else(|| SchemaError::InvalidDependency {
                path: path.to_string(),
                clause,
            }),
    }
}

// ============================================================================
// Attribute helpers
// ============================================================================

fn label_of(item: &Map<String, Value>) -> String {
    item.get("label").map(plain_text).unwrap_or_default()
}

/// Strings as-is, anything else in its JSON text form.
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn opt_string(
    item: &Map<String, Value>,
    key: &str,
    path: &ConfigPath,
) -> Result<Option<String>, SchemaError> {
    match item.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(path, key, "must be a string")),
    }
}

fn opt_number(
    item: &Map<String, Value>,
    key: &str,
    path: &ConfigPath,
) -> Result<Option<f64>, SchemaError> {
    match item.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(path, key, "must be a number")),
    }
}

fn opt_bool(item: &Map<String, Value>, key: &str, path: &ConfigPath) -> Result<bool, SchemaError> {
    match item.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(invalid(path, key, "must be a boolean")),
    }
}

fn invalid(path: &ConfigPath, attribute: &str, reason: &str) -> SchemaError {
    SchemaError::InvalidAttribute {
        path: path.to_string(),
        attribute: attribute.to_string(),
        reason: reason.to_string(),
    }
}
