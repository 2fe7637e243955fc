use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::{Number, Value};

use crate::backend::backend_model::{SaveResponse, SaveStatus};
use crate::backend::client::ConfigBackend;
use crate::backend::error::BackendError;
use crate::form::control::text_of;
use crate::path::codec::{FlatConfig, unflatten};
use crate::path::path_model::ConfigPath;
use crate::schema::schema_model::{Dtype, DtypeSpec, FieldSpec, Schema};

/// File the backend stores the accepted configuration in.
pub const CONFIG_FILE_NAME: &str = "igm-config.json";

/// Outcome of checking a submitted flat mapping against the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Nested configuration built from every accepted value
    pub cfg: Value,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_response(self) -> SaveResponse {
        let ok = self.is_ok();
        SaveResponse {
            status: if ok { SaveStatus::Ok } else { SaveStatus::Error },
            cfg: if ok { Some(self.cfg) } else { None },
            errors: self.errors,
            warnings: self.warnings,
            reason: None,
        }
    }
}

// ============================================================================
// Whole-config validation
// ============================================================================

/// Coerce and check each submitted value the way the pipeline backend does.
///
/// Unknown paths are kept as-is with a warning; type and allowed-value
/// failures are errors and leave the value out.
pub fn validate_config(schema: &Schema, cfgdata: &FlatConfig) -> ValidationReport {
    let mut report = ValidationReport {
        cfg: Value::Object(Default::default()),
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    for (raw_path, value) in cfgdata {
        let path = ConfigPath::parse(raw_path);
        let chain = path.display_chain();

        let Some(field) = schema.field(&path) else {
            report.warnings.push(format!("key \"{}\" not in schema", chain));
            store(&mut report, &path, value.clone());
            continue;
        };

        if field.blank && is_blank(value) {
            continue;
        }

        let Some((dtype, accepted)) = coerce(field, value) else {
            let names: Vec<&str> = field.dtype.candidates().iter().map(Dtype::name).collect();
            report.errors.push(format!(
                "{}: invalid data \"{}\". Valid data type are \"{}\"",
                chain,
                text_of(value),
                names.join(", ")
            ));
            continue;
        };

        if matches!(dtype, Dtype::Str | Dtype::Path | Dtype::PathDir)
            && !field.required
            && accepted.as_str().is_some_and(|s| s.trim().is_empty())
        {
            continue;
        }

        if dtype == Dtype::Path && field.role.as_deref() == Some("input") {
            if let Some(file) = accepted.as_str() {
                if !Path::new(file).is_file() {
                    report
                        .warnings
                        .push(format!("{}: cannot find input file \"{}\"", chain, file));
                }
            }
        }

        if let Some(allowed) = &field.allowed_values {
            if !allowed.contains(&accepted) {
                let options: Vec<String> = allowed.iter().map(text_of).collect();
                report.errors.push(format!(
                    "{}: invalid value \"{}\". Valid values are \"{}\"",
                    chain,
                    text_of(value),
                    options.join(", ")
                ));
                continue;
            }
        }

        store(&mut report, &path, accepted);
    }

    report
}

fn store(report: &mut ValidationReport, path: &ConfigPath, value: Value) {
    if let Err(e) = unflatten(path, value, &mut report.cfg) {
        report.errors.push(e.to_string());
    }
}

/// Try each declared dtype in order; the first that accepts the value wins.
///
/// Fields without a concrete dtype take the matching entry of `allowed_values`.
fn coerce(field: &FieldSpec, value: &Value) -> Option<(Dtype, Value)> {
    if matches!(field.dtype, DtypeSpec::Unspecified | DtypeSpec::One(Dtype::Enum)) {
        let text = text_of(value);
        let allowed = field.allowed_values.as_ref()?;
        return allowed
            .iter()
            .find(|a| **a == *value || text_of(a) == text)
            .map(|a| (Dtype::Enum, a.clone()));
    }

    field.dtype.candidates().into_iter().find_map(|dtype| {
        validate_value(value, dtype, field.subdtype, field.length).map(|v| (dtype, v))
    })
}

// ============================================================================
// Single-value coercion
// ============================================================================

/// Coerce one value to `dtype`; `None` when it does not fit.
pub fn validate_value(
    value: &Value,
    dtype: Dtype,
    subdtype: Option<Dtype>,
    length: Option<usize>,
) -> Option<Value> {
    match dtype {
        Dtype::Int => as_int(value).map(Value::from),
        Dtype::Float => as_float(value).and_then(Number::from_f64).map(Value::Number),
        Dtype::Bool => Some(Value::Bool(truthy(value))),
        Dtype::Str | Dtype::Path | Dtype::PathDir => Some(Value::String(text_of(value))),
        Dtype::List => validate_items(json_or(value, Value::is_array)?, subdtype),
        Dtype::Array => {
            let items = json_or(value, Value::is_array)?;
            if Some(items.as_array()?.len()) != length {
                return None;
            }
            validate_items(items, subdtype)
        }
        Dtype::Dict => json_or(value, Value::is_object),
        Dtype::Enum => Some(value.clone()),
    }
}

fn validate_items(items: Value, subdtype: Option<Dtype>) -> Option<Value> {
    let Value::Array(items) = items else {
        return None;
    };
    let Some(subdtype) = subdtype else {
        return Some(Value::Array(items));
    };

    let mut out = Vec::with_capacity(items.len());
    for item in &items {
        if subdtype == Dtype::List {
            if !item.is_array() {
                return None;
            }
            out.push(item.clone());
        } else {
            out.push(validate_value(item, subdtype, None, None)?);
        }
    }
    Some(Value::Array(out))
}

/// The value itself if it already has the wanted shape, else parsed from JSON text.
fn json_or(value: &Value, shape: fn(&Value) -> bool) -> Option<Value> {
    if shape(value) {
        return Some(value.clone());
    }
    let parsed: Value = serde_json::from_str(value.as_str()?).ok()?;
    shape(&parsed).then_some(parsed)
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

// ============================================================================
// File-backed backend
// ============================================================================

/// In-process backend: validates against its own copy of the schema and keeps
/// the accepted configuration in `<folder>/igm-config.json`.
pub struct LocalBackend {
    pub schema: Schema,
    pub folder: PathBuf,
}

impl LocalBackend {
    pub fn new(schema: Schema, folder: impl Into<PathBuf>) -> Self {
        Self {
            schema,
            folder: folder.into(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.folder.join(CONFIG_FILE_NAME)
    }
}

impl ConfigBackend for LocalBackend {
    fn get_cfg(&self) -> Result<Option<Value>, BackendError> {
        let file = self.config_file();
        let text = match fs::read_to_string(&file) {
            Ok(text) => text,
            Err(_) => return Ok(None),
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Null) => Ok(None),
            Ok(cfg) => Ok(Some(cfg)),
            Err(e) => {
                warn!("ignoring unreadable {}: {}", file.display(), e);
                Ok(None)
            }
        }
    }

    fn save_cfg(&self, cfgdata: &FlatConfig) -> Result<SaveResponse, BackendError> {
        let report = validate_config(&self.schema, cfgdata);
        if !report.is_ok() {
            return Ok(report.into_response());
        }

        let file = self.config_file();
        let text = serde_json::to_string_pretty(&report.cfg).map_err(|source| {
            BackendError::JsonSerialize {
                context: CONFIG_FILE_NAME.to_string(),
                source,
            }
        })?;
        fs::write(&file, text).map_err(|source| BackendError::Io {
            path: file.display().to_string(),
            source,
        })?;
        info!("wrote {}", file.display());

        Ok(report.into_response())
    }
}
