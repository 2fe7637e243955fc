use log::warn;
use rand::Rng;
use serde_json::{Number, Value, json};

use crate::form::error::FormError;
use crate::path::path_model::ConfigPath;
use crate::schema::schema_model::{Dtype, DtypeSpec, FieldSpec};

/// Default value that asks for a fresh random integer at build time.
pub const RANDOM_DEFAULT: &str = "_random";

/// Upper bound (exclusive) for generated `_random` integers.
pub const RANDOM_MAX: i64 = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    /// Single-choice selector over `allowed_values`
    Choice { options: Vec<String> },
    Integer {
        min: Option<f64>,
        max: Option<f64>,
        /// Default was `_random`; the control offers a regenerate action
        randomized: bool,
    },
    Float { min: Option<f64>, max: Option<f64> },
    /// Free text (`str`, or a list of candidate dtypes)
    Text,
    /// Filesystem path text
    Path { directory: bool },
    /// JSON literal text (`list`, `dict`)
    Json,
    /// Fixed number of sibling sub-fields
    Array { sublabels: Vec<String> },
    Toggle,
}

impl ControlKind {
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::Choice { .. } => "choice",
            ControlKind::Integer { .. } => "int",
            ControlKind::Float { .. } => "float",
            ControlKind::Text => "text",
            ControlKind::Path { .. } => "path",
            ControlKind::Json => "json",
            ControlKind::Array { .. } => "array",
            ControlKind::Toggle => "toggle",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, ControlKind::Integer { .. } | ControlKind::Float { .. })
    }
}

/// Raw widget state, as an input element would hold it.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Text(String),
    Choice(Option<String>),
    Cells(Vec<String>),
    Toggle(bool),
}

/// One bound input control.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub path: ConfigPath,
    pub label: String,
    pub kind: ControlKind,
    value: ControlValue,
}

impl Control {
    /// Create the control for a field and return it with its effective default.
    ///
    /// The effective default differs from the declared one only for `_random`
    /// integers, which are drawn here once.
    pub fn for_field<R: Rng>(path: ConfigPath, field: &FieldSpec, rng: &mut R) -> (Control, Value) {
        let kind = kind_for(field);
        let mut default = field.default.clone().unwrap_or(Value::Null);

        let kind = match kind {
            ControlKind::Integer { min, max, .. } if default.as_str() == Some(RANDOM_DEFAULT) => {
                default = json!(rng.gen_range(0..RANDOM_MAX));
                ControlKind::Integer { min, max, randomized: true }
            }
            other => other,
        };

        let value = match &kind {
            ControlKind::Choice { .. } => ControlValue::Choice(None),
            ControlKind::Array { sublabels } => ControlValue::Cells(vec![String::new(); sublabels.len()]),
            ControlKind::Toggle => ControlValue::Toggle(false),
            _ => ControlValue::Text(String::new()),
        };

        let mut control = Control {
            path,
            label: field.label.clone(),
            kind,
            value,
        };
        control.assign(&default);
        (control, default)
    }

    pub fn value(&self) -> &ControlValue {
        &self.value
    }

    /// Number of addressable inputs this control renders.
    pub fn input_count(&self) -> usize {
        match &self.value {
            ControlValue::Cells(cells) => cells.len(),
            _ => 1,
        }
    }

    // ========================================================================
    // Programmatic assignment (defaults, incoming configuration)
    // ========================================================================

    /// Write a configuration value into the widget with dtype-specific coercion.
    pub fn assign(&mut self, value: &Value) {
        let kind = &self.kind;
        match &mut self.value {
            ControlValue::Toggle(checked) => *checked = truthy(value),
            ControlValue::Cells(cells) => match value {
                Value::Array(items) => {
                    for (cell, item) in cells.iter_mut().zip(items) {
                        *cell = text_of(item);
                    }
                }
                Value::Null => {}
                other => warn!("'{}': expected an array, ignoring {}", self.path, other),
            },
            ControlValue::Choice(selected) => {
                let ControlKind::Choice { options } = kind else {
                    return;
                };
                let text = text_of(value);
                *selected = options.iter().find(|o| **o == text).cloned();
            }
            ControlValue::Text(text) => {
                let incoming = text_of(value);
                *text = if kind.is_numeric() && !is_number_text(&incoming) {
                    String::new()
                } else {
                    incoming
                };
            }
        }
    }

    /// Clear the widget, then assign `default`.
    ///
    /// Cells a short (or null) default does not cover end up empty.
    pub fn reset(&mut self, default: &Value) {
        match &mut self.value {
            ControlValue::Text(text) => text.clear(),
            ControlValue::Choice(selected) => *selected = None,
            ControlValue::Cells(cells) => cells.iter_mut().for_each(String::clear),
            ControlValue::Toggle(checked) => *checked = false,
        }
        self.assign(default);
    }

    // ========================================================================
    // User edits
    // ========================================================================

    pub fn set_text(&mut self, input: &str) -> Result<(), FormError> {
        let path = self.path.to_string();
        match (&self.kind, &mut self.value) {
            (ControlKind::Choice { options }, ControlValue::Choice(selected)) => {
                if !options.iter().any(|o| o == input) {
                    return Err(FormError::InvalidChoice {
                        path,
                        value: input.to_string(),
                        options: options.clone(),
                    });
                }
                *selected = Some(input.to_string());
                Ok(())
            }
            (kind, ControlValue::Text(text)) => {
                if kind.is_numeric() && !is_number_text(input) {
                    return Err(FormError::NotANumber {
                        path,
                        value: input.to_string(),
                    });
                }
                *text = input.to_string();
                Ok(())
            }
            _ => Err(FormError::KindMismatch {
                path,
                expected: "a text or choice control",
            }),
        }
    }

    pub fn set_cell(&mut self, index: usize, input: &str) -> Result<(), FormError> {
        let path = self.path.to_string();
        let ControlValue::Cells(cells) = &mut self.value else {
            return Err(FormError::KindMismatch {
                path,
                expected: "an array control",
            });
        };
        let length = cells.len();
        let cell = cells
            .get_mut(index)
            .ok_or(FormError::CellOutOfRange { path, index, length })?;
        *cell = input.to_string();
        Ok(())
    }

    pub fn set_checked(&mut self, checked: bool) -> Result<(), FormError> {
        match &mut self.value {
            ControlValue::Toggle(state) => {
                *state = checked;
                Ok(())
            }
            _ => Err(FormError::KindMismatch {
                path: self.path.to_string(),
                expected: "a toggle",
            }),
        }
    }

    /// Draw a new value for a `_random` integer control.
    pub fn regenerate<R: Rng>(&mut self, rng: &mut R) -> Result<i64, FormError> {
        match (&self.kind, &mut self.value) {
            (ControlKind::Integer { randomized: true, .. }, ControlValue::Text(text)) => {
                let n = rng.gen_range(0..RANDOM_MAX);
                *text = n.to_string();
                Ok(n)
            }
            _ => Err(FormError::KindMismatch {
                path: self.path.to_string(),
                expected: "a randomized integer",
            }),
        }
    }

    // ========================================================================
    // Read-back
    // ========================================================================

    /// Current value with the inverse coercion applied, ready for serialization.
    pub fn read(&self) -> Value {
        match &self.value {
            ControlValue::Toggle(checked) => Value::Bool(*checked),
            ControlValue::Cells(cells) => {
                Value::Array(cells.iter().map(|c| number_or_text(c)).collect())
            }
            ControlValue::Choice(selected) => selected
                .as_ref()
                .map_or(Value::Null, |s| Value::String(s.clone())),
            ControlValue::Text(text) if self.kind.is_numeric() => number_or_text(text),
            ControlValue::Text(text) => Value::String(text.clone()),
        }
    }

    /// The string a dependency clause is compared against. Arrays have none.
    pub fn trigger_value(&self) -> Option<String> {
        match &self.value {
            ControlValue::Text(text) => Some(text.clone()),
            ControlValue::Choice(selected) => selected.clone(),
            ControlValue::Toggle(checked) => Some(checked.to_string()),
            ControlValue::Cells(_) => None,
        }
    }

    /// Short text shown when rendering the form.
    pub fn display_value(&self) -> String {
        match &self.value {
            ControlValue::Text(text) => text.clone(),
            ControlValue::Choice(selected) => selected.clone().unwrap_or_default(),
            ControlValue::Toggle(checked) => if *checked { "[x]" } else { "[ ]" }.to_string(),
            ControlValue::Cells(cells) => {
                let ControlKind::Array { sublabels } = &self.kind else {
                    return cells.join(", ");
                };
                sublabels
                    .iter()
                    .zip(cells)
                    .map(|(label, cell)| format!("{}={}", label, cell))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
    }
}

// ============================================================================
// Kind selection
// ============================================================================

fn kind_for(field: &FieldSpec) -> ControlKind {
    if let Some(allowed) = &field.allowed_values {
        return ControlKind::Choice {
            options: allowed.iter().map(text_of).collect(),
        };
    }

    match &field.dtype {
        DtypeSpec::AnyOf(_) | DtypeSpec::Unspecified => ControlKind::Text,
        DtypeSpec::One(dtype) => match dtype {
            Dtype::Int => ControlKind::Integer {
                min: field.min,
                max: field.max,
                randomized: false,
            },
            Dtype::Float => ControlKind::Float {
                min: field.min,
                max: field.max,
            },
            Dtype::Str | Dtype::Enum => ControlKind::Text,
            Dtype::Path => ControlKind::Path { directory: false },
            Dtype::PathDir => ControlKind::Path { directory: true },
            Dtype::List | Dtype::Dict => ControlKind::Json,
            Dtype::Array => {
                let length = field.length.unwrap_or(0);
                let declared = field.sublabels.clone().unwrap_or_default();
                let sublabels = (0..length)
                    .map(|i| declared.get(i).cloned().unwrap_or_else(|| i.to_string()))
                    .collect();
                ControlKind::Array { sublabels }
            }
            Dtype::Bool => ControlKind::Toggle,
        },
    }
}

// ============================================================================
// Coercion helpers
// ============================================================================

/// Text a widget shows for a value: strings verbatim, null empty, the rest as spaced JSON.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => spaced_json(other),
    }
}

/// Compact JSON with a space after each separating comma: `[1, 2, 3]`.
pub fn spaced_json(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(spaced_json).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), spaced_json(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
        scalar => scalar.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Empty text counts: a cleared number input is still valid.
fn is_number_text(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || t.parse::<f64>().is_ok_and(f64::is_finite)
}

fn number_or_text(text: &str) -> Value {
    let t = text.trim();
    if let Ok(n) = t.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = t.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(text.to_string())
}
