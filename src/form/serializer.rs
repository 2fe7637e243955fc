use serde_json::Value;

use crate::form::error::FormError;
use crate::form::form_model::ConfigForm;
use crate::path::codec::{FlatConfig, unflatten_all};
use crate::schema::schema_model::SchemaNode;

/// Collect the value of every visible field, in schema order.
///
/// Hidden fields are skipped even if their controls still hold values.
pub fn get_config(form: &ConfigForm) -> FlatConfig {
    let mut out = FlatConfig::new();

    form.schema.visit(|path, node, _| {
        if !matches!(node, SchemaNode::Field(_)) || !form.visible.contains(path) {
            return;
        }
        if let Some(control) = form.controls.get(path) {
            out.insert(path.to_string(), control.read());
        }
    });

    out
}

pub fn get_nested_config(form: &ConfigForm) -> Result<Value, FormError> {
    Ok(unflatten_all(&get_config(form))?)
}
