use std::collections::BTreeMap;

use log::info;
use rand::Rng;
use serde_json::Value;

use crate::form::control::Control;
use crate::form::form_model::{ConfigForm, DependencyRule, GroupEntry};
use crate::path::path_model::ConfigPath;
use crate::schema::schema_model::{Schema, SchemaNode};

/// Build a form from a schema and load `initial` into it.
pub fn build_form(schema: Schema, initial: Option<&Value>) -> ConfigForm {
    build_form_with_rng(schema, initial, &mut rand::thread_rng())
}

/// [`build_form`] with a caller-supplied generator for `_random` defaults.
pub fn build_form_with_rng<R: Rng>(schema: Schema, initial: Option<&Value>, rng: &mut R) -> ConfigForm {
    let mut parts = Parts::default();
    walk(&schema.children, &ConfigPath::root(), 1, rng, &mut parts);

    info!(
        "built form: {} controls, {} groups, {} dependencies",
        parts.controls.len(),
        parts.groups.len(),
        parts.dependencies.len()
    );

    let mut form = ConfigForm::new(
        schema,
        parts.controls,
        parts.groups,
        parts.defaults,
        parts.dependencies,
    );
    form.update(initial);
    form
}

#[derive(Default)]
struct Parts {
    controls: BTreeMap<ConfigPath, Control>,
    groups: BTreeMap<ConfigPath, GroupEntry>,
    defaults: BTreeMap<ConfigPath, Value>,
    dependencies: Vec<DependencyRule>,
}

fn walk<R: Rng>(
    children: &[(String, SchemaNode)],
    parent: &ConfigPath,
    level: usize,
    rng: &mut R,
    parts: &mut Parts,
) {
    for (key, node) in children {
        let path = parent.child(key);

        if let Some(dependency) = node.depends_on() {
            parts.dependencies.push(DependencyRule::new(path.clone(), dependency));
        }

        match node {
            SchemaNode::Group(group) | SchemaNode::OptionalGroup(group) => {
                parts.groups.insert(
                    path.clone(),
                    GroupEntry {
                        path: path.clone(),
                        label: group.label.clone(),
                        description: group.description.clone(),
                        optional: matches!(node, SchemaNode::OptionalGroup(_)),
                        level,
                    },
                );
                walk(&group.children, &path, level + 1, rng, parts);
            }
            SchemaNode::Field(field) => {
                let (control, default) = Control::for_field(path.clone(), field, rng);
                parts.defaults.insert(path.clone(), default);
                parts.controls.insert(path, control);
            }
        }
    }
}
