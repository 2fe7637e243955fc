use std::collections::{BTreeMap, BTreeSet};

use crate::form::form_model::{ConfigForm, DependencyRule};
use crate::path::path_model::ConfigPath;
use crate::schema::schema_model::{Dependency, SchemaNode};

/// Paths of every group and field currently shown.
pub type VisibilitySet = BTreeSet<ConfigPath>;

/// Derive visibility from the current control values and group toggles.
///
/// An element is visible iff its parent container is shown and the dependency
/// rule recorded for it at build time (if any) holds. An optional group's header follows the
/// same rule; its contents are shown only while its toggle is on.
pub fn compute_visibility(form: &ConfigForm) -> VisibilitySet {
    let rules: BTreeMap<&ConfigPath, &DependencyRule> =
        form.dependencies.iter().map(|r| (&r.element, r)).collect();

    let mut visible = VisibilitySet::new();
    walk(form, &rules, &form.schema.children, &ConfigPath::root(), &mut visible);
    visible
}

fn walk(
    form: &ConfigForm,
    rules: &BTreeMap<&ConfigPath, &DependencyRule>,
    children: &[(String, SchemaNode)],
    parent: &ConfigPath,
    visible: &mut VisibilitySet,
) {
    for (key, node) in children {
        let path = parent.child(key);
        if let Some(rule) = rules.get(&path) {
            if !trigger_reads(form, &rule.trigger, &rule.expected) {
                continue;
            }
        }

        let contents_shown = match node {
            SchemaNode::OptionalGroup(_) => form.enabled.get(&path).copied().unwrap_or(false),
            SchemaNode::Group(_) | SchemaNode::Field(_) => true,
        };

        if contents_shown {
            walk(form, rules, node.children(), &path, visible);
        }
        visible.insert(path);
    }
}

/// Compare the trigger's current value with the expected string.
///
/// A trigger path with no control never matches, so its dependents stay hidden.
pub fn dependency_holds(form: &ConfigForm, dependency: &Dependency) -> bool {
    trigger_reads(form, &dependency.trigger, &dependency.expected)
}

fn trigger_reads(form: &ConfigForm, trigger: &ConfigPath, expected: &str) -> bool {
    form.controls
        .get(trigger)
        .and_then(|c| c.trigger_value())
        .is_some_and(|v| v == expected)
}
