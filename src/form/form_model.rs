use std::collections::BTreeMap;

use log::debug;
use serde_json::Value;

use crate::form::control::Control;
use crate::form::error::FormError;
use crate::form::serializer;
use crate::form::visibility::{VisibilitySet, compute_visibility};
use crate::path::codec::{FlatConfig, flatten_paths};
use crate::path::path_model::ConfigPath;
use crate::schema::schema_model::{Dependency, Schema};

/// Visibility container created for every group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    pub path: ConfigPath,
    pub label: String,
    pub description: Option<String>,
    pub optional: bool,
    pub level: usize,
}

/// `element` is shown only while the control at `trigger` reads `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRule {
    pub element: ConfigPath,
    pub trigger: ConfigPath,
    pub expected: String,
}

impl DependencyRule {
    pub fn new(element: ConfigPath, dependency: &Dependency) -> Self {
        Self {
            element,
            trigger: dependency.trigger.clone(),
            expected: dependency.expected.clone(),
        }
    }
}

/// What an [`ConfigForm::update`] call did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSummary {
    /// Config paths written into a control
    pub applied: usize,
    /// Config paths with no control in this form
    pub unknown: Vec<String>,
    /// Optional groups switched on because the config populates them
    pub enabled_groups: Vec<String>,
}

/// A built configuration form: bound controls plus their visibility state.
///
/// Created by [`crate::form::builder::build_form`]; every read and write of
/// control state goes through its methods.
#[derive(Debug, Clone)]
pub struct ConfigForm {
    pub(crate) schema: Schema,
    pub(crate) controls: BTreeMap<ConfigPath, Control>,
    pub(crate) groups: BTreeMap<ConfigPath, GroupEntry>,
    pub(crate) enabled: BTreeMap<ConfigPath, bool>,
    pub(crate) defaults: BTreeMap<ConfigPath, Value>,
    pub(crate) dependencies: Vec<DependencyRule>,
    pub(crate) visible: VisibilitySet,
}

impl ConfigForm {
    pub(crate) fn new(
        schema: Schema,
        controls: BTreeMap<ConfigPath, Control>,
        groups: BTreeMap<ConfigPath, GroupEntry>,
        defaults: BTreeMap<ConfigPath, Value>,
        dependencies: Vec<DependencyRule>,
    ) -> Self {
        let enabled = groups
            .values()
            .filter(|g| g.optional)
            .map(|g| (g.path.clone(), false))
            .collect();

        let mut form = Self {
            schema,
            controls,
            groups,
            enabled,
            defaults,
            dependencies,
            visible: VisibilitySet::default(),
        };
        form.refresh();
        form
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn control(&self, path: &str) -> Option<&Control> {
        self.controls.get(&ConfigPath::parse(path))
    }

    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    /// Total addressable inputs (array sub-fields counted individually).
    pub fn input_count(&self) -> usize {
        self.controls.values().map(Control::input_count).sum()
    }

    pub fn group(&self, path: &str) -> Option<&GroupEntry> {
        self.groups.get(&ConfigPath::parse(path))
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupEntry> {
        self.groups.values()
    }

    pub fn optional_group_paths(&self) -> Vec<String> {
        self.enabled.keys().map(ToString::to_string).collect()
    }

    pub fn is_group_enabled(&self, path: &str) -> Option<bool> {
        self.enabled.get(&ConfigPath::parse(path)).copied()
    }

    pub fn default_of(&self, path: &str) -> Option<&Value> {
        self.defaults.get(&ConfigPath::parse(path))
    }

    pub fn dependencies(&self) -> &[DependencyRule] {
        &self.dependencies
    }

    pub fn visibility(&self) -> &VisibilitySet {
        &self.visible
    }

    pub fn is_visible(&self, path: &str) -> bool {
        self.visible.contains(&ConfigPath::parse(path))
    }

    // ========================================================================
    // User edits
    // ========================================================================

    pub fn set_value(&mut self, path: &str, text: &str) -> Result<(), FormError> {
        self.control_mut(path)?.set_text(text)?;
        self.refresh();
        Ok(())
    }

    pub fn set_cell(&mut self, path: &str, index: usize, text: &str) -> Result<(), FormError> {
        self.control_mut(path)?.set_cell(index, text)?;
        self.refresh();
        Ok(())
    }

    pub fn set_checked(&mut self, path: &str, checked: bool) -> Result<(), FormError> {
        self.control_mut(path)?.set_checked(checked)?;
        self.refresh();
        Ok(())
    }

    /// Flip the gating toggle of an optional group.
    pub fn set_group_enabled(&mut self, path: &str, enabled: bool) -> Result<(), FormError> {
        let state = self
            .enabled
            .get_mut(&ConfigPath::parse(path))
            .ok_or_else(|| FormError::UnknownGroup(path.to_string()))?;
        *state = enabled;
        self.refresh();
        Ok(())
    }

    pub fn regenerate(&mut self, path: &str) -> Result<i64, FormError> {
        let n = self.control_mut(path)?.regenerate(&mut rand::thread_rng())?;
        self.refresh();
        Ok(n)
    }

    // ========================================================================
    // Bulk state changes
    // ========================================================================

    /// Every control back to its recorded default, every optional group off.
    pub fn reset_to_defaults(&mut self) {
        for (path, control) in self.controls.iter_mut() {
            let default = self.defaults.get(path).unwrap_or(&Value::Null);
            control.reset(default);
        }
        for state in self.enabled.values_mut() {
            *state = false;
        }
        self.refresh();
    }

    /// Reset to defaults, then load `config` (a nested configuration object).
    ///
    /// Optional groups end up enabled iff at least one incoming path lies
    /// under them. Paths without a control are skipped and reported.
    pub fn update(&mut self, config: Option<&Value>) -> UpdateSummary {
        self.reset_to_defaults();

        let mut summary = UpdateSummary::default();
        let Some(config) = config.filter(|c| !c.is_null()) else {
            return summary;
        };

        let entries = flatten_paths(config);
        for (path, value) in &entries {
            match self.controls.get_mut(path) {
                Some(control) => {
                    control.assign(value);
                    summary.applied += 1;
                }
                None => {
                    debug!("config path '{}' has no control", path);
                    summary.unknown.push(path.to_string());
                }
            }
        }

        for (group, state) in self.enabled.iter_mut() {
            *state = entries.iter().any(|(path, _)| path.starts_with(group));
            if *state {
                summary.enabled_groups.push(group.to_string());
            }
        }

        self.refresh();
        summary
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Flat `path -> value` mapping of every visible field.
    pub fn get_config(&self) -> FlatConfig {
        serializer::get_config(self)
    }

    /// [`ConfigForm::get_config`] nested back into the schema's shape.
    pub fn get_nested_config(&self) -> Result<Value, FormError> {
        serializer::get_nested_config(self)
    }

    fn control_mut(&mut self, path: &str) -> Result<&mut Control, FormError> {
        self.controls
            .get_mut(&ConfigPath::parse(path))
            .ok_or_else(|| FormError::UnknownControl(path.to_string()))
    }

    fn refresh(&mut self) {
        self.visible = compute_visibility(self);
    }
}
