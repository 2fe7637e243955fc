use crate::backend::backend_model::SaveResponse;
use crate::form::form_model::{ConfigForm, UpdateSummary};
use crate::path::codec::FlatConfig;
use crate::schema::schema_model::SchemaNode;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format the form tree for terminal output.
///
/// Produces output like:
/// ```text
/// === Configuration form: 4 controls, 2 groups ===
///
/// # Optimization
///   mode [optimization__mode] = basic (choice: basic | advanced)
///   [ ] Restraints [optimization__restraints]
///     radius [optimization__restraints__radius] = 1.5 (float) (hidden)
/// ```
pub fn format_form(form: &ConfigForm) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Configuration form: {} controls, {} groups ===\n\n",
        form.control_count(),
        form.groups().count()
    ));

    form.schema().visit(|path, node, level| {
        let indent = "  ".repeat(level.saturating_sub(1));
        let key = path.to_string();
        let hidden = if form.is_visible(&key) { "" } else { " (hidden)" };

        match node {
            SchemaNode::Group(group) => {
                out.push_str(&format!("{}# {}{}\n", indent, group.label, hidden));
            }
            SchemaNode::OptionalGroup(group) => {
                let marker = if form.is_group_enabled(&key).unwrap_or(false) {
                    "[x]"
                } else {
                    "[ ]"
                };
                out.push_str(&format!(
                    "{}{} {} [{}]{}\n",
                    indent, marker, group.label, key, hidden
                ));
            }
            SchemaNode::Field(field) => {
                let Some(control) = form.control(&key) else {
                    return;
                };
                out.push_str(&format!(
                    "{}{} [{}] = {} ({}){}\n",
                    indent,
                    field.label,
                    key,
                    control.display_value(),
                    describe_kind(control),
                    hidden
                ));
            }
        }
    });

    out
}

fn describe_kind(control: &crate::form::control::Control) -> String {
    use crate::form::control::ControlKind;

    match &control.kind {
        ControlKind::Choice { options } => format!("choice: {}", options.join(" | ")),
        ControlKind::Integer { randomized: true, .. } => "int, random".to_string(),
        ControlKind::Path { directory: true } => "directory".to_string(),
        other => other.name().to_string(),
    }
}

/// Format a flat configuration as `path = value` lines.
pub fn format_flat_config(flat: &FlatConfig) -> String {
    flat.iter()
        .map(|(path, value)| format!("{} = {}\n", path, value))
        .collect()
}

pub fn format_update_summary(summary: &UpdateSummary) -> String {
    let mut out = format!("Loaded {} values", summary.applied);
    if !summary.enabled_groups.is_empty() {
        out.push_str(&format!(
            ", enabled groups: {}",
            summary.enabled_groups.join(", ")
        ));
    }
    out.push('\n');
    for path in &summary.unknown {
        out.push_str(&format!("    [SKIP] {} has no control\n", path));
    }
    out
}

/// Format the backend's answer to a save the way the panel's alert box does.
pub fn format_save_response(response: &SaveResponse) -> String {
    let mut out = String::new();

    let marker = if response.is_ok() {
        "\u{2713} Saved!"
    } else {
        "\u{2717} Failed"
    };
    out.push_str(marker);
    out.push('\n');

    if let Some(ref reason) = response.reason {
        out.push_str(&format!("    [ERROR] {}\n", reason));
    }
    for error in &response.errors {
        out.push_str(&format!("ERROR: {}\n", error));
    }
    for warning in &response.warnings {
        out.push_str(&format!("WARNING: {}\n", warning));
    }

    out
}
