use serde_json::Value;

use crate::ConfigSession;
use crate::backend::client::{ConfigBackend, HttpBackend};
use crate::backend::validate::LocalBackend;
use crate::cli::config::BackendTarget;
use crate::form::builder::build_form;
use crate::form::control::{ControlKind, text_of};
use crate::form::form_model::ConfigForm;
use crate::path::codec::flatten;
use crate::report::console::{
    format_flat_config, format_form, format_save_response, format_update_summary,
};
use crate::schema::parser::parse_schema_str;
use crate::schema::schema_model::Schema;
use crate::trace::logger::TraceLogger;

/// Edits requested on the command line, applied in order: toggles, then values.
#[derive(Debug, Clone, Default)]
pub struct FormEdits {
    pub set: Vec<String>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

// ============================================================================
// show subcommand
// ============================================================================

pub fn cmd_show(
    schema_path: &str,
    config_path: Option<&str>,
    edits: &FormEdits,
) -> Result<(), Box<dyn std::error::Error>> {
    let form = open_form(schema_path, config_path, edits)?;
    print!("{}", format_form(&form));
    Ok(())
}

// ============================================================================
// flatten subcommand
// ============================================================================

pub fn cmd_flatten(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_file(config_path)?;
    print!("{}", format_flat_config(&flatten(&config)));
    Ok(())
}

// ============================================================================
// export subcommand
// ============================================================================

pub fn cmd_export(
    schema_path: &str,
    config_path: Option<&str>,
    edits: &FormEdits,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let form = open_form(schema_path, config_path, edits)?;

    let output = match format {
        "nested" => form.get_nested_config()?,
        _ => Value::Object(form.get_config()),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ============================================================================
// save subcommand
// ============================================================================

/// Returns whether the backend accepted the configuration.
pub fn cmd_save(
    schema_path: &str,
    edits: &FormEdits,
    target: &BackendTarget,
    trace_path: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let schema = load_schema(schema_path)?;
    let backend = build_backend(target, schema.clone());
    let tracer = trace_path.map_or_else(TraceLogger::disabled, TraceLogger::new);

    let mut session = ConfigSession::open(backend, schema, tracer)?;
    apply_edits(session.form_mut(), edits)?;

    let response = session.save()?;
    print!("{}", format_save_response(&response));
    Ok(response.is_ok())
}

// ============================================================================
// fetch subcommand
// ============================================================================

pub fn cmd_fetch(target: &BackendTarget) -> Result<(), Box<dyn std::error::Error>> {
    let backend = build_backend(target, Schema::default());
    match backend.get_cfg()? {
        Some(cfg) => println!("{}", serde_json::to_string_pretty(&cfg)?),
        None => eprintln!("No configuration stored"),
    }
    Ok(())
}

// ============================================================================
// Shared helpers
// ============================================================================

pub fn build_backend(target: &BackendTarget, schema: Schema) -> Box<dyn ConfigBackend> {
    match target {
        BackendTarget::Http(endpoint) => Box::new(HttpBackend::new(endpoint)),
        BackendTarget::Folder(folder) => Box::new(LocalBackend::new(schema, folder.as_str())),
    }
}

pub fn load_schema(path: &str) -> Result<Schema, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_schema_str(&text)?)
}

pub fn load_config_file(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn open_form(
    schema_path: &str,
    config_path: Option<&str>,
    edits: &FormEdits,
) -> Result<ConfigForm, Box<dyn std::error::Error>> {
    let schema = load_schema(schema_path)?;
    let config = config_path.map(load_config_file).transpose()?;

    let mut form = build_form(schema, None);
    let summary = form.update(config.as_ref());
    if config.is_some() {
        eprint!("{}", format_update_summary(&summary));
    }

    apply_edits(&mut form, edits)?;
    Ok(form)
}

pub fn apply_edits(form: &mut ConfigForm, edits: &FormEdits) -> Result<(), Box<dyn std::error::Error>> {
    for group in &edits.enable {
        form.set_group_enabled(group, true)?;
    }
    for group in &edits.disable {
        form.set_group_enabled(group, false)?;
    }
    for edit in &edits.set {
        apply_edit(form, edit)?;
    }
    Ok(())
}

/// Apply one `path=value` edit, interpreting `value` by the control's kind.
///
/// Toggles take `true`/`false`; arrays take a JSON array literal, one entry per
/// sub-field; everything else takes the text as typed.
pub fn apply_edit(form: &mut ConfigForm, edit: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (path, raw) = edit
        .split_once('=')
        .ok_or_else(|| format!("edit '{}' is not path=value", edit))?;

    let kind = form
        .control(path)
        .map(|c| c.kind.clone())
        .ok_or_else(|| format!("no control at '{}'", path))?;

    match kind {
        ControlKind::Toggle => {
            let checked = match raw.trim() {
                "true" | "on" | "yes" | "1" => true,
                "false" | "off" | "no" | "0" => false,
                other => return Err(format!("'{}' is not a boolean", other).into()),
            };
            form.set_checked(path, checked)?;
        }
        ControlKind::Array { .. } => {
            let items: Vec<Value> = serde_json::from_str(raw)?;
            for (index, item) in items.iter().enumerate() {
                form.set_cell(path, index, &text_of(item))?;
            }
        }
        _ => form.set_value(path, raw)?,
    }

    Ok(())
}
