use igm_config_ui::ConfigSession;
use igm_config_ui::backend::error::BackendError;
use igm_config_ui::trace::logger::TraceLogger;
use serde_json::{Value, json};

use crate::common::backends::MemoryBackend;
use crate::common::fixtures::{full_config, igm_schema};

mod common;

fn open(backend: MemoryBackend) -> ConfigSession<MemoryBackend> {
    ConfigSession::open(backend, igm_schema(), TraceLogger::disabled()).unwrap()
}

// =========================================================================
// Opening
// =========================================================================

#[test]
fn open_loads_stored_configuration() {
    let session = open(MemoryBackend::with_stored(full_config()));

    assert_eq!(session.current_cfg(), Some(&full_config()));
    assert_eq!(session.form().is_group_enabled("model__restraints"), Some(true));
    assert_eq!(
        session.form().get_config().get("genome__assembly"),
        Some(&json!("mm10"))
    );
}

#[test]
fn open_without_stored_configuration_uses_defaults() {
    let session = open(MemoryBackend::default());

    assert_eq!(session.current_cfg(), None);
    assert_eq!(session.form().is_group_enabled("model__restraints"), Some(false));
    assert_eq!(
        session.form().get_config().get("genome__assembly"),
        Some(&json!("hg38"))
    );
}

#[test]
fn open_fails_when_backend_is_unreachable() {
    let backend = MemoryBackend::default();
    backend.unreachable.set(true);

    let result = ConfigSession::open(backend, igm_schema(), TraceLogger::disabled());
    assert!(matches!(result, Err(BackendError::Transport { .. })));
}

// =========================================================================
// Saving
// =========================================================================

#[test]
fn save_submits_visible_values_and_keeps_stored_config() {
    let mut session = open(MemoryBackend::default());
    session.form_mut().set_value("genome__assembly", "dm6").unwrap();
    let submitted = session.form().get_config();

    let response = session.save().unwrap();
    assert!(response.is_ok());
    assert_eq!(response.warnings, vec!["stored in memory"]);

    let received = session.backend().received.borrow();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], submitted);
    assert!(!received[0].contains_key("model__restraints__tolerance"));

    let stored = session.current_cfg().unwrap();
    assert_eq!(stored["genome"]["assembly"], json!("dm6"));
}

#[test]
fn rejected_save_reports_errors_and_keeps_previous_config() {
    let backend = MemoryBackend {
        reject_with: Some(vec!["optimization > seed: invalid data".into()]),
        ..MemoryBackend::with_stored(full_config())
    };
    let mut session = open(backend);

    let response = session.save().unwrap();
    assert!(!response.is_ok());
    assert_eq!(response.errors.len(), 1);
    assert_eq!(session.current_cfg(), Some(&full_config()));
}

#[test]
fn transport_failure_leaves_form_untouched() {
    let mut session = open(MemoryBackend::with_stored(full_config()));
    session.form_mut().set_value("model__radius", "9.5").unwrap();
    let before = session.form().get_config();

    session.backend().unreachable.set(true);
    match session.save() {
        Err(BackendError::Transport { request, .. }) => assert_eq!(request, "save_cfg"),
        other => panic!("expected transport error, got {:?}", other.map(|r| r.status)),
    }

    assert_eq!(session.form().get_config(), before);
    assert!(session.backend().received.borrow().is_empty());

    session.backend().unreachable.set(false);
    assert!(session.save().unwrap().is_ok(), "retry is up to the caller");
}

#[test]
fn saved_config_reloads_into_same_form_state() {
    let mut session = open(MemoryBackend::with_stored(full_config()));
    session.form_mut().set_group_enabled("model__restraints", false).unwrap();
    session.save().unwrap();
    let after_save = session.form().get_config();

    let summary = session.reload().unwrap();
    assert!(summary.unknown.is_empty());
    assert!(summary.enabled_groups.is_empty());
    assert_eq!(session.form().get_config(), after_save);
}

#[test]
fn reload_resets_local_edits() {
    let mut session = open(MemoryBackend::with_stored(full_config()));
    session.form_mut().set_value("genome__assembly", "local edit").unwrap();

    let summary = session.reload().unwrap();
    assert_eq!(summary.applied, 13);
    assert_eq!(
        session.form().get_config().get("genome__assembly"),
        Some(&json!("mm10"))
    );
}

// =========================================================================
// Trace journal
// =========================================================================

#[test]
fn session_events_are_written_as_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let trace_file = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(&trace_file);
    assert!(tracer.is_enabled());

    let backend = MemoryBackend {
        reject_with: Some(vec!["bad".into()]),
        ..Default::default()
    };
    let mut session = ConfigSession::open(backend, igm_schema(), tracer).unwrap();
    session.save().unwrap();

    let text = std::fs::read_to_string(&trace_file).unwrap();
    let events: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let kinds: Vec<&str> = events.iter().map(|e| e["kind"].as_str().unwrap()).collect();

    assert_eq!(kinds, vec!["form_built", "save_requested", "save_rejected"]);
    assert_eq!(events[0]["count"], json!(13));
    assert_eq!(events[1]["count"], json!(11));
    assert_eq!(events[2]["errors"], json!(["bad"]));
}

#[test]
fn disabled_tracer_writes_nothing() {
    let tracer = TraceLogger::disabled();
    assert!(!tracer.is_enabled());

    let mut session = ConfigSession::open(MemoryBackend::default(), igm_schema(), tracer).unwrap();
    assert!(session.save().unwrap().is_ok());
}
