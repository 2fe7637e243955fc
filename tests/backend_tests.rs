use igm_config_ui::backend::{
    backend_model::{BackendRequest, SaveResponse, SaveStatus},
    client::{ConfigBackend, HttpBackend, parse_current_config, parse_save_response},
    error::BackendError,
    validate::{CONFIG_FILE_NAME, LocalBackend, validate_config, validate_value},
};
use igm_config_ui::form::builder::build_form;
use igm_config_ui::path::codec::FlatConfig;
use igm_config_ui::schema::schema_model::Dtype;
use serde_json::{Value, json};

use crate::common::backends::UNREACHABLE_ENDPOINT;
use crate::common::fixtures::{full_config, igm_schema};

mod common;

fn flat(value: Value) -> FlatConfig {
    serde_json::from_value(value).unwrap()
}

// =========================================================================
// Wire format
// =========================================================================

#[test]
fn requests_are_tagged_by_request_field() {
    assert_eq!(
        serde_json::to_value(BackendRequest::GetCfg).unwrap(),
        json!({ "request": "get_cfg" })
    );

    let save = BackendRequest::SaveCfg {
        cfgdata: flat(json!({ "genome__assembly": "hg38" })),
    };
    assert_eq!(
        serde_json::to_value(&save).unwrap(),
        json!({ "request": "save_cfg", "cfgdata": { "genome__assembly": "hg38" } })
    );
    assert_eq!(save.name(), "save_cfg");
}

#[test]
fn save_responses_parse_all_status_spellings() {
    let ok = parse_save_response(
        r#"{"status":"ok","cfg":{"a":1},"errors":[],"warnings":["w"]}"#,
    )
    .unwrap();
    assert!(ok.is_ok());
    assert_eq!(ok.cfg, Some(json!({ "a": 1 })));
    assert_eq!(ok.warnings, vec!["w"]);

    let failed = parse_save_response(r#"{"status":"failed","cfg":null,"errors":["bad"],"warnings":[]}"#)
        .unwrap();
    assert_eq!(failed.status, SaveStatus::Error);
    assert_eq!(failed.errors, vec!["bad"]);

    let crashed = parse_save_response(r#"{"status":"failed","reason":"Traceback ..."}"#).unwrap();
    assert!(!crashed.is_ok());
    assert!(crashed.errors.is_empty());
    assert_eq!(crashed.reason.as_deref(), Some("Traceback ..."));

    assert!(matches!(
        parse_save_response("<html>500</html>"),
        Err(BackendError::JsonParse { .. })
    ));
}

#[test]
fn current_config_treats_null_and_empty_as_absent() {
    assert_eq!(parse_current_config("null").unwrap(), None);
    assert_eq!(parse_current_config("").unwrap(), None);
    assert_eq!(parse_current_config("{}").unwrap(), None);
    assert_eq!(
        parse_current_config(r#"{"genome":{"assembly":"hg38"}}"#).unwrap(),
        Some(json!({ "genome": { "assembly": "hg38" } }))
    );
    assert!(parse_current_config("{broken").is_err());
}

#[test]
fn unreachable_endpoint_is_a_transport_error() {
    let backend = HttpBackend::new(UNREACHABLE_ENDPOINT);
    match backend.get_cfg() {
        Err(BackendError::Transport { request, .. }) => assert_eq!(request, "get_cfg"),
        other => panic!("expected transport error, got {:?}", other.map(|_| ())),
    }
}

// =========================================================================
// Single-value coercion
// =========================================================================

#[test]
fn validate_value_coercions() {
    assert_eq!(validate_value(&json!("12"), Dtype::Int, None, None), Some(json!(12)));
    assert_eq!(validate_value(&json!(3.9), Dtype::Int, None, None), Some(json!(3)));
    assert_eq!(validate_value(&json!("1.5"), Dtype::Int, None, None), None);
    assert_eq!(validate_value(&json!("1.5"), Dtype::Float, None, None), Some(json!(1.5)));
    assert_eq!(validate_value(&json!("x"), Dtype::Float, None, None), None);
    assert_eq!(validate_value(&json!(""), Dtype::Bool, None, None), Some(json!(false)));
    assert_eq!(validate_value(&json!(7), Dtype::Str, None, None), Some(json!("7")));

    assert_eq!(
        validate_value(&json!("[1, \"2\"]"), Dtype::List, Some(Dtype::Int), None),
        Some(json!([1, 2]))
    );
    assert_eq!(validate_value(&json!("5"), Dtype::List, None, None), None, "JSON must be a list");
    assert_eq!(
        validate_value(&json!([[1], [2, 3]]), Dtype::List, Some(Dtype::List), None),
        Some(json!([[1], [2, 3]]))
    );

    assert_eq!(
        validate_value(&json!(["1", "2", "3"]), Dtype::Array, Some(Dtype::Float), Some(3)),
        Some(json!([1.0, 2.0, 3.0]))
    );
    assert_eq!(
        validate_value(&json!([1, 2]), Dtype::Array, None, Some(3)),
        None,
        "length must match"
    );

    assert_eq!(
        validate_value(&json!("{\"k\": 1}"), Dtype::Dict, None, None),
        Some(json!({ "k": 1 }))
    );
}

// =========================================================================
// Whole-config validation
// =========================================================================

#[test]
fn form_output_validates_into_typed_config() {
    let form = build_form(igm_schema(), Some(&full_config()));
    let report = validate_config(&igm_schema(), &form.get_config());

    assert!(report.is_ok(), "errors: {:?}", report.errors);
    assert_eq!(report.cfg["optimization"]["iterations"], json!([4, 5]));
    assert_eq!(report.cfg["model"]["center"], json!([1, 2, 3]));
    assert_eq!(report.cfg["optimization"]["seed"], json!(42));
    assert_eq!(report.cfg["optimization"]["kernel"], json!("gauss"));
    assert_eq!(report.cfg["genome"]["ploidy"], json!("haploid"));
    assert_eq!(
        report.warnings,
        vec!["optimization > input_file: cannot find input file \"/data/input.hic\""]
    );
}

#[test]
fn type_and_choice_violations_are_errors() {
    let report = validate_config(
        &igm_schema(),
        &flat(json!({
            "optimization__seed": "abc",
            "model__mode": "expert",
            "genome__assembly": "hg38"
        })),
    );

    assert_eq!(
        report.errors,
        vec![
            "optimization > seed: invalid data \"abc\". Valid data type are \"int\"",
            "model > mode: invalid value \"expert\". Valid values are \"basic, advanced\"",
        ]
    );
    assert_eq!(report.cfg, json!({ "genome": { "assembly": "hg38" } }));

    let response = report.into_response();
    assert_eq!(response.status, SaveStatus::Error);
    assert_eq!(response.cfg, None);
}

#[test]
fn unknown_keys_are_kept_with_warning() {
    let report = validate_config(&igm_schema(), &flat(json!({ "log": "igm.log" })));
    assert!(report.is_ok());
    assert_eq!(report.warnings, vec!["key \"log\" not in schema"]);
    assert_eq!(report.cfg, json!({ "log": "igm.log" }));
}

#[test]
fn group_paths_are_not_fields_and_are_kept_with_warning() {
    let report = validate_config(
        &igm_schema(),
        &flat(json!({
            "model__restraints": true,
            "genome__assembly": "hg19"
        })),
    );

    assert!(report.is_ok(), "a group path is not a validation error");
    assert_eq!(report.warnings, vec!["key \"model > restraints\" not in schema"]);
    assert_eq!(
        report.cfg,
        json!({ "model": { "restraints": true }, "genome": { "assembly": "hg19" } })
    );
    assert_eq!(report.into_response().status, SaveStatus::Ok);
}

#[test]
fn empty_text_is_dropped_and_candidates_tried_in_order() {
    let report = validate_config(
        &igm_schema(),
        &flat(json!({
            "genome__assembly": "  ",
            "optimization__kernel": "7"
        })),
    );
    assert!(report.is_ok());
    assert_eq!(report.cfg, json!({ "optimization": { "kernel": 7 } }));
}

// =========================================================================
// File-backed backend
// =========================================================================

#[test]
fn local_backend_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::new(igm_schema(), dir.path());

    assert_eq!(backend.get_cfg().unwrap(), None);

    let form = build_form(igm_schema(), Some(&full_config()));
    let response: SaveResponse = backend.save_cfg(&form.get_config()).unwrap();
    assert!(response.is_ok());
    assert!(dir.path().join(CONFIG_FILE_NAME).is_file());

    let stored = backend.get_cfg().unwrap().unwrap();
    assert_eq!(Some(&stored), response.cfg.as_ref());
    assert_eq!(stored["genome"]["segment_length"], json!(100000));
}

#[test]
fn local_backend_does_not_write_rejected_config() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::new(igm_schema(), dir.path());

    let response = backend
        .save_cfg(&flat(json!({ "genome__segment_length": "many" })))
        .unwrap();
    assert!(!response.is_ok());
    assert_eq!(response.errors.len(), 1);
    assert!(!dir.path().join(CONFIG_FILE_NAME).exists());
}

#[test]
fn local_backend_ignores_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ truncated").unwrap();

    let backend = LocalBackend::new(igm_schema(), dir.path());
    assert_eq!(backend.get_cfg().unwrap(), None);
}
