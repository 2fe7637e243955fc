use igm_config_ui::backend::backend_model::{SaveResponse, SaveStatus};
use igm_config_ui::form::builder::build_form;
use igm_config_ui::form::form_model::UpdateSummary;
use igm_config_ui::report::console::{
    format_flat_config, format_form, format_save_response, format_update_summary,
};

use crate::common::fixtures::igm_schema;

mod common;

// ============================================================================
// Form rendering
// ============================================================================

#[test]
fn form_render_shows_tree_values_and_visibility() {
    let form = build_form(igm_schema(), None);
    let output = format_form(&form);

    assert!(output.starts_with("=== Configuration form: 13 controls, 4 groups ===\n"));
    assert!(output.contains("# Genome\n"));
    assert!(output.contains(
        "  Ploidy [genome__ploidy] = diploid (choice: haploid | diploid)\n"
    ));
    assert!(output.contains("  Center [model__center] = x=0, y=0, z=0 (array)\n"));
    assert!(output.contains("  [ ] Restraints [model__restraints]\n"));
    assert!(output.contains(
        "    Tolerance [model__restraints__tolerance] = 0.05 (float) (hidden)\n"
    ));
    assert!(output.contains("(int, random)"));
    assert!(!output.contains("_meta"));
}

#[test]
fn form_render_marks_enabled_group() {
    let mut form = build_form(igm_schema(), None);
    form.set_group_enabled("model__restraints", true).unwrap();
    let output = format_form(&form);

    assert!(output.contains("  [x] Restraints [model__restraints]\n"));
    assert!(output.contains("    Tolerance [model__restraints__tolerance] = 0.05 (float)\n"));
}

// ============================================================================
// Config and summaries
// ============================================================================

#[test]
fn flat_config_lines_use_json_values() {
    let form = build_form(igm_schema(), None);
    let output = format_flat_config(&form.get_config());

    assert!(output.starts_with("genome__assembly = \"hg38\"\n"));
    assert!(output.contains("model__center = [0,0,0]\n"));
    assert!(output.contains("optimization__keep_temporary_files = false\n"));
}

#[test]
fn update_summary_lists_skipped_paths() {
    let summary = UpdateSummary {
        applied: 2,
        unknown: vec!["log".into()],
        enabled_groups: vec!["model__restraints".into()],
    };
    assert_eq!(
        format_update_summary(&summary),
        "Loaded 2 values, enabled groups: model__restraints\n    [SKIP] log has no control\n"
    );
}

// ============================================================================
// Save responses
// ============================================================================

#[test]
fn save_response_success() {
    let response = SaveResponse {
        status: SaveStatus::Ok,
        cfg: None,
        errors: vec![],
        warnings: vec!["key \"log\" not in schema".into()],
        reason: None,
    };
    assert_eq!(
        format_save_response(&response),
        "\u{2713} Saved!\nWARNING: key \"log\" not in schema\n"
    );
}

#[test]
fn save_response_failure_with_reason() {
    let response = SaveResponse {
        status: SaveStatus::Error,
        cfg: None,
        errors: vec!["optimization > seed: invalid data \"abc\"".into()],
        warnings: vec![],
        reason: Some("backend crashed".into()),
    };
    let output = format_save_response(&response);

    assert!(output.starts_with("\u{2717} Failed\n"));
    assert!(output.contains("    [ERROR] backend crashed\n"));
    assert!(output.contains("ERROR: optimization > seed: invalid data \"abc\"\n"));
}
