mod common;

use chrono::Utc;
use common::cell;
use jobmatrix::models::{CellResult, Report, SkipReason, StepResult, StepStatus};
use jobmatrix::reporting::html::render_html_report;
use jobmatrix::reporting::json::{render_json_report, render_matrix_json};
use jobmatrix::reporting::tail_lines;
use std::time::Duration;

fn step(name: &str, status: StepStatus, exit_code: Option<i32>, output: &str) -> StepResult {
    StepResult {
        name: name.to_string(),
        status,
        skip_reason: None,
        exit_code,
        output: output.to_string(),
        duration: Duration::from_millis(250),
        timed_out: false,
    }
}

fn sample_report() -> Report {
    let passed = CellResult {
        cell: cell(&[("os", "linux"), ("py", "3.8")]),
        setup: Vec::new(),
        steps: vec![
            step("Build", StepStatus::Passed, Some(0), "ok\n"),
            step("Test", StepStatus::Passed, Some(0), "ok\n"),
        ],
        infrastructure_error: None,
        duration: Duration::from_secs(1),
    };
    let failed = CellResult {
        cell: cell(&[("os", "mac"), ("py", "3.8")]),
        setup: Vec::new(),
        steps: vec![
            step("Build", StepStatus::Passed, Some(0), "ok\n"),
            step("Test", StepStatus::Failed, Some(2), "<script>boom</script>\n"),
            StepResult::skipped("Lint", SkipReason::EarlierFailure),
        ],
        infrastructure_error: None,
        duration: Duration::from_secs(2),
    };
    Report {
        cells: vec![passed, failed],
        started_at: Utc::now(),
        duration: Duration::from_secs(2),
    }
}

#[test]
fn test_report_aggregates() {
    let report = sample_report();
    assert!(!report.passed());
    assert_eq!(report.passed_count(), 1);
    assert_eq!(report.failed_count(), 1);
    let failed: Vec<_> = report.failed_cells().collect();
    assert_eq!(failed[0].first_failure().unwrap().name, "Test");
    assert!(report.get(&cell(&[("os", "linux"), ("py", "3.8")])).unwrap().passed());
}

#[test]
fn test_infrastructure_error_fails_cell() {
    let result = CellResult {
        cell: cell(&[("os", "linux")]),
        setup: Vec::new(),
        steps: vec![StepResult::skipped("Build", SkipReason::SetupFailed)],
        infrastructure_error: Some("disk full".to_string()),
        duration: Duration::ZERO,
    };
    assert!(!result.passed());
    assert!(result.first_failure().is_none());
}

#[test]
fn test_tail_lines() {
    let output = (1..=10).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");

    assert_eq!(tail_lines(&output, 20), output);
    assert_eq!(
        tail_lines(&output, 2),
        "... (8 lines omitted)\nline 9\nline 10"
    );
}

#[test]
fn test_json_report_shape() {
    let report = sample_report();
    let json: serde_json::Value = serde_json::from_str(&render_json_report(&report).unwrap()).unwrap();

    assert_eq!(json["status"], "failed");
    assert_eq!(json["total"], 2);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["cells"][0]["cell"]["os"], "linux");
    assert_eq!(json["cells"][1]["steps"][1]["status"], "failed");
    assert_eq!(json["cells"][1]["steps"][1]["exit_code"], 2);
    assert_eq!(json["cells"][1]["steps"][2]["skip_reason"], "earlier_failure");
    assert!(json["cells"][0]["infrastructure_error"].is_null());
}

#[test]
fn test_matrix_json_lists_cells_as_objects() {
    let cells = vec![cell(&[("os", "linux"), ("py", "3.7")])];
    let json: serde_json::Value = serde_json::from_str(&render_matrix_json(&cells).unwrap()).unwrap();
    assert_eq!(json, serde_json::json!([{ "os": "linux", "py": "3.7" }]));
}

#[test]
fn test_html_report_lists_cells_and_escapes_output() {
    let html = render_html_report(&sample_report(), "en");

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("os=linux, py=3.8"));
    assert!(html.contains("os=mac, py=3.8"));
    assert!(html.contains("&lt;script&gt;boom&lt;/script&gt;"));
    assert!(!html.contains("<script>boom"));
}
