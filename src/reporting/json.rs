//! # JSON Reporting Module / JSON 报告模块
//!
//! Machine-readable output: the full run report, and the generated matrix for `list --json`.
//!
//! 机器可读输出：完整的运行报告，以及用于 `list --json` 的生成矩阵。

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::core::models::{Cell, CellStatus, Report};

#[derive(Serialize)]
struct ReportDocument<'a> {
    status: CellStatus,
    total: usize,
    passed: usize,
    failed: usize,
    #[serde(flatten)]
    report: &'a Report,
}

/// Serializes the report, with overall status and counters at the top level.
pub fn render_json_report(report: &Report) -> Result<String> {
    let doc = ReportDocument {
        status: report.status(),
        total: report.cells.len(),
        passed: report.passed_count(),
        failed: report.failed_count(),
        report,
    };
    serde_json::to_string_pretty(&doc).context("Failed to serialize report")
}

/// Serializes a list of cells as an array of `{axis: value}` objects.
pub fn render_matrix_json(cells: &[Cell]) -> Result<String> {
    serde_json::to_string_pretty(cells).context("Failed to serialize matrix")
}

/// Writes the JSON report to `output_path`; `-` means standard output.
///
/// 将 JSON 报告写入 `output_path`；`-` 表示标准输出。
pub fn write_json_report(report: &Report, output_path: &Path) -> Result<()> {
    let json = render_json_report(report)?;
    if output_path.as_os_str() == "-" {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}").context("Failed to write JSON report to stdout")?;
        return Ok(());
    }
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))
}
