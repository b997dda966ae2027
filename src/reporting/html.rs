//! # HTML Reporting Module / HTML 报告模块
//!
//! Renders a self-contained HTML page for a run: summary counters, one section per cell with
//! its ordered step table, and the captured output of failing steps.
//!
//! 为一次运行渲染一个独立的 HTML 页面：摘要计数、每个单元一个区块（包含有序步骤表），
//! 以及失败步骤的捕获输出。

use anyhow::{Context, Result};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;

use crate::core::models::{CellResult, Report, StepResult, StepStatus};
use crate::infra::t;

const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2rem; color: #24292f; }
h1 { margin-bottom: 0.25rem; }
.meta { color: #57606a; margin-bottom: 1.5rem; }
.summary { display: flex; gap: 1rem; margin-bottom: 2rem; }
.summary div { padding: 0.75rem 1.25rem; border-radius: 6px; background: #f6f8fa; }
.cell { border: 1px solid #d0d7de; border-radius: 6px; margin-bottom: 1rem; padding: 0 1rem 1rem; }
.cell.failed { border-left: 6px solid #cf222e; }
.cell.passed { border-left: 6px solid #1a7f37; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: 0.35rem 0.5rem; border-bottom: 1px solid #eaeef2; }
.status-passed { color: #1a7f37; font-weight: 600; }
.status-failed { color: #cf222e; font-weight: 600; }
.status-skipped { color: #6e7781; }
.infra { color: #9a6700; }
pre { background: #161b22; color: #e6edf3; padding: 0.75rem; overflow-x: auto; max-height: 30rem; }
"#;

/// Renders the report to an HTML string.
///
/// 将报告渲染为 HTML 字符串。
pub fn render_html_report(report: &Report, locale: &str) -> String {
    let title = t!("html_report.title", locale = locale);
    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (title) }
                p.meta {
                    (t!("html_report.started_at", locale = locale, time = report.started_at.to_rfc3339()))
                    " · "
                    (t!("html_report.duration", locale = locale, duration = format!("{:.2?}", report.duration)))
                }
                div.summary {
                    div { strong { (report.cells.len()) } " " (t!("html_report.total", locale = locale)) }
                    div.status-passed { strong { (report.passed_count()) } " " (t!("html_report.passed", locale = locale)) }
                    div.status-failed { strong { (report.failed_count()) } " " (t!("html_report.failed", locale = locale)) }
                }
                @for result in &report.cells {
                    (render_cell(result, locale))
                }
            }
        }
    };
    markup.into_string()
}

fn render_cell(result: &CellResult, locale: &str) -> Markup {
    let class = if result.passed() { "cell passed" } else { "cell failed" };
    html! {
        section class=(class) {
            h2 { (result.cell.to_string()) " " small { (result.status_str(locale)) } }
            @if let Some(error) = &result.infrastructure_error {
                p.infra { (t!("report.infrastructure_error", locale = locale)) " " (error) }
            }
            table {
                thead {
                    tr {
                        th { (t!("html_report.step", locale = locale)) }
                        th { (t!("html_report.status", locale = locale)) }
                        th { (t!("html_report.exit_code", locale = locale)) }
                        th { (t!("html_report.duration_column", locale = locale)) }
                    }
                }
                tbody {
                    @for step in result.setup.iter().filter(|s| s.status != StepStatus::Skipped) {
                        (render_step(step, locale, true))
                    }
                    @for step in &result.steps {
                        (render_step(step, locale, false))
                    }
                }
            }
        }
    }
}

fn render_step(step: &StepResult, locale: &str, setup: bool) -> Markup {
    let class = match step.status {
        StepStatus::Passed => "status-passed",
        StepStatus::Failed => "status-failed",
        StepStatus::Skipped => "status-skipped",
    };
    html! {
        tr {
            td {
                (step.name)
                @if setup { " (setup)" }
            }
            td class=(class) { (step.status_str(locale)) }
            td { @if let Some(code) = step.exit_code { (code) } @else { "-" } }
            td { (format!("{:.2?}", step.duration)) }
        }
        @if step.is_failure() && !step.output.is_empty() {
            tr {
                td colspan="4" {
                    details open {
                        summary { (t!("report.step_log", locale = locale)) }
                        pre { (step.output) }
                    }
                }
            }
        }
    }
}

/// Writes the HTML report to `output_path`, creating parent directories as needed.
///
/// 将 HTML 报告写入 `output_path`，必要时创建父目录。
pub fn generate_html_report(report: &Report, output_path: &Path, locale: &str) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(output_path, render_html_report(report, locale))
        .with_context(|| format!("Failed to write HTML report to {}", output_path.display()))
}
