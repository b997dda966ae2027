//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints the human-readable report: a per-cell summary with each cell's ordered
//! steps, followed by details for every failing cell (the first failing step and the tail of
//! its output).
//!
//! 此模块打印人类可读的报告：每个单元的摘要及其有序步骤，
//! 然后是每个失败单元的详细信息（第一个失败的步骤及其输出的末尾部分）。

use colored::*;

use crate::core::models::{CellResult, Report, StepResult, StepStatus};
use crate::infra::t;

/// Prints a formatted summary of the report to the console.
///
/// 在控制台打印格式化的报告摘要。
///
/// # Output Format / 输出格式
/// ```text
/// --- Matrix Summary ---
///   - Passed   | os=ubuntu-latest, python=3.7              |     12.31s
///       Passed   Upgrade pip
///       Passed   Launch tests
///   - Failed   | os=macos-latest, python=3.7               |      4.02s
///       Passed   Upgrade pip
///       Failed   Launch tests
///       Skipped  Check coding style
/// ```
pub fn print_summary(report: &Report, locale: &str) {
    println!("\n{}", t!("report.summary_banner", locale = locale).bold());

    for result in &report.cells {
        let status = result.status_str(locale);
        let status = if result.passed() {
            status.green()
        } else {
            status.red()
        };
        println!(
            "  - {:<14} | {:<44} | {:>10}",
            status,
            result.cell.to_string(),
            format!("{:.2?}", result.duration)
        );
        for step in result.setup.iter().filter(|s| s.status != StepStatus::Skipped) {
            println!("      {:<12} {} {}", colored_status(step, locale), step.name, "(setup)".dimmed());
        }
        for step in &result.steps {
            println!("      {:<12} {}", colored_status(step, locale), step.name);
        }
    }

    println!(
        "\n{}",
        t!(
            "report.totals",
            locale = locale,
            total = report.cells.len(),
            passed = report.passed_count(),
            failed = report.failed_count(),
            duration = format!("{:.2?}", report.duration)
        )
    );
}

fn colored_status(step: &StepResult, locale: &str) -> ColoredString {
    let label = step.status_str(locale);
    match step.status {
        StepStatus::Passed => label.green(),
        StepStatus::Failed => label.red(),
        StepStatus::Skipped => label.dimmed(),
    }
}

/// Prints details for every failed cell: the infrastructure error if provisioning failed,
/// otherwise the first failing step with the last `tail` lines of its output.
///
/// 打印每个失败单元的详细信息：如果环境准备失败则打印基础设施错误，
/// 否则打印第一个失败的步骤及其输出的最后 `tail` 行。
pub fn print_failure_details(report: &Report, locale: &str, tail: usize) {
    let failed: Vec<&CellResult> = report.failed_cells().collect();
    if failed.is_empty() {
        return;
    }

    println!("\n{}", t!("report.failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in failed.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            failed.len(),
            t!("report.failed_cell", locale = locale).red(),
            result.cell.to_string().cyan()
        );

        if let Some(error) = &result.infrastructure_error {
            println!("  {} {}", t!("report.infrastructure_error", locale = locale).yellow(), error);
        }

        if let Some(step) = result.first_failure() {
            let code = step
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {} {} ({})",
                t!("report.first_failing_step", locale = locale).yellow(),
                step.name.bold(),
                if step.timed_out {
                    t!("status.timeout", locale = locale).to_string()
                } else {
                    t!("report.exit_code", locale = locale, code = code).to_string()
                }
            );
            println!("\n--- {} ---\n", t!("report.step_log", locale = locale).yellow());
            println!("{}", tail_lines(&step.output, tail));
        }

        let skipped = result
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped && s.skip_reason.is_some())
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>();
        if !skipped.is_empty() {
            println!(
                "\n{} {}",
                t!("report.skipped_steps", locale = locale).dimmed(),
                skipped.join(", ")
            );
        }
        println!("{}", "-".repeat(80));
    }
}

/// Keeps the last `n` lines of `output`, noting how many were dropped.
///
/// 保留 `output` 的最后 `n` 行，并注明丢弃了多少行。
pub fn tail_lines(output: &str, n: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();
    if lines.len() <= n {
        return lines.join("\n");
    }
    let omitted = lines.len() - n;
    format!("... ({omitted} lines omitted)\n{}", lines[omitted..].join("\n"))
}
