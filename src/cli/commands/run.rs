//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command: load and validate the configuration, expand the
//! matrix, narrow it to this runner's share, execute every cell and report.
//!
//! 此模块实现了 `run` 命令：加载并验证配置，展开矩阵，将其缩小到本运行器负责的部分，
//! 执行每个单元并生成报告。

use anyhow::{Context, Result};
use colored::*;
use std::{fs, path::Path, path::PathBuf, sync::Arc, time::Duration};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::MatrixConfig,
        error::ConfigError,
        executor::ExecutionSettings,
        orchestrator::Orchestrator,
        planner::{self, ExecutionPlan, Selection},
    },
    infra::{command::ProcessRunner, t},
    reporting::{generate_html_report, print_failure_details, print_summary, write_json_report},
};

/// Arguments of the `run` command.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Maximum number of cells in flight. Falls back to the config, then to half the CPUs + 1.
    pub jobs: Option<usize>,
    pub config: PathBuf,
    pub project_dir: PathBuf,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    /// `axis=value` selectors.
    pub only: Vec<String>,
    /// Default per-step timeout, overriding the config.
    pub timeout_secs: Option<u64>,
    pub html: Option<PathBuf>,
    /// JSON report path; `-` writes to standard output.
    pub json: Option<PathBuf>,
    pub quiet: bool,
}

/// Loads the configuration and computes the cells this runner is responsible for.
/// Shared by `run` and `list`.
///
/// 加载配置并计算本运行器负责的单元。由 `run` 和 `list` 共享。
pub(crate) fn load_plan(
    config_path: &Path,
    only: &[String],
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<(MatrixConfig, ExecutionPlan)> {
    let config = MatrixConfig::load(config_path)?;
    let selection = Selection::parse(only)?;
    selection.validate(&config.axes)?;
    let cells = config.generate_matrix()?;
    let plan = planner::plan_execution(cells, &selection, total_runners, runner_index)?;
    Ok((config, plan))
}

/// Executes the run command with the provided arguments.
///
/// # Errors
/// Configuration problems surface as [`ConfigError`] in the error chain. A run with at least
/// one failed cell also returns an error, after the report has been written.
pub async fn execute(args: RunArgs, lang: Option<&str>) -> Result<()> {
    let (config, plan) = load_plan(
        &args.config,
        &args.only,
        args.total_runners,
        args.runner_index,
    )?;
    let locale = crate::init(&[lang, config.language.as_deref()]);

    let json_to_stdout = args.json.as_deref().is_some_and(|p| p.as_os_str() == "-");
    let quiet = args.quiet || json_to_stdout;

    let project_root = fs::canonicalize(&args.project_dir).with_context(|| {
        t!("run.project_dir_not_found", locale = &locale, path = args.project_dir.display())
            .to_string()
    })?;

    if !quiet {
        println!(
            "{}",
            t!("run.loading_config", locale = &locale, path = args.config.display())
        );
        println!(
            "{}",
            t!("run.project_root", locale = &locale, path = project_root.display())
        );
        announce_plan(&plan, &args, &locale);
    }

    if plan.cells_to_run.is_empty() {
        if plan.is_distributed {
            if !quiet {
                println!("{}", t!("run.no_cells_for_runner", locale = &locale).green());
            }
            return Ok(());
        }
        return Err(ConfigError::EmptyMatrix.into());
    }

    let stop = setup_signal_handler(&locale);

    let settings = ExecutionSettings {
        project_root,
        isolation: config.settings.isolation,
        ignore: config.settings.ignore.clone(),
        step_timeout: args
            .timeout_secs
            .map(Duration::from_secs)
            .or(config.settings.step_timeout()),
        progress: !quiet,
    };
    let jobs = args
        .jobs
        .or(config.settings.jobs)
        .unwrap_or(num_cpus::get() / 2 + 1);

    if !quiet {
        println!(
            "{}",
            t!("run.starting", locale = &locale, count = plan.cells_to_run.len(), jobs = jobs)
                .bold()
        );
    }

    let orchestrator = Orchestrator::new(
        Arc::new(ProcessRunner),
        config.catalogue(),
        settings,
        jobs,
    );
    let report = orchestrator.run_all(plan.cells_to_run, stop).await?;

    if !quiet {
        print_summary(&report, &locale);
    }

    if let Some(path) = &args.html {
        if !quiet {
            println!(
                "\n{}",
                t!("run.writing_html", locale = &locale, path = path.display())
            );
        }
        if let Err(e) = generate_html_report(&report, path, &locale) {
            eprintln!("{} {:#}", t!("run.html_failed", locale = &locale).red(), e);
        }
    }

    if let Some(path) = &args.json {
        write_json_report(&report, path)?;
    }

    if report.passed() {
        if !quiet {
            println!("\n{}", t!("run.all_passed", locale = &locale).green().bold());
        }
        Ok(())
    } else {
        if !quiet {
            print_failure_details(&report, &locale, config.settings.output_tail_lines);
        }
        anyhow::bail!(
            t!(
                "run.cells_failed",
                locale = &locale,
                failed = report.failed_count(),
                total = report.cells.len()
            )
            .to_string()
        )
    }
}

fn announce_plan(plan: &ExecutionPlan, args: &RunArgs, locale: &str) {
    println!(
        "{}",
        t!("run.matrix_size", locale = locale, count = plan.total_cells).cyan()
    );
    if plan.deselected_count > 0 {
        println!(
            "{}",
            t!("run.deselected", locale = locale, count = plan.deselected_count).cyan()
        );
    }
    if let (Some(total), Some(index)) = (args.total_runners, args.runner_index) {
        println!(
            "{}",
            t!(
                "run.split_runner",
                locale = locale,
                index = index + 1,
                total = total,
                count = plan.cells_to_run.len()
            )
            .bold()
        );
    } else {
        println!("{}", t!("run.single_runner", locale = locale).bold());
    }
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("run.shutdown_signal", locale = &locale).yellow());
            token_clone.cancel();
        }
    });

    token
}
