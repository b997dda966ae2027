//! # List Command Module / 列表命令模块
//!
//! Prints the generated matrix without running anything. Useful to check exclusions and
//! sharding, or to feed the cell list to another CI tool with `--json`.
//!
//! 打印生成的矩阵而不运行任何内容。可用于检查排除规则和分片，
//! 或通过 `--json` 将单元列表提供给其他 CI 工具。

use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use super::run::load_plan;
use crate::infra::t;
use crate::reporting::json::render_matrix_json;

/// Arguments of the `list` command.
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub config: PathBuf,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    pub only: Vec<String>,
    /// Also print which steps apply to each cell.
    pub steps: bool,
    pub json: bool,
}

pub fn execute(args: ListArgs, lang: Option<&str>) -> Result<()> {
    let (config, plan) = load_plan(
        &args.config,
        &args.only,
        args.total_runners,
        args.runner_index,
    )?;

    if args.json {
        println!("{}", render_matrix_json(&plan.cells_to_run)?);
        return Ok(());
    }

    let locale = crate::init(&[lang, config.language.as_deref()]);
    println!(
        "{}",
        t!(
            "list.header",
            locale = &locale,
            count = plan.cells_to_run.len(),
            total = plan.total_cells
        )
        .bold()
    );

    for (i, cell) in plan.cells_to_run.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, cell.to_string().cyan());
        if args.steps {
            for step in config.setup.iter().filter(|s| s.applies_to(cell)) {
                println!("         - {} {}", step.name, "(setup)".dimmed());
            }
            for step in &config.steps {
                if step.applies_to(cell) {
                    println!("         - {}", step.name);
                } else {
                    println!(
                        "         - {} {}",
                        step.name.dimmed(),
                        t!("list.guard_skip", locale = &locale).dimmed()
                    );
                }
            }
        }
    }
    Ok(())
}
