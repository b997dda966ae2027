//! # Step Sequencer Module / 步骤序列器模块
//!
//! Runs an ordered list of steps for one cell. Each step's guard is evaluated against the cell;
//! a false guard skips the step and the sequence continues. The first failing step (nonzero exit,
//! timeout, or a command that cannot be started) halts the sequence: every later step is recorded
//! as skipped and its command never runs.
//!
//! 为单个单元运行有序的步骤列表。每个步骤的守卫都会针对该单元求值；
//! 守卫为假时跳过该步骤并继续。第一个失败的步骤（非零退出、超时或无法启动的命令）会中止序列：
//! 之后的每个步骤都被记录为跳过，其命令永远不会运行。

use colored::*;
use std::time::{Duration, Instant};

use crate::core::executor::CellContext;
use crate::core::models::{SkipReason, Step, StepResult, StepStatus};
use crate::infra::command::CommandRunner;
use crate::infra::t;

pub struct StepSequencer<'a, R> {
    runner: &'a R,
    default_timeout: Option<Duration>,
    progress: bool,
}

impl<'a, R: CommandRunner> StepSequencer<'a, R> {
    pub fn new(runner: &'a R, default_timeout: Option<Duration>) -> Self {
        Self {
            runner,
            default_timeout,
            progress: false,
        }
    }

    /// Prints a line per step event when enabled.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Runs `steps` in order inside `ctx`, returning exactly one result per step.
    ///
    /// 在 `ctx` 中按顺序运行 `steps`，每个步骤恰好返回一个结果。
    pub async fn run(&self, ctx: &CellContext, steps: &[Step]) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(steps.len());
        let mut halted = false;

        for step in steps {
            if halted {
                results.push(StepResult::skipped(&step.name, SkipReason::EarlierFailure));
                continue;
            }
            if !step.applies_to(ctx.cell()) {
                if self.progress {
                    println!(
                        "{}",
                        t!("run.step_skipped_guard", cell = ctx.cell(), step = &step.name).dimmed()
                    );
                }
                results.push(StepResult::skipped(&step.name, SkipReason::GuardFalse));
                continue;
            }

            let result = self.run_step(ctx, step).await;
            halted = result.is_failure();
            results.push(result);
        }

        results
    }

    /// Executes one step unconditionally. The guard is the caller's concern.
    /// 无条件执行单个步骤。守卫由调用者负责。
    pub async fn run_step(&self, ctx: &CellContext, step: &Step) -> StepResult {
        let invocation = ctx.invocation(step, self.default_timeout);
        if self.progress {
            println!(
                "{}",
                t!("run.step_started", cell = ctx.cell(), step = &step.name).blue()
            );
        }

        let start = Instant::now();
        let result = match self.runner.run(&invocation).await {
            Ok(outcome) => StepResult {
                name: step.name.clone(),
                status: if outcome.success() {
                    StepStatus::Passed
                } else {
                    StepStatus::Failed
                },
                skip_reason: None,
                exit_code: outcome.exit_code,
                output: outcome.output,
                duration: outcome.duration,
                timed_out: outcome.timed_out,
            },
            Err(e) => StepResult {
                name: step.name.clone(),
                status: StepStatus::Failed,
                skip_reason: None,
                exit_code: None,
                output: t!("run.spawn_failed", command = &invocation.command, error = e).to_string(),
                duration: start.elapsed(),
                timed_out: false,
            },
        };

        if self.progress {
            self.print_outcome(ctx, &result, invocation.timeout);
        }
        result
    }

    fn print_outcome(&self, ctx: &CellContext, result: &StepResult, timeout: Option<Duration>) {
        let cell = ctx.cell();
        let duration = format!("{:.2}", result.duration.as_secs_f64());
        let line = match (result.status, result.timed_out) {
            (StepStatus::Passed, _) => {
                t!("run.step_passed", cell = cell, step = &result.name, duration = duration).green()
            }
            (_, true) => t!(
                "run.step_timeout",
                cell = cell,
                step = &result.name,
                timeout = timeout.map(|d| d.as_secs()).unwrap_or_default()
            )
            .red(),
            _ => t!(
                "run.step_failed",
                cell = cell,
                step = &result.name,
                code = result
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                duration = duration
            )
            .red(),
        };
        println!("{line}");
    }
}
