//! # Cell Executor Module / 单元执行器模块
//!
//! Runs one cell in isolation. The executor provisions a private [`CellContext`] (working
//! directory, matrix environment, `PATH` additions), runs the setup catalogue, hands the full
//! step catalogue to the [`StepSequencer`], and wraps the outcome with the cell identity.
//! The context owns the cell's temp directory, so it is released on every exit path.
//!
//! 隔离地运行单个单元。执行器准备一个私有的 [`CellContext`]（工作目录、矩阵环境变量、`PATH` 追加项），
//! 运行 setup 目录，将完整的步骤目录交给 [`StepSequencer`]，并用单元标识包装结果。
//! 上下文拥有单元的临时目录，因此在每条退出路径上都会被释放。

use anyhow::anyhow;
use colored::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::config::{Catalogue, Isolation};
use crate::core::models::{Cell, CellResult, SkipReason, Step, StepResult};
use crate::core::sequencer::StepSequencer;
use crate::core::template;
use crate::infra::command::{CommandRunner, Invocation};
use crate::infra::fs::{CellWorkspace, create_cell_workspace};
use crate::infra::t;

/// Environment variable pointing at the cell's private scratch directory.
pub const TEMP_DIR_VAR: &str = "JOBMATRIX_TEMP";
/// Environment variable holding the cell's display identity.
pub const CELL_VAR: &str = "JOBMATRIX_CELL";

/// Name of the environment variable carrying an axis value: `MATRIX_` + upper-cased axis name,
/// with every non-alphanumeric character replaced by `_`.
///
/// 携带轴值的环境变量名：`MATRIX_` + 大写的轴名，所有非字母数字字符替换为 `_`。
pub fn matrix_var(axis: &str) -> String {
    let suffix: String = axis
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("MATRIX_{suffix}")
}

/// The explicit, cell-scoped execution environment passed to every invocation.
/// Nothing here ever touches the runner's own process environment.
///
/// 传递给每次调用的显式单元级执行环境。这里的任何内容都不会修改运行器自身的进程环境。
#[derive(Debug)]
pub struct CellContext {
    cell: Cell,
    workspace: CellWorkspace,
    env: BTreeMap<String, String>,
    path_prepend: Vec<PathBuf>,
}

impl CellContext {
    pub fn new(cell: Cell, workspace: CellWorkspace) -> Self {
        let mut env: BTreeMap<String, String> = cell
            .assignments()
            .iter()
            .map(|a| (matrix_var(&a.axis), a.value.clone()))
            .collect();
        env.insert(
            TEMP_DIR_VAR.to_string(),
            workspace.temp_path().display().to_string(),
        );
        env.insert(CELL_VAR.to_string(), cell.to_string());
        Self {
            cell,
            workspace,
            env,
            path_prepend: Vec::new(),
        }
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn workspace(&self) -> &CellWorkspace {
        &self.workspace
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn path_prepend(&self) -> &[PathBuf] {
        &self.path_prepend
    }

    /// Builds the invocation for `step`: the rendered command plus this context's environment
    /// with the step's own variables and `PATH` entries layered on top.
    ///
    /// 为 `step` 构建调用：渲染后的命令，加上本上下文的环境，并叠加步骤自身的变量和 `PATH` 条目。
    pub fn invocation(&self, step: &Step, default_timeout: Option<Duration>) -> Invocation {
        let mut env = self.env.clone();
        for (key, value) in &step.env {
            env.insert(key.clone(), template::render(value, &self.cell));
        }
        let path_prepend = step
            .path
            .iter()
            .map(|p| PathBuf::from(template::render(p, &self.cell)))
            .chain(self.path_prepend.iter().cloned())
            .collect();

        Invocation {
            step: step.name.clone(),
            command: template::render(&step.run, &self.cell),
            shell: step.shell,
            timeout: step.timeout(default_timeout),
            env,
            path_prepend,
            working_dir: self.workspace.workdir().to_path_buf(),
        }
    }

    /// Keeps a successful setup step's environment and `PATH` contributions for the rest of
    /// the cell. Later additions take precedence over earlier ones.
    ///
    /// 为单元的剩余部分保留成功的 setup 步骤所贡献的环境变量和 `PATH` 条目。后添加的优先。
    pub fn absorb(&mut self, step: &Step) {
        for (key, value) in &step.env {
            self.env
                .insert(key.clone(), template::render(value, &self.cell));
        }
        let mut added: Vec<PathBuf> = step
            .path
            .iter()
            .map(|p| PathBuf::from(template::render(p, &self.cell)))
            .collect();
        added.append(&mut self.path_prepend);
        self.path_prepend = added;
    }
}

/// Settings shared by every cell of a run.
/// 一次运行中所有单元共享的设置。
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    pub project_root: PathBuf,
    pub isolation: Isolation,
    pub ignore: Vec<String>,
    pub step_timeout: Option<Duration>,
    /// Print a line per cell and step event.
    pub progress: bool,
}

impl ExecutionSettings {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            isolation: Isolation::default(),
            ignore: Vec::new(),
            step_timeout: None,
            progress: false,
        }
    }
}

/// Executes single cells. Cheap to clone: all state is shared read-only.
/// 执行单个单元。克隆开销很小：所有状态都以只读方式共享。
pub struct CellExecutor<R> {
    runner: Arc<R>,
    catalogue: Arc<Catalogue>,
    settings: Arc<ExecutionSettings>,
}

impl<R> Clone for CellExecutor<R> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            catalogue: Arc::clone(&self.catalogue),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<R: CommandRunner> CellExecutor<R> {
    pub fn new(runner: Arc<R>, catalogue: Catalogue, settings: ExecutionSettings) -> Self {
        Self {
            runner,
            catalogue: Arc::new(catalogue),
            settings: Arc::new(settings),
        }
    }

    /// Runs one cell to completion. Never fails: provisioning problems become an
    /// infrastructure error on the returned result.
    ///
    /// 将一个单元运行至完成。永远不会失败：环境准备问题会成为返回结果中的基础设施错误。
    pub async fn execute(&self, cell: Cell) -> CellResult {
        let start = Instant::now();
        if self.settings.progress {
            println!("{}", t!("run.cell_started", cell = &cell).cyan());
        }

        let workspace = match self.provision_workspace(&cell).await {
            Ok(workspace) => workspace,
            Err(e) => {
                return self.finish(self.infrastructure_failure(
                    cell,
                    Vec::new(),
                    format!("{e:#}"),
                    start.elapsed(),
                ));
            }
        };

        let mut ctx = CellContext::new(cell, workspace);
        let sequencer = StepSequencer::new(self.runner.as_ref(), self.settings.step_timeout)
            .with_progress(self.settings.progress);

        let (setup, setup_error) = self.run_setup(&sequencer, &mut ctx).await;
        if let Some(error) = setup_error {
            let cell = ctx.cell().clone();
            drop(ctx);
            return self.finish(self.infrastructure_failure(cell, setup, error, start.elapsed()));
        }

        let steps = sequencer.run(&ctx, &self.catalogue.steps).await;
        let cell = ctx.cell().clone();
        drop(ctx);

        self.finish(CellResult {
            cell,
            setup,
            steps,
            infrastructure_error: None,
            duration: start.elapsed(),
        })
    }

    /// A result for a cell whose environment could not be provisioned: failed, with every step
    /// skipped.
    ///
    /// 无法准备环境的单元的结果：失败，所有步骤均被跳过。
    pub fn infrastructure_failure(
        &self,
        cell: Cell,
        setup: Vec<StepResult>,
        error: String,
        duration: Duration,
    ) -> CellResult {
        let steps = self
            .catalogue
            .steps
            .iter()
            .map(|s| StepResult::skipped(&s.name, SkipReason::SetupFailed))
            .collect();
        CellResult {
            cell,
            setup,
            steps,
            infrastructure_error: Some(error),
            duration,
        }
    }

    async fn provision_workspace(&self, cell: &Cell) -> anyhow::Result<CellWorkspace> {
        let settings = Arc::clone(&self.settings);
        let slug = cell.slug();
        tokio::task::spawn_blocking(move || {
            create_cell_workspace(
                &settings.project_root,
                &slug,
                settings.isolation,
                &settings.ignore,
            )
        })
        .await
        .map_err(|e| anyhow!("workspace provisioning task failed: {e}"))?
    }

    /// Runs the setup catalogue. Returns the setup results and, if a setup command failed,
    /// the infrastructure error describing it.
    async fn run_setup(
        &self,
        sequencer: &StepSequencer<'_, R>,
        ctx: &mut CellContext,
    ) -> (Vec<StepResult>, Option<String>) {
        let mut results = Vec::with_capacity(self.catalogue.setup.len());
        let mut error = None;

        for step in &self.catalogue.setup {
            if error.is_some() {
                results.push(StepResult::skipped(&step.name, SkipReason::EarlierFailure));
                continue;
            }
            if !step.applies_to(ctx.cell()) {
                results.push(StepResult::skipped(&step.name, SkipReason::GuardFalse));
                continue;
            }
            let result = sequencer.run_step(ctx, step).await;
            if result.is_failure() {
                let message = t!(
                    "run.setup_failed",
                    step = &step.name,
                    code = result
                        .exit_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "-".to_string())
                )
                .to_string();
                if self.settings.progress {
                    println!("{}", format!("[{}] {message}", ctx.cell()).red());
                }
                error = Some(message);
            } else {
                ctx.absorb(step);
            }
            results.push(result);
        }

        (results, error)
    }

    fn finish(&self, result: CellResult) -> CellResult {
        if self.settings.progress {
            let duration = format!("{:.2}", result.duration.as_secs_f64());
            let line = if result.passed() {
                t!("run.cell_passed", cell = &result.cell, duration = duration).green()
            } else {
                t!("run.cell_failed", cell = &result.cell, duration = duration).red()
            };
            println!("{}", line.bold());
        }
        result
    }
}
