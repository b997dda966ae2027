//! # Orchestrator Module / 编排模块
//!
//! Fans the matrix out to cell executors under a bounded concurrency limit and gathers exactly
//! one result per cell. Cells complete in any order; the report lists them in matrix order.
//! A failing cell never cancels its siblings. Only an operator interrupt (the stop token) does,
//! and an interrupted run is an error rather than a short report.
//!
//! 在有界并发限制下将矩阵分派给单元执行器，并为每个单元收集恰好一个结果。
//! 单元可以任意顺序完成；报告按矩阵顺序列出它们。失败的单元永远不会取消其兄弟单元。
//! 只有操作员中断（停止令牌）才会取消，且被中断的运行是一个错误，而不是一个缩短的报告。

use chrono::Utc;
use futures::{StreamExt, stream};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::config::Catalogue;
use crate::core::error::{ConfigError, RunError};
use crate::core::executor::{CellExecutor, ExecutionSettings};
use crate::core::models::{Cell, CellResult, Report};
use crate::infra::command::CommandRunner;

pub struct Orchestrator<R> {
    executor: CellExecutor<R>,
    jobs: usize,
}

impl<R: CommandRunner> Orchestrator<R> {
    /// # Arguments
    /// * `runner` - The command-execution collaborator shared by all cells / 所有单元共享的命令执行协作者
    /// * `catalogue` - Setup and step catalogues / setup 目录和步骤目录
    /// * `settings` - Per-cell execution settings / 单元执行设置
    /// * `jobs` - Maximum number of cells in flight; values below 1 are treated as 1 / 最大并发单元数
    pub fn new(
        runner: Arc<R>,
        catalogue: Catalogue,
        settings: ExecutionSettings,
        jobs: usize,
    ) -> Self {
        Self {
            executor: CellExecutor::new(runner, catalogue, settings),
            jobs: jobs.max(1),
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Runs every cell and aggregates the results.
    ///
    /// # Errors
    /// * `ConfigError::EmptyMatrix` if `matrix` is empty; nothing runs.
    /// * `RunError::Incomplete` if `stop` fired before every cell produced a result.
    ///
    /// 运行所有单元并汇总结果。
    pub async fn run_all(
        &self,
        matrix: Vec<Cell>,
        stop: CancellationToken,
    ) -> Result<Report, RunError> {
        if matrix.is_empty() {
            return Err(ConfigError::EmptyMatrix.into());
        }

        let started_at = Utc::now();
        let start = Instant::now();

        let tasks = matrix.iter().cloned().enumerate().map(|(index, cell)| {
            let executor = self.executor.clone();
            let stop = stop.clone();
            async move {
                if stop.is_cancelled() {
                    return (index, None);
                }
                let cell_start = Instant::now();
                let task_executor = executor.clone();
                let task_cell = cell.clone();
                let mut handle =
                    tokio::spawn(async move { task_executor.execute(task_cell).await });

                tokio::select! {
                    biased;
                    _ = stop.cancelled() => {
                        handle.abort();
                        (index, None)
                    }
                    joined = &mut handle => match joined {
                        Ok(result) => (index, Some(result)),
                        Err(e) if e.is_panic() => (
                            index,
                            Some(executor.infrastructure_failure(
                                cell,
                                Vec::new(),
                                format!("cell task panicked: {e}"),
                                cell_start.elapsed(),
                            )),
                        ),
                        Err(_) => (index, None),
                    }
                }
            }
        });

        let finished: Vec<(usize, Option<CellResult>)> = stream::iter(tasks)
            .buffer_unordered(self.jobs)
            .collect()
            .await;

        let mut slots: Vec<Option<CellResult>> = vec![None; matrix.len()];
        for (index, result) in finished {
            slots[index] = result;
        }

        let missing: Vec<String> = matrix
            .iter()
            .zip(&slots)
            .filter(|(_, slot)| slot.is_none())
            .map(|(cell, _)| cell.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RunError::Incomplete { missing });
        }

        Ok(Report {
            cells: slots.into_iter().flatten().collect(),
            started_at,
            duration: start.elapsed(),
        })
    }
}
