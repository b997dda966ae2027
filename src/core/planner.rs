//! # Execution Planner Module / 执行计划模块
//!
//! Narrows the generated matrix down to the cells this invocation should run: an optional
//! `--only axis=value` selection, then an optional split across several CI runners.
//!
//! 将生成的矩阵缩小到本次调用应运行的单元：可选的 `--only axis=value` 选择，
//! 然后是可选的在多个 CI 运行器之间的拆分。

use crate::core::error::ConfigError;
use crate::core::models::{Axis, Cell};
use std::collections::BTreeMap;

/// Cells admitted by `--only` selectors. Selectors on the same axis are alternatives; selectors
/// on different axes must all hold.
///
/// 被 `--only` 选择器接受的单元。同一轴上的选择器互为备选；不同轴上的选择器必须同时满足。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    by_axis: BTreeMap<String, Vec<String>>,
}

impl Selection {
    /// Parses `axis=value` selectors.
    pub fn parse<S: AsRef<str>>(selectors: &[S]) -> Result<Self, ConfigError> {
        let mut by_axis: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for selector in selectors {
            let selector = selector.as_ref();
            let (axis, value) = selector
                .split_once('=')
                .map(|(a, v)| (a.trim(), v.trim()))
                .filter(|(a, v)| !a.is_empty() && !v.is_empty())
                .ok_or_else(|| ConfigError::InvalidSelector(selector.to_string()))?;
            by_axis
                .entry(axis.to_string())
                .or_default()
                .push(value.to_string());
        }
        Ok(Self { by_axis })
    }

    pub fn is_empty(&self) -> bool {
        self.by_axis.is_empty()
    }

    /// Every selector must name a declared axis and one of its declared values.
    pub fn validate(&self, axes: &[Axis]) -> Result<(), ConfigError> {
        for (axis_name, values) in &self.by_axis {
            let axis = axes
                .iter()
                .find(|a| a.name() == axis_name)
                .ok_or_else(|| ConfigError::UnknownAxis {
                    axis: axis_name.clone(),
                    context: "--only".to_string(),
                })?;
            if let Some(value) = values.iter().find(|v| !axis.contains(v)) {
                return Err(ConfigError::UnknownValue {
                    axis: axis_name.clone(),
                    value: value.clone(),
                    context: "--only".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn admits(&self, cell: &Cell) -> bool {
        self.by_axis.iter().all(|(axis, values)| {
            cell.value(axis)
                .is_some_and(|v| values.iter().any(|candidate| candidate == v))
        })
    }
}

/// Represents the cells one runner will execute.
/// 表示一个运行器将执行的单元。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// Cells to run, in matrix order.
    /// 要运行的单元，按矩阵顺序排列。
    pub cells_to_run: Vec<Cell>,
    /// Size of the generated matrix before selection and sharding.
    pub total_cells: usize,
    /// Cells dropped by `--only`.
    pub deselected_count: usize,
    /// Whether the matrix is split across several runners.
    /// 矩阵是否在多个运行器之间拆分。
    pub is_distributed: bool,
}

/// Creates an execution plan for the given matrix.
///
/// # Arguments
/// * `cells` - The generated matrix, in order
/// * `selection` - `--only` selectors, already validated against the axes
/// * `total_runners` - Optional total number of runners for distributed execution
/// * `runner_index` - Optional index of this runner (0-based)
///
/// # Returns
/// An `ExecutionPlan`; cell `i` of the selected list goes to runner `i % total_runners`.
pub fn plan_execution(
    cells: Vec<Cell>,
    selection: &Selection,
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<ExecutionPlan, ConfigError> {
    let total_cells = cells.len();
    let selected: Vec<Cell> = cells.into_iter().filter(|c| selection.admits(c)).collect();
    let deselected_count = total_cells - selected.len();

    let (cells_to_run, is_distributed) = match (total_runners, runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 {
                return Err(ConfigError::InvalidShard(
                    "--total-runners must be at least 1".to_string(),
                ));
            }
            if index >= total {
                return Err(ConfigError::InvalidShard(
                    "--runner-index must be less than --total-runners".to_string(),
                ));
            }
            let shard = selected
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % total == index)
                .map(|(_, cell)| cell)
                .collect();
            (shard, true)
        }
        (None, None) => (selected, false),
        _ => {
            return Err(ConfigError::InvalidShard(
                "both --total-runners and --runner-index must be provided".to_string(),
            ));
        }
    };

    Ok(ExecutionPlan {
        cells_to_run,
        total_cells,
        deselected_count,
        is_distributed,
    })
}
