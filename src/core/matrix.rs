//! # Matrix Generator Module / 矩阵生成模块
//!
//! Expands axes into the cartesian product of cells, then drops every cell matched by an
//! exclusion rule. The product is lexicographic in axis declaration order: the first axis
//! varies slowest.
//!
//! 将轴展开为单元的笛卡尔积，然后丢弃所有被排除规则匹配的单元。
//! 乘积按轴声明顺序的字典序排列：第一个轴变化最慢。

use crate::core::error::ConfigError;
use crate::core::models::{Assignment, Axis, Cell, ExclusionRule};

/// Generates the ordered list of cells for the given axes and exclusion rules.
///
/// An axis with zero values yields an empty matrix. An exclusion rule naming an axis that is not
/// declared is a `ConfigError::UnknownAxis`. Rules naming a declared axis with an undeclared value
/// simply never match.
///
/// 为给定的轴和排除规则生成有序的单元列表。
///
/// # Arguments
/// * `axes` - Axes in declaration order / 按声明顺序排列的轴
/// * `exclusions` - Exclusion rules; a cell is dropped if any rule matches / 排除规则；任一规则匹配即丢弃该单元
///
/// # Returns
/// The surviving cells in cartesian-product order / 按笛卡尔积顺序保留下来的单元
pub fn generate(axes: &[Axis], exclusions: &[ExclusionRule]) -> Result<Vec<Cell>, ConfigError> {
    for (i, rule) in exclusions.iter().enumerate() {
        for (axis, _) in rule.pairs() {
            if !axes.iter().any(|a| a.name() == axis) {
                return Err(ConfigError::UnknownAxis {
                    axis: axis.to_string(),
                    context: format!("exclusion rule #{}", i + 1),
                });
            }
        }
    }

    if axes.is_empty() {
        return Ok(Vec::new());
    }

    let mut partial: Vec<Vec<Assignment>> = vec![Vec::new()];
    for axis in axes {
        let mut next = Vec::with_capacity(partial.len() * axis.values().len());
        for prefix in &partial {
            for value in axis.values() {
                let mut assignments = prefix.clone();
                assignments.push(Assignment {
                    axis: axis.name().to_string(),
                    value: value.clone(),
                });
                next.push(assignments);
            }
        }
        partial = next;
    }

    Ok(partial
        .into_iter()
        .map(Cell::from_assignments)
        .filter(|cell| !exclusions.iter().any(|rule| rule.matches(cell)))
        .collect())
}
