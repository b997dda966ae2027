//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the job matrix:
//! axes, cells, exclusion patterns, steps, and the per-step / per-cell / per-run results.
//!
//! 此模块定义了整个作业矩阵中使用的核心数据结构：
//! 轴、单元、排除模式、步骤，以及步骤级/单元级/运行级的结果。

use crate::core::guard::Guard;
use crate::infra::t;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A named matrix dimension with an ordered set of distinct values.
/// 一个具名的矩阵维度，包含一组有序且互不相同的值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AxisDecl", into = "AxisDecl")]
pub struct Axis {
    name: String,
    values: Vec<String>,
}

/// Serialized shape of an axis. Kept separate so deserialization goes through `Axis::new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AxisDecl {
    name: String,
    values: Vec<String>,
}

impl From<AxisDecl> for Axis {
    fn from(decl: AxisDecl) -> Self {
        Axis::new(decl.name, decl.values)
    }
}

impl From<Axis> for AxisDecl {
    fn from(axis: Axis) -> Self {
        AxisDecl {
            name: axis.name,
            values: axis.values,
        }
    }
}

impl Axis {
    /// Creates an axis. Duplicate values are dropped, keeping the first occurrence.
    /// 创建一个轴。重复的值会被丢弃，保留第一次出现的值。
    pub fn new<N, I, V>(name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut distinct: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
        Self {
            name: name.into(),
            values: distinct,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// One axis/value pair of a cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Assignment {
    pub axis: String,
    pub value: String,
}

/// One complete assignment of a value to every axis, in axis declaration order.
/// Cells are only produced by the matrix generator.
///
/// 为每个轴分配一个值的完整组合，按轴声明顺序排列。
/// 单元只能由矩阵生成器产生。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    assignments: Vec<Assignment>,
}

impl Cell {
    pub(crate) fn from_assignments(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Returns the value this cell assigns to `axis`, if the axis exists.
    /// 返回此单元为 `axis` 分配的值（如果该轴存在）。
    pub fn value(&self, axis: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.axis == axis)
            .map(|a| a.value.as_str())
    }

    /// A filesystem-safe identifier, used for temp directory prefixes.
    /// 文件系统安全的标识符，用于临时目录前缀。
    pub fn slug(&self) -> String {
        self.assignments
            .iter()
            .map(|a| a.value.as_str())
            .collect::<Vec<_>>()
            .join("-")
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, a) in self.assignments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", a.axis, a.value)?;
        }
        Ok(())
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.assignments.len()))?;
        for a in &self.assignments {
            map.serialize_entry(&a.axis, &a.value)?;
        }
        map.end()
    }
}

/// A partial assignment of axis values.
/// A pattern matches a cell iff every pair equals the cell's assignment for that axis.
///
/// 轴值的部分分配。
/// 当且仅当每一对都等于单元对该轴的分配时，模式才匹配该单元。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellPattern(BTreeMap<String, String>);

/// Exclusion rules are plain cell patterns: a full match removes the cell from the matrix.
pub type ExclusionRule = CellPattern;

impl CellPattern {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn matches(&self, cell: &Cell) -> bool {
        self.0
            .iter()
            .all(|(axis, value)| cell.value(axis) == Some(value.as_str()))
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One ordered, optionally guarded unit of work. Used for both the setup catalogue and the
/// step catalogue.
///
/// 一个有序的、可选带条件守卫的工作单元。同时用于 setup 目录和步骤目录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Human-readable name, unique among the steps that apply to any one cell.
    /// 人类可读的名称，在适用于任一单元的步骤中唯一。
    pub name: String,
    /// Command template. `${{ matrix.<axis> }}` placeholders are substituted per cell.
    /// 命令模板。`${{ matrix.<axis> }}` 占位符会按单元替换。
    pub run: String,
    /// Run only when this predicate holds for the cell.
    /// 仅当此谓词对单元成立时运行。
    #[serde(default, rename = "when", skip_serializing_if = "Option::is_none")]
    pub guard: Option<Guard>,
    /// Overrides the default per-step timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Run through the platform shell (`sh -c` / `cmd /C`) instead of splitting the command.
    #[serde(default)]
    pub shell: bool,
    /// Directories prepended to `PATH`. For setup steps they persist for the rest of the cell.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    /// Extra environment variables. For setup steps they persist for the rest of the cell.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl Step {
    pub fn new(name: impl Into<String>, run: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run: run.into(),
            guard: None,
            timeout_secs: None,
            shell: false,
            path: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn when(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn in_shell(mut self) -> Self {
        self.shell = true;
        self
    }

    /// Whether this step applies to the cell. Steps without a guard always apply.
    pub fn applies_to(&self, cell: &Cell) -> bool {
        self.guard.as_ref().is_none_or(|g| g.matches(cell))
    }

    /// Effective timeout: the step's own, else the given default.
    pub fn timeout(&self, default: Option<Duration>) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs).or(default)
    }
}

/// Outcome of one step.
/// 单个步骤的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    Skipped,
}

/// Why a step did not run.
/// 步骤未运行的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The step's guard evaluated to false for this cell.
    GuardFalse,
    /// An earlier step in the same cell failed.
    EarlierFailure,
    /// Provisioning the cell failed before any step could run.
    SetupFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub name: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
    /// `None` when the step was skipped, timed out, or could not be spawned.
    pub exit_code: Option<i32>,
    /// Combined stdout/stderr of this step only.
    pub output: String,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub timed_out: bool,
}

impl StepResult {
    pub fn skipped(name: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Skipped,
            skip_reason: Some(reason),
            exit_code: None,
            output: String::new(),
            duration: Duration::ZERO,
            timed_out: false,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == StepStatus::Failed
    }

    /// Localized status label for display.
    /// 用于显示的本地化状态标签。
    pub fn status_str(&self, locale: &str) -> String {
        match (self.status, self.timed_out) {
            (StepStatus::Passed, _) => t!("status.passed", locale = locale).to_string(),
            (StepStatus::Failed, true) => t!("status.timeout", locale = locale).to_string(),
            (StepStatus::Failed, false) => t!("status.failed", locale = locale).to_string(),
            (StepStatus::Skipped, _) => t!("status.skipped", locale = locale).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    Passed,
    Failed,
}

/// The ordered step results of one cell, plus the provisioning outcome.
/// 一个单元的有序步骤结果，以及环境准备的结果。
#[derive(Debug, Clone, Serialize)]
pub struct CellResult {
    pub cell: Cell,
    /// Results of the setup catalogue, in order.
    pub setup: Vec<StepResult>,
    /// Results of the step catalogue, in order. Always one entry per catalogue step.
    pub steps: Vec<StepResult>,
    /// Set when provisioning failed; all steps are then skipped.
    /// 当环境准备失败时设置；此时所有步骤都会被跳过。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infrastructure_error: Option<String>,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl CellResult {
    pub fn status(&self) -> CellStatus {
        if self.infrastructure_error.is_some() || self.steps.iter().any(StepResult::is_failure) {
            CellStatus::Failed
        } else {
            CellStatus::Passed
        }
    }

    pub fn passed(&self) -> bool {
        self.status() == CellStatus::Passed
    }

    /// The first failing entry: a failed setup command first, otherwise the first failed step.
    /// 第一个失败的条目：优先是失败的 setup 命令，否则是第一个失败的步骤。
    pub fn first_failure(&self) -> Option<&StepResult> {
        self.setup
            .iter()
            .chain(self.steps.iter())
            .find(|s| s.is_failure())
    }

    pub fn status_str(&self, locale: &str) -> String {
        match self.status() {
            CellStatus::Passed => t!("status.passed", locale = locale).to_string(),
            CellStatus::Failed if self.infrastructure_error.is_some() => {
                t!("status.setup_failed", locale = locale).to_string()
            }
            CellStatus::Failed => t!("status.failed", locale = locale).to_string(),
        }
    }
}

/// The aggregate outcome of a run: exactly one result per matrix cell, in matrix order.
/// 运行的汇总结果：每个矩阵单元恰好一个结果，按矩阵顺序排列。
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub cells: Vec<CellResult>,
    pub started_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl Report {
    pub fn status(&self) -> CellStatus {
        if self.cells.iter().all(CellResult::passed) {
            CellStatus::Passed
        } else {
            CellStatus::Failed
        }
    }

    pub fn passed(&self) -> bool {
        self.status() == CellStatus::Passed
    }

    pub fn get(&self, cell: &Cell) -> Option<&CellResult> {
        self.cells.iter().find(|r| &r.cell == cell)
    }

    pub fn failed_cells(&self) -> impl Iterator<Item = &CellResult> {
        self.cells.iter().filter(|r| !r.passed())
    }

    pub fn passed_count(&self) -> usize {
        self.cells.iter().filter(|r| r.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.cells.len() - self.passed_count()
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
