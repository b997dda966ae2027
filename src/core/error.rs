//! # Error Taxonomy Module / 错误分类模块
//!
//! Configuration errors are fatal and surface before any cell runs. Step failures and
//! infrastructure failures never appear here: they are contained per cell and recorded
//! in the report (see `core::models`).
//!
//! 配置错误是致命的，会在任何单元运行之前报告。步骤失败和基础设施失败不会出现在这里：
//! 它们被限制在各自的单元内，并记录在报告中（参见 `core::models`）。

use thiserror::Error;

/// Malformed or inconsistent configuration. Aborts the whole run.
/// 格式错误或不一致的配置。会中止整个运行。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("no axes declared")]
    NoAxes,

    #[error("axis '{0}' is declared more than once")]
    DuplicateAxis(String),

    #[error("axis '{0}' has no values")]
    EmptyAxis(String),

    #[error("unknown axis '{axis}' referenced by {context}")]
    UnknownAxis { axis: String, context: String },

    #[error("value '{value}' is not declared on axis '{axis}' ({context})")]
    UnknownValue {
        axis: String,
        value: String,
        context: String,
    },

    #[error("exclusion rule #{0} is empty and would exclude every cell")]
    EmptyExclusion(usize),

    #[error("step '{step}' appears more than once for cell [{cell}]")]
    DuplicateStep { step: String, cell: String },

    #[error("step '{step}' has an invalid command: {reason}")]
    InvalidCommand { step: String, reason: String },

    #[error("the matrix is empty: every cell was excluded or filtered out")]
    EmptyMatrix,

    #[error("invalid selector '{0}', expected axis=value")]
    InvalidSelector(String),

    #[error("invalid sharding: {0}")]
    InvalidShard(String),
}

/// Failure of the orchestrated run as a whole.
/// 整体编排运行的失败。
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Some cells never produced a result (interrupted or never dispatched).
    /// 某些单元从未产生结果（被中断或从未调度）。
    #[error("run incomplete: {} cell(s) without a result: {}", .missing.len(), .missing.join("; "))]
    Incomplete { missing: Vec<String> },
}
