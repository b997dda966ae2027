//! # Step Guards / 步骤守卫
//!
//! A closed set of typed predicates over a cell's axis values. Guards are checked against the
//! declared axes when the configuration is loaded, so a misspelled axis or value is a
//! configuration error instead of a step that silently never runs.
//!
//! 基于单元轴值的封闭类型化谓词集合。加载配置时会根据已声明的轴检查守卫，
//! 因此拼写错误的轴或值会成为配置错误，而不是一个永远静默跳过的步骤。
//!
//! In TOML:
//!
//! ```toml
//! when = { axis = "os", equals = "ubuntu-latest" }
//! when = { axis = "os", in = ["macos-latest", "windows-latest"] }
//! when = { all = [{ axis = "os", equals = "ubuntu-latest" }, { not = { axis = "python", equals = "pypy-3.8" } }] }
//! ```

use crate::core::error::ConfigError;
use crate::core::models::{Axis, Cell};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum Guard {
    /// The cell's value on `axis` equals `equals`.
    Equals { axis: String, equals: String },
    /// The cell's value on `axis` is one of `one_of`.
    OneOf {
        axis: String,
        #[serde(rename = "in")]
        one_of: Vec<String>,
    },
    All { all: Vec<Guard> },
    Any { any: Vec<Guard> },
    Not { not: Box<Guard> },
}

impl Guard {
    pub fn equals(axis: impl Into<String>, value: impl Into<String>) -> Self {
        Guard::Equals {
            axis: axis.into(),
            equals: value.into(),
        }
    }

    pub fn one_of<I, V>(axis: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Guard::OneOf {
            axis: axis.into(),
            one_of: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn negate(self) -> Self {
        Guard::Not { not: Box::new(self) }
    }

    /// Evaluates the guard against a cell's assignment.
    /// 根据单元的分配评估守卫。
    pub fn matches(&self, cell: &Cell) -> bool {
        match self {
            Guard::Equals { axis, equals } => cell.value(axis) == Some(equals.as_str()),
            Guard::OneOf { axis, one_of } => cell
                .value(axis)
                .is_some_and(|v| one_of.iter().any(|candidate| candidate == v)),
            Guard::All { all } => all.iter().all(|g| g.matches(cell)),
            Guard::Any { any } => any.iter().any(|g| g.matches(cell)),
            Guard::Not { not } => !not.matches(cell),
        }
    }

    /// Checks that every axis and value the guard mentions is declared.
    /// `context` names the owning step in error messages.
    ///
    /// 检查守卫提到的每个轴和值都已声明。
    pub fn validate(&self, axes: &[Axis], context: &str) -> Result<(), ConfigError> {
        match self {
            Guard::Equals { axis, equals } => check_values(axes, axis, [equals], context),
            Guard::OneOf { axis, one_of } => check_values(axes, axis, one_of, context),
            Guard::All { all: guards } | Guard::Any { any: guards } => guards
                .iter()
                .try_for_each(|g| g.validate(axes, context)),
            Guard::Not { not } => not.validate(axes, context),
        }
    }
}

fn check_values<'a>(
    axes: &[Axis],
    axis_name: &str,
    values: impl IntoIterator<Item = &'a String>,
    context: &str,
) -> Result<(), ConfigError> {
    let axis = axes
        .iter()
        .find(|a| a.name() == axis_name)
        .ok_or_else(|| ConfigError::UnknownAxis {
            axis: axis_name.to_string(),
            context: context.to_string(),
        })?;
    for value in values {
        if !axis.contains(value) {
            return Err(ConfigError::UnknownValue {
                axis: axis_name.to_string(),
                value: value.clone(),
                context: context.to_string(),
            });
        }
    }
    Ok(())
}
