//! # Configuration Module / 配置模块
//!
//! Loads and validates the job matrix configuration (`JobMatrix.toml`): axis declarations,
//! exclusion rules, the setup catalogue, the step catalogue, and run settings.
//! Every inconsistency is reported as a `ConfigError` before anything executes.
//!
//! 加载并验证作业矩阵配置（`JobMatrix.toml`）：轴声明、排除规则、setup 目录、步骤目录和运行设置。
//! 任何不一致都会在执行之前以 `ConfigError` 报告。

use crate::core::error::ConfigError;
use crate::core::matrix;
use crate::core::models::{Axis, Cell, ExclusionRule, Step};
use crate::core::template;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How each cell's working directory is provisioned.
/// 每个单元工作目录的准备方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Isolation {
    /// The project is copied into the cell's private temp directory.
    /// 项目被复制到单元私有的临时目录中。
    #[default]
    Copy,
    /// Commands run in the project directory itself; only the temp directory is private.
    /// 命令直接在项目目录中运行；只有临时目录是私有的。
    Shared,
}

/// Global run settings. All fields are optional in the file.
/// 全局运行设置。文件中的所有字段都是可选的。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Maximum number of cells running at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    /// Default per-step timeout in seconds. Absent means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_timeout_secs: Option<u64>,
    #[serde(default)]
    pub isolation: Isolation,
    /// Top-level project entries that are not copied under `Isolation::Copy`.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    /// Lines of a failing step's output shown in the console summary.
    #[serde(default = "default_output_tail_lines")]
    pub output_tail_lines: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            jobs: None,
            step_timeout_secs: None,
            isolation: Isolation::default(),
            ignore: default_ignore(),
            output_tail_lines: default_output_tail_lines(),
        }
    }
}

impl Settings {
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_secs.map(Duration::from_secs)
    }
}

fn default_ignore() -> Vec<String> {
    vec!["target".to_string(), ".git".to_string()]
}

fn default_output_tail_lines() -> usize {
    40
}

/// The setup and step catalogues shared read-only by every cell.
/// 所有单元以只读方式共享的 setup 目录和步骤目录。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    pub setup: Vec<Step>,
    pub steps: Vec<Step>,
}

/// Represents the entire job matrix configuration, loaded from a TOML file.
/// 代表从 TOML 文件加载的整个作业矩阵配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// Overridden by `--lang`; absent means the system locale.
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default)]
    pub settings: Settings,

    /// Axes in declaration order. The order determines cell order.
    /// 按声明顺序排列的轴。该顺序决定单元的顺序。
    pub axes: Vec<Axis>,

    #[serde(default, rename = "exclude", skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<ExclusionRule>,

    /// Provisioning commands, run before the steps. A failure here is an infrastructure error.
    /// 环境准备命令，在步骤之前运行。此处的失败属于基础设施错误。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub setup: Vec<Step>,

    pub steps: Vec<Step>,
}

impl MatrixConfig {
    /// Reads, parses and validates a configuration file.
    /// 读取、解析并验证配置文件。
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: MatrixConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn catalogue(&self) -> Catalogue {
        Catalogue {
            setup: self.setup.clone(),
            steps: self.steps.clone(),
        }
    }

    /// Expands the configured axes and exclusions into cells.
    /// 将配置的轴和排除规则展开为单元。
    pub fn generate_matrix(&self) -> Result<Vec<Cell>, ConfigError> {
        matrix::generate(&self.axes, &self.exclusions)
    }

    /// Checks the configuration for internal consistency.
    /// 检查配置的内部一致性。
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_axes()?;
        self.validate_exclusions()?;
        for (kind, steps) in [("setup", &self.setup), ("step", &self.steps)] {
            for step in steps {
                validate_step(step, kind, &self.axes)?;
            }
        }
        let cells = self.generate_matrix()?;
        for cell in &cells {
            check_unique_names(&self.setup, cell)?;
            check_unique_names(&self.steps, cell)?;
        }
        Ok(())
    }

    fn validate_axes(&self) -> Result<(), ConfigError> {
        if self.axes.is_empty() {
            return Err(ConfigError::NoAxes);
        }
        let mut seen = HashSet::new();
        for axis in &self.axes {
            if !seen.insert(axis.name()) {
                return Err(ConfigError::DuplicateAxis(axis.name().to_string()));
            }
            if axis.values().is_empty() {
                return Err(ConfigError::EmptyAxis(axis.name().to_string()));
            }
        }
        Ok(())
    }

    fn validate_exclusions(&self) -> Result<(), ConfigError> {
        for (i, rule) in self.exclusions.iter().enumerate() {
            let context = format!("exclusion rule #{}", i + 1);
            if rule.is_empty() {
                return Err(ConfigError::EmptyExclusion(i + 1));
            }
            for (axis_name, value) in rule.pairs() {
                let axis = self
                    .axes
                    .iter()
                    .find(|a| a.name() == axis_name)
                    .ok_or_else(|| ConfigError::UnknownAxis {
                        axis: axis_name.to_string(),
                        context: context.clone(),
                    })?;
                if !axis.contains(value) {
                    return Err(ConfigError::UnknownValue {
                        axis: axis_name.to_string(),
                        value: value.to_string(),
                        context,
                    });
                }
            }
        }
        Ok(())
    }
}

fn validate_step(step: &Step, kind: &str, axes: &[Axis]) -> Result<(), ConfigError> {
    let context = format!("{kind} '{}'", step.name);
    if step.run.trim().is_empty() {
        return Err(ConfigError::InvalidCommand {
            step: step.name.clone(),
            reason: "command is empty".to_string(),
        });
    }
    if let Some(guard) = &step.guard {
        guard.validate(axes, &context)?;
    }
    let templates = std::iter::once(&step.run)
        .chain(&step.path)
        .chain(step.env.values());
    for text in templates {
        let referenced =
            template::referenced_axes(text).map_err(|reason| ConfigError::InvalidCommand {
                step: step.name.clone(),
                reason,
            })?;
        if let Some(axis) = referenced
            .into_iter()
            .find(|axis| !axes.iter().any(|a| a.name() == *axis))
        {
            return Err(ConfigError::UnknownAxis {
                axis: axis.to_string(),
                context,
            });
        }
    }
    Ok(())
}

/// Step names must be unique among the steps whose guards admit the cell.
/// 在守卫允许该单元的步骤中，步骤名称必须唯一。
fn check_unique_names(steps: &[Step], cell: &Cell) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for step in steps.iter().filter(|s| s.applies_to(cell)) {
        if !seen.insert(step.name.as_str()) {
            return Err(ConfigError::DuplicateStep {
                step: step.name.clone(),
                cell: cell.to_string(),
            });
        }
    }
    Ok(())
}
