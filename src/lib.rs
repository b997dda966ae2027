//! # Job Matrix Library / Job Matrix 库
//!
//! This library provides the core functionality for `jobmatrix`, a configuration-driven
//! runner that expands named axes into a matrix of cells and runs an ordered catalogue of
//! guarded steps in every cell, in isolation and in parallel.
//!
//! 此库为 `jobmatrix` 提供核心功能，这是一个配置驱动的运行器：
//! 它将具名轴展开为单元矩阵，并在每个单元中隔离且并行地运行一组有序的、带条件守卫的步骤。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration, matrix generation and the execution engine
//! - `infra` - Command execution and file system operations
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、配置、矩阵生成和执行引擎
//! - `infra` - 命令执行和文件系统操作
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::error::{ConfigError, RunError};
pub use core::models;

/// Picks the UI language. The first candidate that names an available locale wins, matching the
/// full tag (e.g. "zh-CN") before the language part (e.g. "en" from "en-US"). Without a match the
/// system locale is tried the same way, and finally "en".
///
/// 选择界面语言。第一个命中可用语言的候选者胜出：先匹配完整标签（例如 "zh-CN"），
/// 再匹配语言部分（例如 "en-US" 中的 "en"）。若无匹配，则以同样方式尝试系统语言，最后回退到 "en"。
pub fn resolve_locale(candidates: &[Option<&str>]) -> String {
    let available = rust_i18n::available_locales!();
    let lookup = |tag: &str| -> Option<String> {
        if available.contains(&tag) {
            return Some(tag.to_string());
        }
        tag.split(['-', '_'])
            .next()
            .filter(|lang| available.contains(lang))
            .map(str::to_string)
    };

    let system = sys_locale::get_locale();
    candidates
        .iter()
        .copied()
        .chain(std::iter::once(system.as_deref()))
        .flatten()
        .find_map(lookup)
        .unwrap_or_else(|| "en".to_string())
}

/// Resolves the locale from the given candidates and makes it the process-wide default.
/// Returns the chosen locale.
pub fn init(candidates: &[Option<&str>]) -> String {
    let locale = resolve_locale(candidates);
    rust_i18n::set_locale(&locale);
    locale
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
