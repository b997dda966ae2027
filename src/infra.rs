//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the job matrix runner:
//! external command execution, cell workspaces on disk, and i18n support.
//!
//! 此模块为作业矩阵运行器提供基础设施服务：
//! 外部命令执行、磁盘上的单元工作区以及国际化支持。

pub mod command;
pub mod fs;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
