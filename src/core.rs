//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the job matrix runner:
//! data models, configuration, matrix generation, and the cell execution engine.
//!
//! 此模块包含作业矩阵运行器的核心功能：
//! 数据模型、配置、矩阵生成和单元执行引擎。

pub mod config;
pub mod error;
pub mod executor;
pub mod guard;
pub mod matrix;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod sequencer;
pub mod template;

// Re-exports
pub use config::MatrixConfig;
pub use error::{ConfigError, RunError};
pub use matrix::generate;
pub use orchestrator::Orchestrator;
