//! # Reporting Module / 报告模块
//!
//! This module turns a run [`Report`](crate::core::models::Report) into output: a colored
//! console summary, a standalone HTML page, and a JSON document for other tools.
//!
//! 此模块将运行报告转换为输出：彩色控制台摘要、独立的 HTML 页面，以及供其他工具使用的 JSON 文档。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_summary, tail_lines};
pub use html::generate_html_report;
pub use json::write_json_report;
