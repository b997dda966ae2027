//! # File System Operations Module / 文件系统操作模块
//!
//! This module provisions the private working area of a cell: a temporary directory that is
//! removed when the cell finishes, and optionally a copy of the project inside it.
//!
//! 此模块为单元准备私有工作区域：一个在单元结束时删除的临时目录，
//! 以及（可选）其中的项目副本。

use anyhow::{Context, Result};
use fs_extra::dir::{CopyOptions, copy};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::core::config::Isolation;

/// The private working area of one cell. The directory on disk is deleted when this is dropped,
/// on every exit path of the cell.
///
/// 单个单元的私有工作区域。当它被丢弃时，磁盘上的目录会被删除，无论单元以何种方式结束。
#[derive(Debug)]
pub struct CellWorkspace {
    temp: TempDir,
    workdir: PathBuf,
}

impl CellWorkspace {
    /// Where the cell's commands run.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// The cell's private scratch directory.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }
}

/// Creates the working area for a cell.
///
/// # Arguments
/// * `project_root` - Path to the project root directory / 项目根目录路径
/// * `cell_slug` - Filesystem-safe cell identifier, used in the directory name / 文件系统安全的单元标识
/// * `isolation` - Whether the project is copied or shared / 项目是复制还是共享
/// * `ignore` - Top-level entries skipped when copying / 复制时跳过的顶层条目
pub fn create_cell_workspace(
    project_root: &Path,
    cell_slug: &str,
    isolation: Isolation,
    ignore: &[String],
) -> Result<CellWorkspace> {
    let temp = tempfile::Builder::new()
        .prefix(&format!("jobmatrix_{cell_slug}_"))
        .tempdir()
        .context("Failed to create temporary cell directory")?;

    let workdir = match isolation {
        Isolation::Copy => {
            let workdir = temp.path().join("workspace");
            copy_dir_all(project_root, &workdir, ignore).with_context(|| {
                format!(
                    "Failed to copy project '{}' into '{}'",
                    project_root.display(),
                    workdir.display()
                )
            })?;
            workdir
        }
        Isolation::Shared => project_root.to_path_buf(),
    };

    Ok(CellWorkspace { temp, workdir })
}

/// Copies the content of `from` into `to`, skipping top-level entries named in `ignore`.
/// `to` is created if missing.
///
/// 将 `from` 的内容复制到 `to`，跳过 `ignore` 中指定的顶层条目。如果 `to` 不存在则创建。
pub fn copy_dir_all(from: &Path, to: &Path, ignore: &[String]) -> Result<()> {
    fs::create_dir_all(to)?;
    let mut options = CopyOptions::new();
    options.overwrite = true;

    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let name = entry.file_name();
        if ignore.iter().any(|skip| name.to_str() == Some(skip.as_str())) {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            copy(&path, to, &options)
                .with_context(|| format!("Failed to copy directory {}", path.display()))?;
        } else {
            fs::copy(&path, to.join(&name))
                .with_context(|| format!("Failed to copy file {}", path.display()))?;
        }
    }
    Ok(())
}
