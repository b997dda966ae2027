mod common;

use common::sample_project;
use jobmatrix::config::Isolation;
use jobmatrix::infra::fs::{copy_dir_all, create_cell_workspace};
use tempfile::tempdir;

#[test]
fn test_copy_isolation_copies_project_without_ignored_entries() {
    let project = sample_project();
    let ignore = vec!["target".to_string(), ".git".to_string()];

    let workspace =
        create_cell_workspace(project.path(), "os_linux", Isolation::Copy, &ignore).unwrap();

    let workdir = workspace.workdir();
    assert!(workdir.starts_with(workspace.temp_path()));
    assert!(workdir.join("README.md").is_file());
    assert!(workdir.join("src").join("main.txt").is_file());
    assert!(!workdir.join("target").exists());
}

#[test]
fn test_shared_isolation_uses_project_directory() {
    let project = sample_project();

    let workspace = create_cell_workspace(project.path(), "x", Isolation::Shared, &[]).unwrap();

    assert_eq!(workspace.workdir(), project.path());
    assert_ne!(workspace.temp_path(), project.path());
}

#[test]
fn test_workspace_is_removed_on_drop() {
    let project = sample_project();
    let workspace = create_cell_workspace(project.path(), "drop", Isolation::Copy, &[]).unwrap();
    let temp = workspace.temp_path().to_path_buf();
    assert!(temp.exists());

    drop(workspace);

    assert!(!temp.exists());
    assert!(project.path().join("README.md").exists());
}

#[test]
fn test_cells_get_distinct_workspaces() {
    let project = sample_project();
    let a = create_cell_workspace(project.path(), "same", Isolation::Copy, &[]).unwrap();
    let b = create_cell_workspace(project.path(), "same", Isolation::Copy, &[]).unwrap();

    std::fs::write(a.workdir().join("README.md"), "changed by a").unwrap();

    assert_ne!(a.temp_path(), b.temp_path());
    assert_eq!(
        std::fs::read_to_string(b.workdir().join("README.md")).unwrap(),
        "sample project\n"
    );
}

#[test]
fn test_copy_dir_all_creates_destination() {
    let project = sample_project();
    let dest = tempdir().unwrap();
    let target = dest.path().join("nested").join("copy");

    copy_dir_all(project.path(), &target, &[]).unwrap();

    assert!(target.join("target").join("big.bin").is_file());
}
