// Shared test helpers for integration tests
#![allow(dead_code)]

use jobmatrix::core::config::{Catalogue, Isolation};
use jobmatrix::core::executor::ExecutionSettings;
use jobmatrix::core::generate;
use jobmatrix::infra::command::{CommandOutcome, CommandRunner, Invocation};
use jobmatrix::models::{Axis, Cell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// What the fake runner does for a command containing a given needle.
#[derive(Debug, Clone)]
pub enum Behavior {
    Exit(i32, String),
    Timeout,
    SpawnError,
    Panic,
    /// Never finishes on its own within a test's lifetime.
    Stall,
}

/// A `CommandRunner` that never spawns processes. It records every invocation, answers with
/// scripted outcomes, and tracks how many commands were in flight at once.
#[derive(Debug, Default)]
pub struct FakeRunner {
    rules: Vec<(String, Behavior)>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Invocation>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands containing `needle` behave as `behavior`. The first matching rule wins;
    /// unmatched commands exit 0.
    pub fn on(mut self, needle: &str, behavior: Behavior) -> Self {
        self.rules.push((needle.to_string(), behavior));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.command).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutcome> {
        self.calls.lock().unwrap().push(invocation.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let behavior = self
            .rules
            .iter()
            .find(|(needle, _)| invocation.command.contains(needle.as_str()))
            .map(|(_, b)| b.clone())
            .unwrap_or_else(|| Behavior::Exit(0, format!("ran {}\n", invocation.command)));

        match behavior {
            Behavior::Exit(code, output) => Ok(CommandOutcome {
                exit_code: Some(code),
                output,
                timed_out: false,
                duration: Duration::from_millis(1),
            }),
            Behavior::Timeout => Ok(CommandOutcome {
                exit_code: None,
                output: "partial output\n".to_string(),
                timed_out: true,
                duration: Duration::from_millis(1),
            }),
            Behavior::SpawnError => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no such program",
            )),
            Behavior::Panic => panic!("scripted runner panic"),
            Behavior::Stall => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(CommandOutcome {
                    exit_code: Some(0),
                    output: String::new(),
                    timed_out: false,
                    duration: Duration::from_secs(3600),
                })
            }
        }
    }
}

/// Builds axes from `(name, values)` pairs.
pub fn axes(defs: &[(&str, &[&str])]) -> Vec<Axis> {
    defs.iter()
        .map(|(name, values)| Axis::new(*name, values.iter().copied()))
        .collect()
}

/// The single cell assigning each given axis its given value.
pub fn cell(pairs: &[(&str, &str)]) -> Cell {
    let axes: Vec<Axis> = pairs.iter().map(|(a, v)| Axis::new(*a, [*v])).collect();
    generate(&axes, &[]).unwrap().remove(0)
}

/// Execution settings that run in `root` without copying it.
pub fn shared_settings(root: &Path) -> ExecutionSettings {
    let mut settings = ExecutionSettings::new(root);
    settings.isolation = Isolation::Shared;
    settings
}

pub fn catalogue(steps: Vec<jobmatrix::models::Step>) -> Catalogue {
    Catalogue {
        setup: Vec::new(),
        steps,
    }
}

/// Writes a configuration file into `dir` and returns its path.
pub fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write config");
    path
}

/// A small project directory for cells to work on.
pub fn sample_project() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    fs::write(dir.path().join("README.md"), "sample project\n").unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src").join("main.txt"), "hello\n").unwrap();
    fs::create_dir_all(dir.path().join("target")).unwrap();
    fs::write(dir.path().join("target").join("big.bin"), "artifact").unwrap();
    dir
}
