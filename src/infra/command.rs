//! # Command Execution Module / 命令执行模块
//!
//! The boundary between the runner and the outside world. The core hands an [`Invocation`] to a
//! [`CommandRunner`] and only observes the exit code, the captured output, and whether the
//! command timed out. [`ProcessRunner`] is the production implementation.
//!
//! 运行器与外部世界之间的边界。核心将 [`Invocation`] 交给 [`CommandRunner`]，
//! 只观察退出码、捕获的输出以及命令是否超时。[`ProcessRunner`] 是生产环境实现。

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::SplitStream;

/// Everything needed to run one step's command for one cell.
/// 为一个单元运行一个步骤命令所需的全部信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Name of the step, for attribution.
    pub step: String,
    /// The command after template substitution.
    /// 模板替换后的命令。
    pub command: String,
    /// Run through the platform shell instead of splitting into program + args.
    pub shell: bool,
    pub timeout: Option<Duration>,
    /// Environment overrides: matrix variables, setup contributions and step variables.
    /// 环境变量覆盖：矩阵变量、setup 贡献的变量以及步骤变量。
    pub env: BTreeMap<String, String>,
    /// Directories placed in front of the inherited `PATH`, in order.
    pub path_prepend: Vec<PathBuf>,
    pub working_dir: PathBuf,
}

/// What the runner observed about one finished (or killed) command.
/// 运行器观察到的一个已完成（或被终止）命令的信息。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutcome {
    /// `None` when the process was killed (timeout or signal).
    pub exit_code: Option<i32>,
    /// Interleaved stdout and stderr.
    pub output: String,
    pub timed_out: bool,
    pub duration: Duration,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// The external process-invocation collaborator.
///
/// An `Err` means the command could not be started at all; a started command that fails is an
/// `Ok` outcome with a nonzero exit code.
///
/// 外部进程调用协作者。`Err` 表示命令根本无法启动；已启动但失败的命令是带有非零退出码的 `Ok` 结果。
pub trait CommandRunner: Send + Sync + 'static {
    fn run(&self, invocation: &Invocation) -> impl Future<Output = io::Result<CommandOutcome>> + Send;
}

/// Runs invocations as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutcome> {
        let cmd = build_command(invocation)?;
        let start = Instant::now();
        let captured = spawn_and_capture(cmd, invocation.timeout).await?;
        Ok(CommandOutcome {
            exit_code: captured.status.and_then(|s| s.code()),
            output: captured.output,
            timed_out: captured.timed_out,
            duration: start.elapsed(),
        })
    }
}

/// Returns the platform shell and the flag that makes it run a command string.
fn platform_shell() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}

/// Builds the child process for an invocation without touching this process's environment.
///
/// Non-shell commands get `$VAR` expansion against the invocation environment (falling back to
/// the inherited one) and are then split with shell-like quoting rules.
///
/// 为调用构建子进程，而不修改当前进程的环境。
pub fn build_command(invocation: &Invocation) -> io::Result<Command> {
    let mut cmd = if invocation.shell {
        let (shell, flag) = platform_shell();
        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(&invocation.command);
        cmd
    } else {
        let expanded = shellexpand::env_with_context_no_errors(&invocation.command, |var: &str| {
            invocation
                .env
                .get(var)
                .cloned()
                .or_else(|| std::env::var(var).ok())
        });
        let parts = shlex::split(&expanded).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("failed to parse command: {expanded}"),
            )
        })?;
        let (program, args) = parts.split_first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "empty command after parsing")
        })?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    };

    cmd.envs(&invocation.env)
        .current_dir(&invocation.working_dir)
        .kill_on_drop(true);

    if !invocation.path_prepend.is_empty() {
        let inherited: OsString = invocation
            .env
            .get("PATH")
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"))
            .unwrap_or_default();
        let joined = std::env::join_paths(
            invocation
                .path_prepend
                .iter()
                .cloned()
                .chain(std::env::split_paths(&inherited)),
        )
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        cmd.env("PATH", joined);
    }

    Ok(cmd)
}

/// Result of [`spawn_and_capture`].
#[derive(Debug)]
pub struct Captured {
    /// `None` if the process was killed after exceeding its timeout.
    pub status: Option<ExitStatus>,
    pub output: String,
    pub timed_out: bool,
}

/// Spawns a command and captures its stdout and stderr, interleaved line by line.
/// If `timeout` elapses first, the process is killed and whatever output was read is kept.
///
/// 派生一个命令，逐行交错捕获其 stdout 和 stderr。
/// 如果先到达 `timeout`，进程会被终止，已读取的输出会被保留。
///
/// # Arguments
/// * `cmd` - The `tokio::process::Command` to execute / 要执行的命令
/// * `timeout` - Optional upper bound on the run time / 可选的运行时间上限
///
/// # Returns
/// An `io::Error` only if the process could not be spawned.
/// 仅当进程无法派生时返回 `io::Error`。
pub async fn spawn_and_capture(mut cmd: Command, timeout: Option<Duration>) -> io::Result<Captured> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("failed to capture stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("failed to capture stderr"))?;

    let mut lines = SplitStream::new(BufReader::new(stdout).split(b'\n'))
        .merge(SplitStream::new(BufReader::new(stderr).split(b'\n')));
    let mut output = String::new();

    // Read both pipes to EOF before reaping, so no trailing output is lost. Lines are raw bytes:
    // output that is not valid UTF-8 is decoded lossily and must never stop the draining.
    let drive = async {
        while let Some(chunk) = lines.next().await {
            let Ok(bytes) = chunk else { continue };
            let line = bytes.strip_suffix(b"\r").unwrap_or(&bytes);
            output.push_str(&String::from_utf8_lossy(line));
            output.push('\n');
        }
        child.wait().await
    };

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, drive).await {
            Ok(status) => Some(status?),
            Err(_) => None,
        },
        None => Some(drive.await?),
    };

    match status {
        Some(status) => Ok(Captured {
            status: Some(status),
            output,
            timed_out: false,
        }),
        None => {
            // Best effort; the child is also killed on drop.
            let _ = child.kill().await;
            Ok(Captured {
                status: None,
                output,
                timed_out: true,
            })
        }
    }
}
