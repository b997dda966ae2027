//! # Command-Line Interface Module / 命令行接口模块
//!
//! Builds the localized `clap` command tree and dispatches to the `run`, `list` and `init`
//! commands. The `--lang` flag is read before the parser is built so that help text is already
//! translated.
//!
//! 构建本地化的 `clap` 命令树并分派到 `run`、`list` 和 `init` 命令。
//! `--lang` 参数在构建解析器之前读取，以便帮助文本已经被翻译。

pub mod commands;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::infra::t;
use commands::{init::InitArgs, list::ListArgs, run::RunArgs};

/// Configuration file used when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "JobMatrix.toml";

/// Pre-parses the command line arguments to find the language setting.
/// Accepts both `--lang <VALUE>` and `--lang=<VALUE>`.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter().enumerate().find_map(|(i, arg)| {
        if arg == "--lang" {
            args.get(i + 1).cloned()
        } else {
            arg.strip_prefix("--lang=").map(str::to_string)
        }
    })
}

fn config_arg(locale: &str) -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help(t!("cli.arg_config", locale = locale).to_string())
        .value_name("CONFIG")
        .default_value(DEFAULT_CONFIG_FILE)
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

fn only_arg(locale: &str) -> Arg {
    Arg::new("only")
        .long("only")
        .help(t!("cli.arg_only", locale = locale).to_string())
        .value_name("AXIS=VALUE")
        .action(ArgAction::Append)
}

fn shard_args(locale: &str) -> [Arg; 2] {
    [
        Arg::new("total-runners")
            .long("total-runners")
            .help(t!("cli.arg_total_runners", locale = locale).to_string())
            .value_name("TOTAL_RUNNERS")
            .value_parser(clap::value_parser!(usize))
            .action(ArgAction::Set)
            .requires("runner-index"),
        Arg::new("runner-index")
            .long("runner-index")
            .help(t!("cli.arg_runner_index", locale = locale).to_string())
            .value_name("RUNNER_INDEX")
            .value_parser(clap::value_parser!(usize))
            .action(ArgAction::Set)
            .requires("total-runners"),
    ]
}

/// Builds the command tree with help text in `locale`.
pub fn build_cli(locale: &str) -> Command {
    Command::new("jobmatrix")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.arg_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.cmd_run_about", locale = locale).to_string())
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("cli.arg_jobs", locale = locale).to_string())
                        .value_name("JOBS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(config_arg(locale))
                .arg(
                    Arg::new("project-dir")
                        .long("project-dir")
                        .help(t!("cli.arg_project_dir", locale = locale).to_string())
                        .value_name("PROJECT_DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .args(shard_args(locale))
                .arg(only_arg(locale))
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .help(t!("cli.arg_timeout", locale = locale).to_string())
                        .value_name("SECONDS")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help(t!("cli.arg_html", locale = locale).to_string())
                        .value_name("HTML")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("cli.arg_json_report", locale = locale).to_string())
                        .value_name("JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .help(t!("cli.arg_quiet", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("list")
                .about(t!("cli.cmd_list_about", locale = locale).to_string())
                .arg(config_arg(locale))
                .args(shard_args(locale))
                .arg(only_arg(locale))
                .arg(
                    Arg::new("steps")
                        .long("steps")
                        .help(t!("cli.arg_steps", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("cli.arg_json_list", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("cli.arg_output", locale = locale).to_string())
                        .value_name("OUTPUT")
                        .default_value(DEFAULT_CONFIG_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.arg_non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.arg_force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn path_arg(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .with_context(|| format!("missing value for --{name}"))
}

fn only_selectors(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("only")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Parses the command line and runs the selected command.
pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let requested = pre_parse_language();
    let locale = crate::init(&[requested.as_deref()]);

    let matches = build_cli(&locale).get_matches();

    match matches.subcommand() {
        Some(("run", m)) => {
            let args = RunArgs {
                jobs: m.get_one::<usize>("jobs").copied(),
                config: path_arg(m, "config")?,
                project_dir: path_arg(m, "project-dir")?,
                total_runners: m.get_one::<usize>("total-runners").copied(),
                runner_index: m.get_one::<usize>("runner-index").copied(),
                only: only_selectors(m),
                timeout_secs: m.get_one::<u64>("timeout").copied(),
                html: m.get_one::<PathBuf>("html").cloned(),
                json: m.get_one::<PathBuf>("json").cloned(),
                quiet: m.get_flag("quiet"),
            };
            commands::run::execute(args, requested.as_deref()).await
        }
        Some(("list", m)) => {
            let args = ListArgs {
                config: path_arg(m, "config")?,
                total_runners: m.get_one::<usize>("total-runners").copied(),
                runner_index: m.get_one::<usize>("runner-index").copied(),
                only: only_selectors(m),
                steps: m.get_flag("steps"),
                json: m.get_flag("json"),
            };
            commands::list::execute(args, requested.as_deref())
        }
        Some(("init", m)) => {
            let args = InitArgs {
                output: path_arg(m, "output")?,
                non_interactive: m.get_flag("non-interactive"),
                force: m.get_flag("force"),
            };
            commands::init::execute(args, &locale)
        }
        // `subcommand_required` makes clap print usage and exit before reaching here.
        _ => Ok(()),
    }
}
