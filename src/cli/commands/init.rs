//! # Init Command Module / 初始化命令模块
//!
//! Creates a new `JobMatrix.toml`, either from a built-in example (`--non-interactive`) or
//! through an interactive wizard that asks for axes and steps.
//!
//! 创建新的 `JobMatrix.toml`：使用内置示例（`--non-interactive`），
//! 或通过询问轴和步骤的交互式向导。
//!
//! ## Features / 功能特性
//!
//! - **Interactive Wizard**: axes and steps are entered one by one
//! - **Validation**: the generated file is validated before it is written
//! - **Overwrite Protection**: an existing file is kept unless `--force` is given or the user confirms
//!
//! - **交互式向导**: 逐个输入轴和步骤
//! - **验证**: 生成的文件在写入之前经过验证
//! - **覆盖保护**: 除非指定 `--force` 或用户确认，否则保留现有文件

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::{fs, path::Path, path::PathBuf};

use crate::core::config::{MatrixConfig, Settings};
use crate::core::models::{Axis, Step};
use crate::infra::t;

const FILE_HEADER: &str = "# Job matrix configuration, see `jobmatrix --help`.\n\
# Placeholders like ${{ matrix.<axis> }} are replaced per cell.\n\n";

/// Arguments of the `init` command.
#[derive(Debug, Clone)]
pub struct InitArgs {
    pub output: PathBuf,
    pub non_interactive: bool,
    pub force: bool,
}

/// Executes the init command.
pub fn execute(args: InitArgs, locale: &str) -> Result<()> {
    let theme = ColorfulTheme::default();

    if !args.non_interactive {
        println!("\n{}", t!("init.welcome", locale = locale).cyan().bold());
        println!("{}", t!("init.description", locale = locale));
    }

    if args.output.exists() && !args.force {
        if args.non_interactive {
            anyhow::bail!(
                t!("init.file_exists", locale = locale, path = args.output.display()).to_string()
            );
        }
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init.overwrite_prompt", locale = locale, path = args.output.display()))
            .default(false)
            .interact()
            .context(t!("init.user_confirmation_failed", locale = locale).to_string())?;
        if !confirmation {
            println!("{}", t!("init.aborted", locale = locale));
            return Ok(());
        }
    }

    let config = if args.non_interactive {
        default_config()
    } else {
        run_wizard(&theme, locale)?
    };
    config.validate()?;
    write_config(&args.output, &config, locale)
}

/// The built-in example: two axes, one exclusion, one guarded step.
pub fn default_config() -> MatrixConfig {
    use crate::core::guard::Guard;
    use crate::core::models::CellPattern;

    MatrixConfig {
        language: None,
        settings: Settings::default(),
        axes: vec![
            Axis::new("greeting", ["hello", "hi"]),
            Axis::new("target", ["world", "matrix"]),
        ],
        exclusions: vec![CellPattern::new([("greeting", "hi"), ("target", "matrix")])],
        setup: Vec::new(),
        steps: vec![
            Step::new("Greet", "echo ${{ matrix.greeting }} ${{ matrix.target }}"),
            Step::new("Show cell", "echo $JOBMATRIX_CELL"),
            Step::new("World only", "echo only for the world")
                .when(Guard::equals("target", "world")),
        ],
    }
}

fn run_wizard(theme: &ColorfulTheme, locale: &str) -> Result<MatrixConfig> {
    let mut axes = Vec::new();
    loop {
        let name: String = Input::with_theme(theme)
            .with_prompt(t!("init.axis_name_prompt", locale = locale))
            .interact_text()?;
        let values: String = Input::with_theme(theme)
            .with_prompt(t!("init.axis_values_prompt", locale = locale))
            .interact_text()?;
        let values: Vec<&str> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        axes.push(Axis::new(name.trim(), values));

        let more = Confirm::with_theme(theme)
            .with_prompt(t!("init.another_axis_prompt", locale = locale))
            .default(false)
            .interact()
            .context(t!("init.user_confirmation_failed", locale = locale).to_string())?;
        if !more {
            break;
        }
    }

    let mut steps = Vec::new();
    loop {
        let name: String = Input::with_theme(theme)
            .with_prompt(t!("init.step_name_prompt", locale = locale))
            .interact_text()?;
        let run: String = Input::with_theme(theme)
            .with_prompt(t!("init.step_command_prompt", locale = locale))
            .interact_text()?;
        steps.push(Step::new(name.trim(), run.trim()));

        let more = Confirm::with_theme(theme)
            .with_prompt(t!("init.another_step_prompt", locale = locale))
            .default(false)
            .interact()
            .context(t!("init.user_confirmation_failed", locale = locale).to_string())?;
        if !more {
            break;
        }
    }

    Ok(MatrixConfig {
        language: Some(locale.to_string()),
        settings: Settings::default(),
        axes,
        exclusions: Vec::new(),
        setup: Vec::new(),
        steps,
    })
}

fn write_config(path: &Path, config: &MatrixConfig, locale: &str) -> Result<()> {
    let body = config
        .to_toml()
        .context(t!("init.serialize_failed", locale = locale).to_string())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            t!("init.create_parent_dir_failed", locale = locale, path = parent.display()).to_string()
        })?;
    }
    fs::write(path, format!("{FILE_HEADER}{body}")).with_context(|| {
        t!("init.write_failed", locale = locale, path = path.display()).to_string()
    })?;

    println!(
        "{}",
        t!("init.success", locale = locale, path = path.display()).green()
    );
    println!("{}", t!("init.next_steps", locale = locale));
    Ok(())
}
