use colored::*;
use jobmatrix::{ConfigError, RunError, cli};
use std::process::ExitCode;

/// Exit code for an invalid configuration, distinct from a failed run.
const CONFIG_ERROR_EXIT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            let is_config_error = e.chain().any(|cause| {
                cause.downcast_ref::<ConfigError>().is_some()
                    || matches!(cause.downcast_ref::<RunError>(), Some(RunError::Config(_)))
            });
            if is_config_error {
                ExitCode::from(CONFIG_ERROR_EXIT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
