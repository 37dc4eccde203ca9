//! Wrapped command execution.

use std::process::ExitStatus;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{CliError, Result};

/// Run `command` with `vars` added to the inherited environment and return
/// the exit code to propagate.
pub async fn run_command(command: &[String], vars: &[(String, String)]) -> Result<i32> {
    let Some((program, args)) = command.split_first() else {
        return Err(CliError::Config("no command given".to_string()));
    };

    debug!(program = %program, args = args.len(), "Running wrapped command");
    let status = Command::new(program)
        .args(args)
        .envs(vars.iter().map(|(name, value)| (name, value)))
        .status()
        .await
        .map_err(|source| CliError::Exec {
            program: program.clone(),
            source,
        })?;

    let code = exit_code(status);
    if code != 0 {
        warn!(program = %program, code, "Wrapped command exited with a non-zero status");
    }
    Ok(code)
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    // Shell convention for death by signal.
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
