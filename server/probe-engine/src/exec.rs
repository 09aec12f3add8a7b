//! Command execution seams. The probe never runs processes itself; callers
//! plug in whatever reaches the target (local exec, kubectl, ssh, ...).

use crate::error::{BoxError, ProbeError};

/// Runs a command with arguments on the target and returns its stdout.
pub trait CommandRunner {
  fn run_command(&self, command: &str, args: &[&str]) -> Result<String, BoxError>;
}

/// Runs a single dataplane CLI command and returns its output.
pub trait CliExecutor {
  fn run_cli(&self, cmd: &str) -> Result<String, BoxError>;
}

impl<F> CommandRunner for F
where
  F: Fn(&str, &[&str]) -> Result<String, BoxError>,
{
  fn run_command(&self, command: &str, args: &[&str]) -> Result<String, BoxError> {
    self(command, args)
  }
}

impl<F> CliExecutor for F
where
  F: Fn(&str) -> Result<String, BoxError>,
{
  fn run_cli(&self, cmd: &str) -> Result<String, BoxError> {
    self(cmd)
  }
}

pub(crate) fn run_command(
  runner: &dyn CommandRunner,
  command: &str,
  args: &[&str],
) -> Result<String, ProbeError> {
  let line = std::iter::once(command)
    .chain(args.iter().copied())
    .collect::<Vec<_>>()
    .join(" ");
  tracing::debug!("running {}", line);
  runner
    .run_command(command, args)
    .map_err(|e| ProbeError::command(line, e))
}

pub(crate) fn run_cli(cli: &dyn CliExecutor, cmd: &str) -> Result<String, ProbeError> {
  tracing::debug!("running cli {:?}", cmd);
  cli.run_cli(cmd).map_err(|e| ProbeError::command(cmd, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn command_failure_names_full_command_line() {
    let runner = |_: &str, _: &[&str]| -> Result<String, BoxError> { Err("connection refused".into()) };
    let err = run_command(&runner, "agentctl", &["dump", "all"]).unwrap_err();
    assert!(matches!(err, ProbeError::Command { .. }));
    assert!(err.to_string().contains("agentctl dump all"));
    assert!(err.to_string().contains("connection refused"));
  }

  #[test]
  fn cli_output_is_passed_through() {
    let cli = |cmd: &str| -> Result<String, BoxError> { Ok(format!("ran {}", cmd)) };
    assert_eq!(run_cli(&cli, "show clock").unwrap(), "ran show clock");
  }
}
