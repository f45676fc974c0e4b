//! Helpers for invoking the built `jacoco-scala-acceptance` binary in tests.

use anyhow::{Context, Result};
use assert_cmd::Command;
use build_tool_env::MVN_ENV;
use camino::Utf8Path;

/// Captured output from a binary invocation.
#[derive(Debug)]
pub struct CliRun {
    /// Captured stdout (lossy UTF-8).
    pub stdout: String,
    /// Captured stderr (lossy UTF-8).
    pub stderr: String,
    /// Whether the command exited successfully.
    pub success: bool,
}

/// Run the binary in `current_dir` with `args`, using `mvn` as the build
/// tool through the environment override.
///
/// # Errors
///
/// Returns an error when the binary cannot be located or spawned.
pub fn run_cli_in(current_dir: &Utf8Path, mvn: &Utf8Path, args: &[&str]) -> Result<CliRun> {
    let mut cmd =
        Command::cargo_bin("jacoco-scala-acceptance").context("locate jacoco-scala-acceptance")?;
    let output = cmd
        .current_dir(current_dir.as_std_path())
        .env(MVN_ENV, mvn.as_str())
        .args(args)
        .output()
        .context("run jacoco-scala-acceptance")?;
    Ok(CliRun {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    })
}
