//! Build goal execution.
//!
//! Turns a scenario's free-text goal into a `mvn` invocation carrying the
//! scenario's local repository, runs it inside the project directory, and
//! records what happened. A failing build is not an error here: the next
//! verification step notices the missing or stale report instead.

mod command;
mod process;
mod redaction;

pub use command::{BuildCommand, Properties};
pub use process::{BuildOutcome, CapturedOutput};

use crate::context::ScenarioContext;
use crate::error::ScenarioError;
use camino::{Utf8Path, Utf8PathBuf};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default build tool executable.
pub const BUILD_PROGRAM: &str = "mvn";
/// Environment variable override for the build tool executable.
pub use build_tool_env::MVN_ENV;
/// Property carrying the scenario's local artefact repository.
pub const REPO_LOCAL_PROPERTY: &str = "maven.repo.local";

/// The build tool executable and how long a single goal may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTool {
    program: Utf8PathBuf,
    timeout: Option<Duration>,
}

impl Default for BuildTool {
    fn default() -> Self {
        Self::new(BUILD_PROGRAM)
    }
}

impl BuildTool {
    /// Run `program` without a timeout.
    #[must_use]
    pub fn new(program: impl Into<Utf8PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Use the program named by [`MVN_ENV`], falling back to `mvn`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(resolve_build_program())
    }

    /// Kill goals that run longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The executable to run.
    #[must_use]
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    /// Upper bound for a single goal, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Resolve the build program using `read_env` to look up [`MVN_ENV`].
///
/// Overrides that are not valid UTF-8 are ignored.
#[must_use]
pub fn resolve_build_program_with<F>(mut read_env: F) -> Utf8PathBuf
where
    F: FnMut(&str) -> Option<OsString>,
{
    read_env(MVN_ENV)
        .and_then(|value| Utf8PathBuf::from_path_buf(PathBuf::from(value)).ok())
        .unwrap_or_else(|| Utf8PathBuf::from(BUILD_PROGRAM))
}

/// Resolve the build program from the process environment.
#[must_use]
pub fn resolve_build_program() -> Utf8PathBuf {
    resolve_build_program_with(|key| std::env::var_os(key))
}

/// Parse a `KEY=VALUE` property override.
///
/// # Errors
///
/// Returns [`ScenarioError::InvalidProperty`] when there is no `=` or the key
/// is empty.
///
/// # Examples
/// ```
/// use jacoco_scala_acceptance::build::parse_property;
/// let (key, value) = parse_property("jacoco.skip=false").unwrap();
/// assert_eq!((key.as_str(), value.as_str()), ("jacoco.skip", "false"));
/// ```
pub fn parse_property(text: &str) -> Result<(String, String), ScenarioError> {
    match text.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(ScenarioError::InvalidProperty {
            property: text.to_owned(),
        }),
    }
}

/// Run `goal` for the scenario's project.
///
/// The command is `<program> -N -B <goal> -Dmaven.repo.local="<repository>"`
/// followed by one `-D` flag per entry of `extra`. The repository from the
/// context replaces any `maven.repo.local` in `extra`. The process runs with
/// the project as its working directory; the harness's own working directory
/// is never touched.
///
/// # Errors
///
/// Returns [`ScenarioError::MissingContext`] when the repository or project
/// is unset and [`ScenarioError::InvalidGoal`] when `goal` has no words.
/// Build failures are recorded in the returned [`BuildOutcome`], not raised.
pub fn run_build_goal<'ctx>(
    context: &'ctx mut ScenarioContext,
    goal: &str,
    extra: &Properties,
) -> Result<&'ctx BuildOutcome, ScenarioError> {
    let repository = context.repository()?;
    let project = context.project()?.to_path_buf();
    let command = BuildCommand::new(context.build_tool().program(), goal)?
        .with_properties(extra)
        .with_property(REPO_LOCAL_PROPERTY, repository.as_str());

    info!(command = %command.redacted(), %project, "running build goal");
    let outcome = process::run(&command, &project, context.build_tool().timeout());
    log_outcome(&outcome);
    Ok(context.record_outcome(outcome))
}

fn log_outcome(outcome: &BuildOutcome) {
    match outcome {
        BuildOutcome::Exited { status, output } => {
            if status.success() {
                info!(%status, "build goal finished");
            } else {
                warn!(%status, "build goal failed; the coverage report may be missing or stale");
            }
            debug!("build output:\n{}", output.combined());
        }
        BuildOutcome::TimedOut { after, output } => {
            warn!(?after, "build goal timed out and was killed");
            debug!("build output before timeout:\n{}", output.combined());
        }
        BuildOutcome::Failed { error } => {
            warn!(%error, "build tool could not be run");
        }
    }
}
