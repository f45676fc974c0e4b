//! Subprocess handling for build goals: spawning, output capture, timeouts.

use super::BuildCommand;
use camino::Utf8Path;
use std::fmt;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Text written by the build tool, decoded lossily as UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Everything written to standard output.
    pub stdout: String,
    /// Everything written to standard error.
    pub stderr: String,
}

impl CapturedOutput {
    /// Standard output followed by standard error.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len());
        text.push_str(&self.stdout);
        text.push_str(&self.stderr);
        text
    }
}

/// What happened when a build goal was run.
#[derive(Debug)]
pub enum BuildOutcome {
    /// The build tool ran to completion; its exit status is not interpreted.
    Exited {
        /// Exit status reported by the operating system.
        status: ExitStatus,
        /// Captured output.
        output: CapturedOutput,
    },
    /// The build tool exceeded the configured timeout and was killed.
    TimedOut {
        /// The timeout that elapsed.
        after: Duration,
        /// Output captured before the process was killed.
        output: CapturedOutput,
    },
    /// The build tool could not be started or waited on.
    Failed {
        /// Underlying I/O failure.
        error: io::Error,
    },
}

impl BuildOutcome {
    /// Whether the build tool exited with status zero.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Exited { status, .. } if status.success())
    }

    /// Captured output, when the process got far enough to produce any.
    #[must_use]
    pub const fn output(&self) -> Option<&CapturedOutput> {
        match self {
            Self::Exited { output, .. } | Self::TimedOut { output, .. } => Some(output),
            Self::Failed { .. } => None,
        }
    }
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited { status, .. } => write!(f, "build tool {status}"),
            Self::TimedOut { after, .. } => {
                write!(f, "build tool timed out after {}s", after.as_secs())
            }
            Self::Failed { error } => write!(f, "build tool could not be run: {error}"),
        }
    }
}

/// Run `command` in `dir`, capturing its output.
///
/// Reader threads drain both pipes while the child runs so a chatty build
/// cannot block on a full pipe. With a timeout on Unix the child leads its own
/// process group, and the whole group is killed when the timeout elapses so
/// that forked helpers holding the pipes open die with it.
pub(super) fn run(
    command: &BuildCommand,
    dir: &Utf8Path,
    timeout: Option<Duration>,
) -> BuildOutcome {
    let mut cmd = command.to_command();
    cmd.current_dir(dir.as_std_path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if timeout.is_some() {
        lead_process_group(&mut cmd);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(error) => return BuildOutcome::Failed { error },
    };
    let Some(stdout) = child.stdout.take() else {
        terminate_child(&mut child, "stdout pipe unavailable");
        return BuildOutcome::Failed {
            error: io::Error::other("child process missing stdout pipe"),
        };
    };
    let Some(stderr) = child.stderr.take() else {
        terminate_child(&mut child, "stderr pipe unavailable");
        return BuildOutcome::Failed {
            error: io::Error::other("child process missing stderr pipe"),
        };
    };

    let out_handle = thread::spawn(move || drain(stdout, "stdout"));
    let err_handle = thread::spawn(move || drain(stderr, "stderr"));

    let waited = wait_for_child(&mut child, timeout);
    let output = CapturedOutput {
        stdout: join_drain(out_handle, "stdout"),
        stderr: join_drain(err_handle, "stderr"),
    };
    match waited {
        Ok(Some(status)) => BuildOutcome::Exited { status, output },
        Ok(None) => BuildOutcome::TimedOut {
            after: timeout.unwrap_or_default(),
            output,
        },
        Err(error) => BuildOutcome::Failed { error },
    }
}

/// Wait for `child`, killing it once `timeout` elapses.
///
/// Returns `Ok(None)` when the child was killed.
fn wait_for_child(
    child: &mut Child,
    timeout: Option<Duration>,
) -> io::Result<Option<ExitStatus>> {
    let Some(limit) = timeout else {
        return child.wait().map(Some);
    };
    let status = child.wait_timeout(limit)?;
    if status.is_none() {
        kill_group(child);
        terminate_child(child, "timeout elapsed");
    }
    Ok(status)
}

#[cfg(unix)]
fn lead_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
const fn lead_process_group(_cmd: &mut Command) {}

#[cfg(unix)]
fn kill_group(child: &Child) {
    use rustix::process::{Pid, Signal, kill_process_group};
    let Some(pid) = i32::try_from(child.id()).ok().and_then(Pid::from_raw) else {
        return;
    };
    if let Err(err) = kill_process_group(pid, Signal::KILL) {
        tracing::debug!("failed to kill process group {pid:?}: {err}");
    }
}

#[cfg(not(unix))]
const fn kill_group(_child: &Child) {}

fn terminate_child(child: &mut Child, context: &str) {
    if let Err(err) = child.kill() {
        tracing::debug!("failed to kill child after {context}: {err}");
    }
    if let Err(err) = child.wait() {
        tracing::debug!("failed to reap child after {context}: {err}");
    }
}

fn drain<R: Read>(mut reader: R, stream_name: &'static str) -> String {
    let mut bytes = Vec::new();
    if let Err(err) = reader.read_to_end(&mut bytes) {
        tracing::debug!("failed to read child {stream_name}: {err}; keeping partial output");
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn join_drain(handle: JoinHandle<String>, stream_name: &str) -> String {
    handle.join().unwrap_or_else(|err| {
        tracing::warn!("{stream_name} capture thread panicked: {err:?}");
        String::new()
    })
}
