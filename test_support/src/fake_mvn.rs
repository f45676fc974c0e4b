//! Fake `mvn` executables.
//!
//! Every fake writes [`INVOCATION_LOG`] into its working directory: the
//! directory itself on the first line, then one argument per line.

use crate::exec::write_script;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

/// Name of the file a fake writes into its working directory.
pub const INVOCATION_LOG: &str = "mvn-invocation.log";

const RECORD_INVOCATION: &str = concat!(
    "#!/bin/sh\n",
    "{ pwd; for arg in \"$@\"; do printf '%s\\n' \"$arg\"; done; } > mvn-invocation.log\n",
);

const WRITE_REPORT: &str = concat!(
    "mkdir -p target/site/jacoco/default\n",
    "if grep -q 'SCALAC.MIXIN' pom.xml 2>/dev/null; then\n",
    "  mixin_row=''\n",
    "else\n",
    "  mixin_row='<tr><td id=\"a1\"><a href=\"Example.html#L5\" class=\"el_method\">thisIsMixedIn()</a></td></tr>'\n",
    "fi\n",
    "printf '%s\\n' '<html><body><table>' ",
    "'<tr><td id=\"a0\"><a href=\"Example.html#L3\" class=\"el_method\">Example()</a></td></tr>' ",
    "\"$mixin_row\" '</table></body></html>' > target/site/jacoco/default/Example.html\n",
    "echo '[INFO] BUILD SUCCESS'\n",
);

/// Behaviour of a fake build tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeMvn {
    /// Record the invocation and exit with the given status.
    Exit(u8),
    /// Record the invocation and write `Example.html`, listing
    /// `thisIsMixedIn()` unless the project's `pom.xml` filters mixins.
    Jacoco,
    /// Record the invocation and sleep for the given number of seconds.
    Sleep(u32),
    /// Like [`FakeMvn::Sleep`], but the shell forks `sleep` instead of
    /// replacing itself, so a grandchild keeps the output pipes open.
    ForkedSleep(u32),
}

impl FakeMvn {
    fn script(self) -> String {
        let body = match self {
            Self::Exit(code) => format!("echo '[ERROR] BUILD FAILURE' >&2\nexit {code}\n"),
            Self::Jacoco => WRITE_REPORT.to_owned(),
            Self::Sleep(secs) => format!("exec sleep {secs}\n"),
            Self::ForkedSleep(secs) => format!("sleep {secs}\necho '[INFO] woke up'\n"),
        };
        format!("{RECORD_INVOCATION}{body}")
    }

    /// Write the fake as `dir/mvn` and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error when the script cannot be written.
    pub fn install(self, dir: &Utf8Path) -> Result<Utf8PathBuf> {
        write_script(dir, "mvn", &self.script())
    }
}

/// How a fake was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Working directory of the fake.
    pub cwd: Utf8PathBuf,
    /// Arguments, in order.
    pub args: Vec<String>,
}

/// Read the invocation log a fake left in `dir`.
///
/// # Errors
///
/// Returns an error when the log is missing or empty.
pub fn read_invocation(dir: &Utf8Path) -> Result<Invocation> {
    let root = Dir::open_ambient_dir(dir, ambient_authority())
        .with_context(|| format!("open {dir}"))?;
    let log = root
        .read_to_string(INVOCATION_LOG)
        .with_context(|| format!("read {INVOCATION_LOG} in {dir}"))?;
    let mut lines = log.lines();
    let cwd = lines
        .next()
        .with_context(|| format!("{INVOCATION_LOG} in {dir} is empty"))?;
    Ok(Invocation {
        cwd: Utf8PathBuf::from(cwd),
        args: lines.map(str::to_owned).collect(),
    })
}
