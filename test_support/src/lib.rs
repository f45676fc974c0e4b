//! Test utilities for the acceptance harness.
//!
//! Fake `mvn` executables stand in for the real build tool: they record how
//! they were invoked and, where asked, write a JaCoCo-shaped report into the
//! project they were run in. Project helpers lay out minimal sample projects
//! inside temporary directories.

pub mod cli;
pub mod error;
pub mod exec;
pub mod fake_mvn;
pub mod project;

pub use cli::{CliRun, run_cli_in};
pub use error::display_error_chain;
pub use exec::make_executable;
pub use fake_mvn::{FakeMvn, INVOCATION_LOG, Invocation, read_invocation};
pub use project::{report_html, scala_project, utf8_temp_dir, write_report};
