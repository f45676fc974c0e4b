//! Construction of the build tool command line.

use super::redaction::{redact_argument, redact_value};
use crate::error::ScenarioError;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;
use std::process::Command;

/// Property overrides passed as `-D<key>="<value>"`, in insertion order.
pub type Properties = IndexMap<String, String>;

/// Non-recursive, batch-mode flags passed before the goal.
const BASE_FLAGS: [&str; 2] = ["-N", "-B"];

/// A fully resolved build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    program: Utf8PathBuf,
    goal: Vec<String>,
    properties: Properties,
}

impl BuildCommand {
    /// Prepare `program` to run `goal`.
    ///
    /// The goal is split with shell word rules, so `clean verify` runs two
    /// phases just as it would when typed into a shell.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::InvalidGoal`] when the goal is blank or its
    /// quotes do not balance.
    pub fn new(program: &Utf8Path, goal: &str) -> Result<Self, ScenarioError> {
        let words = shlex::split(goal)
            .filter(|words| !words.is_empty())
            .ok_or_else(|| ScenarioError::InvalidGoal {
                goal: goal.to_owned(),
            })?;
        Ok(Self {
            program: program.to_path_buf(),
            goal: words,
            properties: Properties::new(),
        })
    }

    /// Merge `properties` into the command. Later values win; a replaced key
    /// keeps its original position.
    #[must_use]
    pub fn with_properties(mut self, properties: &Properties) -> Self {
        for (key, value) in properties {
            self.properties.insert(key.clone(), value.clone());
        }
        self
    }

    /// Set a single property, replacing any earlier value for `key`.
    #[must_use]
    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_owned(), value.to_owned());
        self
    }

    /// The executable to run.
    #[must_use]
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    /// The goal words, in order.
    #[must_use]
    pub fn goal(&self) -> &[String] {
        &self.goal
    }

    /// The property overrides, in order.
    #[must_use]
    pub const fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Arguments handed to the process. No shell is involved, so property
    /// values are passed without the quotes shown by [`Self::render`].
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        BASE_FLAGS
            .iter()
            .map(|flag| (*flag).to_owned())
            .chain(self.goal.iter().cloned())
            .chain(
                self.properties
                    .iter()
                    .map(|(key, value)| format!("-D{key}={value}")),
            )
            .collect()
    }

    /// A [`Command`] ready for the caller to set the working directory and
    /// stdio on.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(self.program.as_std_path());
        cmd.args(self.args());
        cmd
    }

    /// The command as a shell line, e.g.
    /// `mvn -N -B test -Dmaven.repo.local="/tmp/repo"`.
    ///
    /// # Examples
    /// ```
    /// use camino::Utf8Path;
    /// use jacoco_scala_acceptance::build::BuildCommand;
    /// let command = BuildCommand::new(Utf8Path::new("mvn"), "test")
    ///     .unwrap()
    ///     .with_property("maven.repo.local", "/tmp/repo");
    /// assert_eq!(command.render(), r#"mvn -N -B test -Dmaven.repo.local="/tmp/repo""#);
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        self.render_with(false)
    }

    /// Like [`Self::render`], with sensitive property values masked, both in
    /// the property overrides and in `-Dkey=value` words of the goal.
    #[must_use]
    pub fn redacted(&self) -> String {
        self.render_with(true)
    }

    fn render_with(&self, redact: bool) -> String {
        let goal: Vec<Cow<'_, str>> = self
            .goal
            .iter()
            .map(|word| {
                if redact {
                    redact_argument(word)
                } else {
                    Cow::Borrowed(word.as_str())
                }
            })
            .collect();
        let mut line = format!("{} {} {}", self.program, BASE_FLAGS.join(" "), goal.join(" "));
        for (key, value) in &self.properties {
            let shown = if redact {
                redact_value(key, value)
            } else {
                Cow::Borrowed(value.as_str())
            };
            line.push_str(&format!(" -D{key}=\"{shown}\""));
        }
        line
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::REPO_LOCAL_PROPERTY;
    use rstest::rstest;

    fn mvn(goal: &str) -> Result<BuildCommand, ScenarioError> {
        BuildCommand::new(Utf8Path::new("mvn"), goal)
    }

    #[test]
    fn render_matches_shell_form() {
        let command = mvn("test")
            .expect("goal")
            .with_property(REPO_LOCAL_PROPERTY, "/tmp/repo");
        assert_eq!(
            command.render(),
            r#"mvn -N -B test -Dmaven.repo.local="/tmp/repo""#
        );
    }

    #[test]
    fn extra_properties_follow_in_insertion_order() {
        let mut extra = Properties::new();
        extra.insert("jacoco.skip".into(), "false".into());
        extra.insert("scala.version".into(), "2.10.0".into());
        let command = mvn("verify")
            .expect("goal")
            .with_properties(&extra)
            .with_property(REPO_LOCAL_PROPERTY, "/tmp/repo");
        assert_eq!(
            command.args(),
            vec![
                "-N",
                "-B",
                "verify",
                "-Djacoco.skip=false",
                "-Dscala.version=2.10.0",
                "-Dmaven.repo.local=/tmp/repo",
            ]
        );
    }

    #[test]
    fn repository_overrides_caller_duplicate_once() {
        let mut extra = Properties::new();
        extra.insert(REPO_LOCAL_PROPERTY.into(), "/elsewhere".into());
        extra.insert("jacoco.skip".into(), "false".into());
        let command = mvn("test")
            .expect("goal")
            .with_properties(&extra)
            .with_property(REPO_LOCAL_PROPERTY, "/tmp/repo");
        let rendered = command.render();
        assert_eq!(rendered.matches("-Dmaven.repo.local=").count(), 1);
        assert!(rendered.contains(r#"-Dmaven.repo.local="/tmp/repo""#));
        assert!(!rendered.contains("/elsewhere"));
        assert_eq!(
            command.properties().get_index_of(REPO_LOCAL_PROPERTY),
            Some(0)
        );
    }

    #[rstest]
    #[case("clean verify", &["clean", "verify"])]
    #[case("  test  ", &["test"])]
    #[case("'jacoco-scala:report' site", &["jacoco-scala:report", "site"])]
    fn goal_splits_into_words(#[case] goal: &str, #[case] expected: &[&str]) {
        let command = mvn(goal).expect("goal");
        assert_eq!(command.goal(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("'unterminated")]
    fn unusable_goals_are_rejected(#[case] goal: &str) {
        assert!(matches!(mvn(goal), Err(ScenarioError::InvalidGoal { .. })));
    }

    #[test]
    fn redacted_masks_sensitive_values_only() {
        let command = mvn("deploy")
            .expect("goal")
            .with_property("server.password", "hunter2")
            .with_property(REPO_LOCAL_PROPERTY, "/tmp/repo");
        let redacted = command.redacted();
        assert!(redacted.contains(r#"-Dserver.password="***REDACTED***""#));
        assert!(redacted.contains(r#"-Dmaven.repo.local="/tmp/repo""#));
        assert!(!command.to_string().contains("hunter2"));
        assert!(command.render().contains("hunter2"));
    }

    #[test]
    fn redacted_masks_properties_written_in_the_goal() {
        let command = mvn("deploy -Dgpg.passphrase=s3cret -Dscala.version=2.10.0")
            .expect("goal")
            .with_property(REPO_LOCAL_PROPERTY, "/tmp/repo");
        let redacted = command.redacted();
        assert!(!redacted.contains("s3cret"), "secret leaked: {redacted}");
        assert_eq!(
            redacted,
            r#"mvn -N -B deploy -Dgpg.passphrase=***REDACTED*** -Dscala.version=2.10.0 -Dmaven.repo.local="/tmp/repo""#
        );
        assert!(
            command
                .args()
                .contains(&"-Dgpg.passphrase=s3cret".to_owned())
        );
    }
}
