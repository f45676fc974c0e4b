//! Coverage report verification.
//!
//! The JaCoCo HTML report is scraped with a regular expression rather than
//! parsed: the check is whether the method cell markup for the mixed-in
//! method (`class="el_method">thisIsMixedIn()`) appears at all.

use crate::context::ScenarioContext;
use crate::error::ScenarioError;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use regex::Regex;
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;

/// Report directory for the default group, relative to the project.
pub const REPORT_DIR: &str = "target/site/jacoco/default";
/// Class whose report page is inspected by default.
pub const DEFAULT_REPORT_CLASS: &str = "Example";
/// Mixed-in trait method searched for by default.
pub const DEFAULT_METHOD: &str = "thisIsMixedIn";

/// Whether the marker should be present in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// The marker must be found.
    Should,
    /// The marker must be absent.
    ShouldNot,
}

impl Expectation {
    /// Decide whether a search result satisfies the expectation.
    #[must_use]
    pub const fn is_satisfied_by(self, found: bool) -> bool {
        match self {
            Self::Should => found,
            Self::ShouldNot => !found,
        }
    }

    /// Wording used in mismatch messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Should => "to be present",
            Self::ShouldNot => "to be absent",
        }
    }
}

/// Error returned for text that is neither `should` nor `should not`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected 'should' or 'should not', got {0:?}")]
pub struct ParseExpectationError(String);

impl FromStr for Expectation {
    type Err = ParseExpectationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "should" => Ok(Self::Should),
            "should not" | "should-not" => Ok(Self::ShouldNot),
            other => Err(ParseExpectationError(other.to_owned())),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Should => f.write_str("should"),
            Self::ShouldNot => f.write_str("should not"),
        }
    }
}

/// The report page and method whose presence is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMarker {
    report_class: String,
    method: String,
}

impl Default for MethodMarker {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_CLASS, DEFAULT_METHOD)
    }
}

impl MethodMarker {
    /// Look for `method` on the report page of `report_class`.
    #[must_use]
    pub fn new(report_class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            report_class: report_class.into(),
            method: method.into(),
        }
    }

    /// Report path relative to the project directory.
    #[must_use]
    pub fn relative_report_path(&self) -> Utf8PathBuf {
        Utf8Path::new(REPORT_DIR).join(format!("{}.html", self.report_class))
    }

    /// Report path inside `project`.
    ///
    /// # Examples
    /// ```
    /// use camino::Utf8Path;
    /// use jacoco_scala_acceptance::report::MethodMarker;
    /// let path = MethodMarker::default().report_path(Utf8Path::new("examples/mixin-project"));
    /// assert_eq!(path, "examples/mixin-project/target/site/jacoco/default/Example.html");
    /// ```
    #[must_use]
    pub fn report_path(&self, project: &Utf8Path) -> Utf8PathBuf {
        project.join(self.relative_report_path())
    }

    /// The literal markup searched for.
    #[must_use]
    pub fn literal(&self) -> String {
        format!(r#"class="el_method">{}()"#, self.method)
    }

    /// The search pattern; the literal with regex metacharacters escaped.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::InvalidMarker`] if the escaped literal does not
    /// compile.
    pub fn pattern(&self) -> Result<Regex, ScenarioError> {
        let escaped = regex::escape(&self.literal());
        Regex::new(&escaped).map_err(|source| ScenarioError::InvalidMarker {
            pattern: escaped,
            source,
        })
    }
}

/// A coverage report page read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    path: Utf8PathBuf,
    contents: String,
}

impl CoverageReport {
    /// Wrap already loaded report text.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Read the report page selected by `marker` from `project`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::ReportNotFound`] when the project or report
    /// does not exist, and [`ScenarioError::ReportUnreadable`] for any other
    /// read failure, including content that is not UTF-8.
    pub fn read(project: &Utf8Path, marker: &MethodMarker) -> Result<Self, ScenarioError> {
        let path = marker.report_path(project);
        let classify = |err: io::Error| {
            if err.kind() == io::ErrorKind::NotFound {
                ScenarioError::ReportNotFound { path: path.clone() }
            } else {
                ScenarioError::ReportUnreadable {
                    path: path.clone(),
                    source: err,
                }
            }
        };
        let dir = Dir::open_ambient_dir(project, ambient_authority()).map_err(&classify)?;
        let contents = dir
            .read_to_string(marker.relative_report_path())
            .map_err(&classify)?;
        tracing::debug!(report = %path, bytes = contents.len(), "read coverage report");
        Ok(Self { path, contents })
    }

    /// Where the report was read from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The raw report text.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Whether `pattern` occurs anywhere in the report.
    #[must_use]
    pub fn contains(&self, pattern: &Regex) -> bool {
        pattern.is_match(&self.contents)
    }

    /// Check the report against `expectation` for `marker`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::PatternMismatch`] when the report contradicts
    /// the expectation.
    pub fn check(
        &self,
        expectation: Expectation,
        marker: &MethodMarker,
    ) -> Result<(), ScenarioError> {
        let pattern = marker.pattern()?;
        let found = self.contains(&pattern);
        if expectation.is_satisfied_by(found) {
            tracing::info!(report = %self.path, %expectation, found, "coverage report matches");
            Ok(())
        } else {
            Err(ScenarioError::PatternMismatch {
                expectation,
                pattern: marker.literal(),
                path: self.path.clone(),
            })
        }
    }
}

/// Verify that the scenario project's report meets `expectation`.
///
/// # Errors
///
/// Returns [`ScenarioError::MissingContext`] without a project, the errors of
/// [`CoverageReport::read`] when the report cannot be read, and
/// [`ScenarioError::PatternMismatch`] when the content contradicts the
/// expectation.
pub fn verify_coverage_presence(
    context: &ScenarioContext,
    expectation: Expectation,
    marker: &MethodMarker,
) -> Result<(), ScenarioError> {
    let project = context.project()?;
    CoverageReport::read(project, marker)?.check(expectation, marker)
}
