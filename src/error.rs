//! Error types raised while running acceptance scenarios.
//!
//! Build failures are deliberately absent: a build that fails or never starts
//! only shows up later, as a missing or stale coverage report.

// Scoped suppression for version-dependent lint false positives from the
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::context::ContextField;
use crate::report::Expectation;
use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// Errors that fail a scenario step.
#[derive(Debug, Error, Diagnostic)]
pub enum ScenarioError {
    /// A step needed a context value that no earlier step provided.
    #[error("no {field} has been given for this scenario")]
    #[diagnostic(
        code(jacoco_scala::scenario::missing_context),
        help(
            "set the local repository and the scala project before building or checking the report"
        )
    )]
    MissingContext {
        /// The context value that was missing.
        field: ContextField,
    },

    /// The build goal text could not be split into words.
    #[error("build goal {goal:?} is empty or has unbalanced quotes")]
    #[diagnostic(code(jacoco_scala::build::invalid_goal))]
    InvalidGoal {
        /// The goal text as written in the step.
        goal: String,
    },

    /// A property override was not written as `KEY=VALUE`.
    #[error("property {property:?} is not of the form KEY=VALUE")]
    #[diagnostic(code(jacoco_scala::build::invalid_property))]
    InvalidProperty {
        /// The rejected property text.
        property: String,
    },

    /// The coverage report does not exist.
    #[error("coverage report not found at {path}")]
    #[diagnostic(
        code(jacoco_scala::report::not_found),
        help("the build probably failed or never ran; rerun with --verbose to see its output")
    )]
    ReportNotFound {
        /// Where the report was expected.
        path: Utf8PathBuf,
    },

    /// The coverage report exists but could not be read as UTF-8 text.
    #[error("coverage report at {path} could not be read")]
    #[diagnostic(code(jacoco_scala::report::unreadable))]
    ReportUnreadable {
        /// Path of the unreadable report.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The marker pattern could not be compiled.
    #[error("method marker {pattern:?} is not a valid pattern")]
    #[diagnostic(code(jacoco_scala::report::invalid_marker))]
    InvalidMarker {
        /// The pattern that failed to compile.
        pattern: String,
        /// Underlying regex failure.
        #[source]
        source: regex::Error,
    },

    /// The report content contradicted the expectation.
    #[error("expected {pattern:?} {} in {path}", .expectation.describe())]
    #[diagnostic(
        code(jacoco_scala::report::pattern_mismatch),
        help("check the plugin's filters configuration in the project's pom.xml")
    )]
    PatternMismatch {
        /// What the step expected.
        expectation: Expectation,
        /// The searched pattern.
        pattern: String,
        /// The report that was searched.
        path: Utf8PathBuf,
    },

    /// The step text matches none of the known phrases.
    #[error("no step matches {step:?}")]
    #[diagnostic(
        code(jacoco_scala::steps::unknown),
        help("supported phrases: a local repository '<path>'; a scala project '<path>' with|without mixins filtered; I <goal> it; mixed-in trait methods should|should not be in the coverage report")
    )]
    UnknownStep {
        /// The unmatched step text.
        step: String,
    },
}
