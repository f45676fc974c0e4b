//! Per-scenario state shared by the steps of one scenario.
//!
//! A fresh [`ScenarioContext`] is created for every scenario and passed by
//! reference into each step. Nothing here is global, so scenarios running in
//! parallel only interfere if they point at the same project directory.

use crate::build::{BuildOutcome, BuildTool};
use crate::error::ScenarioError;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How the scenario text describes the project's mixin filtering.
///
/// The phrase documents the sample project; the harness records it for
/// diagnostics and never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixinFiltering {
    /// "with mixins filtered".
    Filtered,
    /// "without mixins filtered".
    Unfiltered,
}

/// Error returned when a filtering phrase is neither `with` nor `without`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected 'with' or 'without', got {0:?}")]
pub struct ParseFilteringError(String);

impl FromStr for MixinFiltering {
    type Err = ParseFilteringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "with" => Ok(Self::Filtered),
            "without" => Ok(Self::Unfiltered),
            other => Err(ParseFilteringError(other.to_owned())),
        }
    }
}

impl fmt::Display for MixinFiltering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filtered => f.write_str("with mixins filtered"),
            Self::Unfiltered => f.write_str("without mixins filtered"),
        }
    }
}

/// Names the context values a step may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextField {
    /// The local artefact repository.
    Repository,
    /// The sample project under test.
    Project,
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repository => f.write_str("local repository"),
            Self::Project => f.write_str("scala project"),
        }
    }
}

/// Mutable state for a single scenario.
#[derive(Debug, Default)]
pub struct ScenarioContext {
    repository: Option<Utf8PathBuf>,
    project: Option<Utf8PathBuf>,
    mixin_filtering: Option<MixinFiltering>,
    build_tool: BuildTool,
    last_outcome: Option<BuildOutcome>,
}

impl ScenarioContext {
    /// Create an empty context that runs `build_tool` for build steps.
    #[must_use]
    pub fn new(build_tool: BuildTool) -> Self {
        Self {
            build_tool,
            ..Self::default()
        }
    }

    /// Store the local repository path. The path is not validated.
    pub fn set_repository(&mut self, repository: impl Into<Utf8PathBuf>) {
        let path = repository.into();
        tracing::debug!(repository = %path, "scenario repository set");
        self.repository = Some(path);
    }

    /// Store the project path together with its filtering phrase.
    pub fn set_project(&mut self, project: impl Into<Utf8PathBuf>, filtering: MixinFiltering) {
        let path = project.into();
        tracing::debug!(project = %path, %filtering, "scenario project set");
        self.project = Some(path);
        self.mixin_filtering = Some(filtering);
    }

    /// The local repository path.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::MissingContext`] when no repository was set.
    pub fn repository(&self) -> Result<&Utf8Path, ScenarioError> {
        self.repository
            .as_deref()
            .ok_or(ScenarioError::MissingContext {
                field: ContextField::Repository,
            })
    }

    /// The project path.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::MissingContext`] when no project was set.
    pub fn project(&self) -> Result<&Utf8Path, ScenarioError> {
        self.project.as_deref().ok_or(ScenarioError::MissingContext {
            field: ContextField::Project,
        })
    }

    /// The filtering phrase recorded with the project, if any.
    #[must_use]
    pub const fn mixin_filtering(&self) -> Option<MixinFiltering> {
        self.mixin_filtering
    }

    /// The build tool used by build steps.
    #[must_use]
    pub const fn build_tool(&self) -> &BuildTool {
        &self.build_tool
    }

    /// Outcome of the most recent build step, if one ran.
    #[must_use]
    pub const fn last_outcome(&self) -> Option<&BuildOutcome> {
        self.last_outcome.as_ref()
    }

    pub(crate) fn record_outcome(&mut self, outcome: BuildOutcome) -> &BuildOutcome {
        self.last_outcome.insert(outcome)
    }
}
