//! The scenario phrase surface.
//!
//! Each scenario line maps onto one of the four context operations:
//!
//! | Phrase | Operation |
//! |---|---|
//! | `a local repository '<path>'` | [`ScenarioContext::set_repository`] |
//! | `a scala project '<path>' with\|without mixins filtered` | [`ScenarioContext::set_project`] |
//! | `I <goal> it` | [`run_build_goal`] |
//! | `mixed-in trait methods should [not] be in the coverage report` | [`verify_coverage_presence`] |
//!
//! A leading `Given`, `When`, `Then`, `And` or `But` keyword, or a `*`
//! bullet, is ignored. Quoted paths run to the last quote, so they may
//! contain apostrophes.

use crate::build::{Properties, run_build_goal};
use crate::context::{MixinFiltering, ScenarioContext};
use crate::error::ScenarioError;
use crate::report::{Expectation, MethodMarker, verify_coverage_presence};
use camino::Utf8PathBuf;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Words that may open a step line.
pub(crate) const KEYWORDS: [&str; 6] = ["Given", "When", "Then", "And", "But", "*"];

#[expect(
    clippy::expect_used,
    reason = "step patterns are fixed literals covered by unit tests"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("step pattern compiles")
}

static REPOSITORY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^a local repository '(?P<path>.*)'$"));
static PROJECT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^a scala project '(?P<path>.*)' (?P<filtering>with|without) mixins filtered$")
});
static EXPECTATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^mixed-in trait methods (?P<expectation>should|should not) be in the coverage report$")
});
static GOAL: LazyLock<Regex> = LazyLock::new(|| compile(r"^I (?P<goal>.+) it$"));

/// A parsed scenario step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Set the local artefact repository.
    LocalRepository(Utf8PathBuf),
    /// Set the project under test.
    ScalaProject {
        /// Project directory.
        path: Utf8PathBuf,
        /// The filtering phrase from the step.
        filtering: MixinFiltering,
    },
    /// Run a build goal in the project.
    BuildGoal(String),
    /// Check the coverage report for the mixed-in method.
    CoverageExpectation(Expectation),
}

/// Settings shared by every step of a run.
#[derive(Debug, Clone, Default)]
pub struct StepSettings {
    /// Extra `-D` properties for build steps.
    pub properties: Properties,
    /// Method looked for by verification steps.
    pub marker: MethodMarker,
}

fn named<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str())
}

fn strip_keyword(line: &str) -> &str {
    let trimmed = line.trim();
    KEYWORDS
        .iter()
        .find_map(|keyword| {
            trimmed
                .strip_prefix(*keyword)
                .filter(|rest| rest.starts_with(char::is_whitespace))
        })
        .map_or(trimmed, str::trim_start)
}

impl Step {
    /// Parse one scenario line.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::UnknownStep`] when the line matches none of
    /// the phrases.
    ///
    /// # Examples
    /// ```
    /// use jacoco_scala_acceptance::steps::Step;
    /// let step = Step::parse("When I clean verify it").unwrap();
    /// assert_eq!(step, Step::BuildGoal("clean verify".into()));
    /// ```
    pub fn parse(line: &str) -> Result<Self, ScenarioError> {
        let text = strip_keyword(line);
        if let Some(caps) = REPOSITORY.captures(text) {
            return Ok(Self::LocalRepository(named(&caps, "path").into()));
        }
        if let Some(caps) = PROJECT.captures(text) {
            let filtering = if named(&caps, "filtering") == "with" {
                MixinFiltering::Filtered
            } else {
                MixinFiltering::Unfiltered
            };
            return Ok(Self::ScalaProject {
                path: named(&caps, "path").into(),
                filtering,
            });
        }
        if let Some(caps) = EXPECTATION.captures(text) {
            let expectation = if named(&caps, "expectation") == "should" {
                Expectation::Should
            } else {
                Expectation::ShouldNot
            };
            return Ok(Self::CoverageExpectation(expectation));
        }
        if let Some(caps) = GOAL.captures(text) {
            return Ok(Self::BuildGoal(named(&caps, "goal").to_owned()));
        }
        Err(ScenarioError::UnknownStep {
            step: text.to_owned(),
        })
    }

    /// Apply the step to `context`.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`run_build_goal`] and
    /// [`verify_coverage_presence`].
    pub fn apply(
        &self,
        context: &mut ScenarioContext,
        settings: &StepSettings,
    ) -> Result<(), ScenarioError> {
        match self {
            Self::LocalRepository(path) => context.set_repository(path.clone()),
            Self::ScalaProject { path, filtering } => context.set_project(path.clone(), *filtering),
            Self::BuildGoal(goal) => {
                run_build_goal(context, goal, &settings.properties)?;
            }
            Self::CoverageExpectation(expectation) => {
                verify_coverage_presence(context, *expectation, &settings.marker)?;
            }
        }
        Ok(())
    }
}
