//! Gherkin-style feature files built from the scenario phrases.
//!
//! Only the subset the acceptance suite needs is understood: an optional
//! `Feature:` title with free-form description lines, one optional
//! `Background:` whose steps run before every scenario, `Scenario:` blocks,
//! `@tags`, `#` comments and blank lines.

use crate::build::BuildTool;
use crate::context::ScenarioContext;
use crate::error::ScenarioError;
use crate::steps::{KEYWORDS, Step, StepSettings};
use miette::Diagnostic;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{info, warn};

/// A step line and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLine {
    /// One-based line number in the feature file.
    pub line: usize,
    /// The step text including its keyword.
    pub text: String,
}

/// A named list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Title after `Scenario:`.
    pub name: String,
    /// Steps in order, background first.
    pub steps: Vec<StepLine>,
}

/// A parsed feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Title after `Feature:`, empty when absent.
    pub name: String,
    /// Scenarios in file order.
    pub scenarios: Vec<Scenario>,
}

/// Errors raised while reading a feature file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeatureError {
    /// A step appeared before any `Background:` or `Scenario:`.
    #[error("line {line}: step {text:?} is outside any scenario")]
    OrphanStep {
        /// One-based line number.
        line: usize,
        /// The step text.
        text: String,
    },
    /// A line is neither a keyword, a step, a tag nor a comment.
    #[error("line {line}: unexpected {text:?}")]
    UnexpectedLine {
        /// One-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// `Background:` appeared after a scenario or more than once.
    #[error("line {line}: a background must come once, before the first scenario")]
    MisplacedBackground {
        /// One-based line number.
        line: usize,
    },
    /// The file declares no scenarios.
    #[error("feature declares no scenarios")]
    NoScenarios,
}

enum Block {
    Preamble,
    Background,
    Scenario,
}

impl Feature {
    /// Parse feature text.
    ///
    /// # Errors
    ///
    /// Returns a [`FeatureError`] for steps outside a block, stray text after
    /// the first block, a misplaced background or a file without scenarios.
    pub fn parse(text: &str) -> Result<Self, FeatureError> {
        let mut name = String::new();
        let mut background: Vec<StepLine> = Vec::new();
        let mut scenarios: Vec<Scenario> = Vec::new();
        let mut block = Block::Preamble;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('@') {
                continue;
            }
            if let Some(title) = trimmed.strip_prefix("Feature:") {
                title.trim().clone_into(&mut name);
            } else if trimmed.starts_with("Background:") {
                if !matches!(block, Block::Preamble) || !background.is_empty() {
                    return Err(FeatureError::MisplacedBackground { line });
                }
                block = Block::Background;
            } else if let Some(title) = trimmed.strip_prefix("Scenario:") {
                scenarios.push(Scenario {
                    name: title.trim().to_owned(),
                    steps: background.clone(),
                });
                block = Block::Scenario;
            } else if is_step(trimmed) {
                let step = StepLine {
                    line,
                    text: trimmed.to_owned(),
                };
                match block {
                    Block::Preamble => {
                        return Err(FeatureError::OrphanStep {
                            line,
                            text: step.text,
                        });
                    }
                    Block::Background => background.push(step),
                    Block::Scenario => {
                        if let Some(current) = scenarios.last_mut() {
                            current.steps.push(step);
                        }
                    }
                }
            } else if !matches!(block, Block::Preamble) {
                return Err(FeatureError::UnexpectedLine {
                    line,
                    text: trimmed.to_owned(),
                });
            }
        }

        if scenarios.is_empty() {
            return Err(FeatureError::NoScenarios);
        }
        Ok(Self { name, scenarios })
    }
}

fn is_step(line: &str) -> bool {
    KEYWORDS.iter().any(|keyword| {
        line.strip_prefix(keyword)
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    })
}

/// The step that stopped a scenario.
#[derive(Debug)]
pub struct StepFailure {
    /// The failing step.
    pub step: StepLine,
    /// Why it failed.
    pub error: ScenarioError,
}

/// Result of one scenario.
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// Scenario title.
    pub name: String,
    /// The first failing step, if any.
    pub failure: Option<StepFailure>,
}

impl ScenarioOutcome {
    /// Whether every step passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Results of every scenario in a feature.
#[derive(Debug)]
pub struct FeatureReport {
    /// Feature title.
    pub name: String,
    /// One outcome per scenario, in file order.
    pub scenarios: Vec<ScenarioOutcome>,
}

impl FeatureReport {
    /// Number of passing scenarios.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed()).count()
    }

    /// Number of failing scenarios.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }

    /// Whether every scenario passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.scenarios.iter().all(ScenarioOutcome::passed)
    }
}

/// Run every scenario of `feature`, each with a fresh context.
///
/// A scenario stops at its first failing step; later scenarios still run.
#[must_use]
pub fn run_feature(
    feature: &Feature,
    build_tool: &BuildTool,
    settings: &StepSettings,
) -> FeatureReport {
    let scenarios = feature
        .scenarios
        .iter()
        .map(|scenario| run_scenario(scenario, build_tool, settings))
        .collect();
    FeatureReport {
        name: feature.name.clone(),
        scenarios,
    }
}

fn run_scenario(
    scenario: &Scenario,
    build_tool: &BuildTool,
    settings: &StepSettings,
) -> ScenarioOutcome {
    info!(scenario = %scenario.name, "running scenario");
    let mut context = ScenarioContext::new(build_tool.clone());
    let failure = scenario.steps.iter().find_map(|step| {
        let result =
            Step::parse(&step.text).and_then(|parsed| parsed.apply(&mut context, settings));
        result.err().map(|error| {
            warn!(scenario = %scenario.name, line = step.line, %error, "step failed");
            StepFailure {
                step: step.clone(),
                error,
            }
        })
    });
    ScenarioOutcome {
        name: scenario.name.clone(),
        failure,
    }
}

/// Write a human-readable summary of `report`.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_summary(out: &mut impl Write, report: &FeatureReport) -> io::Result<()> {
    if !report.name.is_empty() {
        writeln!(out, "Feature: {}", report.name)?;
    }
    for scenario in &report.scenarios {
        match &scenario.failure {
            None => writeln!(out, "  ok     {}", scenario.name)?,
            Some(failure) => {
                writeln!(out, "  FAILED {}", scenario.name)?;
                writeln!(out, "    line {}: {}", failure.step.line, failure.step.text)?;
                writeln!(out, "    {}", failure.error)?;
                if let Some(help) = failure.error.help() {
                    writeln!(out, "    help: {help}")?;
                }
            }
        }
    }
    let total = report.scenarios.len();
    let noun = if total == 1 { "scenario" } else { "scenarios" };
    writeln!(
        out,
        "{total} {noun}: {} passed, {} failed",
        report.passed(),
        report.failed()
    )
}
