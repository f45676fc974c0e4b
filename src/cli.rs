//! Command line interface definition using clap.
//!
//! `check` runs a single scenario assembled from flags; `feature` runs every
//! scenario of a feature file.

use crate::build::{BuildTool, Properties, parse_property, resolve_build_program};
use crate::report::{DEFAULT_METHOD, DEFAULT_REPORT_CLASS, Expectation, MethodMarker};
use crate::steps::StepSettings;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

fn parse_property_arg(s: &str) -> Result<(String, String), String> {
    parse_property(s).map_err(|err| err.to_string())
}

/// Acceptance checks for mixed-in Scala trait methods in JaCoCo reports.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging output, including build tool output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Commands {
    /// Build one project and check its coverage report.
    Check(CheckArgs),
    /// Run every scenario in a feature file.
    Feature(FeatureArgs),
}

/// How to invoke the build tool.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct BuildToolArgs {
    /// Build tool executable; defaults to `$JACOCO_SCALA_MVN`, then `mvn`.
    #[arg(long, value_name = "PROGRAM")]
    pub mvn: Option<Utf8PathBuf>,

    /// Kill a build goal that runs longer than this many seconds.
    #[arg(long, value_name = "N")]
    pub timeout_secs: Option<u64>,

    /// Extra build property, repeatable.
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_property_arg)]
    pub properties: Vec<(String, String)>,
}

impl BuildToolArgs {
    /// The configured build tool.
    #[must_use]
    pub fn build_tool(&self) -> BuildTool {
        let program = self.mvn.clone().unwrap_or_else(resolve_build_program);
        BuildTool::new(program).with_timeout(self.timeout_secs.map(Duration::from_secs))
    }

    /// The `-D` overrides as an ordered map; a repeated key keeps its last
    /// value.
    #[must_use]
    pub fn properties(&self) -> Properties {
        self.properties.iter().cloned().collect()
    }
}

/// Which report page and method to look for.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct MarkerArgs {
    /// Class whose report page is inspected.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_REPORT_CLASS)]
    pub report_class: String,

    /// Method whose presence is checked.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_METHOD)]
    pub method: String,
}

impl MarkerArgs {
    /// The selected marker.
    #[must_use]
    pub fn marker(&self) -> MethodMarker {
        MethodMarker::new(self.report_class.as_str(), self.method.as_str())
    }
}

/// Arguments accepted by the `check` command.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct CheckArgs {
    /// Local artefact repository passed as `maven.repo.local`.
    #[arg(long, value_name = "DIR")]
    pub repository: Utf8PathBuf,

    /// Project directory to build.
    #[arg(long, value_name = "DIR")]
    pub project: Utf8PathBuf,

    /// Record that the project filters mixins; informational only.
    #[arg(long)]
    pub mixins_filtered: bool,

    /// Build goal, split like a shell command line.
    #[arg(long, value_name = "GOAL", default_value = "test")]
    pub goal: String,

    /// Whether mixed-in methods should appear in the report.
    #[arg(long, value_name = "should|should-not", default_value = "should")]
    pub expect: Expectation,

    /// Build tool settings.
    #[command(flatten)]
    pub build: BuildToolArgs,

    /// Report marker settings.
    #[command(flatten)]
    pub marker: MarkerArgs,
}

/// Arguments accepted by the `feature` command.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct FeatureArgs {
    /// Feature file to run.
    #[arg(value_name = "FILE")]
    pub file: Utf8PathBuf,

    /// Build tool settings.
    #[command(flatten)]
    pub build: BuildToolArgs,

    /// Report marker settings.
    #[command(flatten)]
    pub marker: MarkerArgs,
}

impl FeatureArgs {
    /// Settings applied to every step.
    #[must_use]
    pub fn step_settings(&self) -> StepSettings {
        StepSettings {
            properties: self.build.properties(),
            marker: self.marker.marker(),
        }
    }
}
