//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! handles command execution.

use crate::build::run_build_goal;
use crate::cli::{CheckArgs, Cli, Commands, FeatureArgs};
use crate::context::{MixinFiltering, ScenarioContext};
use crate::feature::{Feature, run_feature, write_summary};
use crate::report::verify_coverage_presence;
use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, Write};
use tracing::info;

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error when a check fails, the feature file cannot be read or
/// parsed, or any feature scenario fails.
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Feature(args) => handle_feature(args),
    }
}

fn run_check(args: &CheckArgs) -> Result<()> {
    let filtering = if args.mixins_filtered {
        MixinFiltering::Filtered
    } else {
        MixinFiltering::Unfiltered
    };
    let mut context = ScenarioContext::new(args.build.build_tool());
    context.set_repository(args.repository.clone());
    context.set_project(args.project.clone(), filtering);

    run_build_goal(&mut context, &args.goal, &args.build.properties())
        .with_context(|| format!("running build goal {:?}", args.goal))?;

    let marker = args.marker.marker();
    verify_coverage_presence(&context, args.expect, &marker).with_context(|| {
        let outcome = context
            .last_outcome()
            .map_or_else(|| "no build ran".to_owned(), ToString::to_string);
        format!("coverage check failed ({outcome})")
    })?;

    info!(project = %args.project, expectation = %args.expect, "coverage check passed");
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "ok: mixed-in methods {} be in the coverage report of {}",
        args.expect, args.project
    )
    .context("write check result")?;
    Ok(())
}

fn handle_feature(args: &FeatureArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("read feature file {}", args.file))?;
    let feature =
        Feature::parse(&text).with_context(|| format!("parse feature file {}", args.file))?;
    let report = run_feature(&feature, &args.build.build_tool(), &args.step_settings());

    let mut stdout = io::stdout().lock();
    write_summary(&mut stdout, &report).context("write feature summary")?;
    if !report.is_success() {
        bail!(
            "{} of {} scenarios failed in {}",
            report.failed(),
            report.scenarios.len(),
            args.file
        );
    }
    Ok(())
}
