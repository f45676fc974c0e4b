//! Steps mirroring the scenario phrases, run against the fake build tools.

use super::build_tool::workspace_root;
use crate::bdd::fixtures::{RefCellOptionExt, TestWorld, strip_quotes};
use anyhow::{Context, Result, anyhow, bail, ensure};
use camino::{Utf8Path, Utf8PathBuf};
use jacoco_scala_acceptance::build::{BuildOutcome, parse_property, run_build_goal};
use jacoco_scala_acceptance::context::{MixinFiltering, ScenarioContext};
use jacoco_scala_acceptance::report::{Expectation, MethodMarker, verify_coverage_presence};
use jacoco_scala_acceptance::ScenarioError;
use rstest_bdd_macros::{given, then, when};
use test_support::{read_invocation, scala_project};

fn with_context<R>(world: &TestWorld, f: impl FnOnce(&mut ScenarioContext) -> R) -> Result<R> {
    world
        .context
        .with_mut(f)
        .context("no build tool has been installed for this scenario")
}

fn project_dir(world: &TestWorld) -> Result<Utf8PathBuf> {
    with_context(world, |context| context.project().map(Utf8Path::to_path_buf))?
        .map_err(anyhow::Error::from)
}

fn set_project(world: &TestWorld, name: &str, filtering: MixinFiltering) -> Result<()> {
    let root = workspace_root(world)?;
    let project = scala_project(&root, name, filtering)?;
    with_context(world, |context| context.set_project(project, filtering))
}

fn verify(world: &TestWorld, expectation: Expectation) -> Result<Result<(), ScenarioError>> {
    world
        .context
        .with_ref(|context| verify_coverage_presence(context, expectation, &MethodMarker::default()))
        .context("no build tool has been installed for this scenario")
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a local repository '{path}'")]
fn local_repository(world: &TestWorld, path: String) -> Result<()> {
    with_context(world, |context| context.set_repository(path))
}

#[given("a scala project '{name}' with mixins filtered")]
fn filtered_project(world: &TestWorld, name: String) -> Result<()> {
    set_project(world, &name, MixinFiltering::Filtered)
}

#[given("a scala project '{name}' without mixins filtered")]
fn unfiltered_project(world: &TestWorld, name: String) -> Result<()> {
    set_project(world, &name, MixinFiltering::Unfiltered)
}

#[given("the extra build property {property}")]
fn extra_property(world: &TestWorld, property: String) -> Result<()> {
    let (key, value) = parse_property(strip_quotes(&property))?;
    world.properties.borrow_mut().insert(key, value);
    Ok(())
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("I {goal} it")]
fn run_goal(world: &TestWorld, goal: String) -> Result<()> {
    let properties = world.properties.borrow().clone();
    with_context(world, |context| {
        run_build_goal(context, &goal, &properties).map(|_| ())
    })?
    .map_err(anyhow::Error::from)
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("mixed-in trait methods should be in the coverage report")]
fn mixins_reported(world: &TestWorld) -> Result<()> {
    verify(world, Expectation::Should)??;
    Ok(())
}

#[then("mixed-in trait methods should not be in the coverage report")]
fn mixins_omitted(world: &TestWorld) -> Result<()> {
    verify(world, Expectation::ShouldNot)??;
    Ok(())
}

#[then("checking for mixed-in trait methods fails because the report is missing")]
fn report_missing(world: &TestWorld) -> Result<()> {
    match verify(world, Expectation::Should)? {
        Err(ScenarioError::ReportNotFound { .. }) => Ok(()),
        other => bail!("expected a missing report, got {other:?}"),
    }
}

#[then("checking that mixed-in trait methods are absent fails")]
fn absence_check_fails(world: &TestWorld) -> Result<()> {
    match verify(world, Expectation::ShouldNot)? {
        Err(ScenarioError::PatternMismatch { expectation, .. }) => {
            ensure!(expectation == Expectation::ShouldNot, "wrong expectation");
            Ok(())
        }
        other => bail!("expected a pattern mismatch, got {other:?}"),
    }
}

#[then("the build tool received the argument {arg}")]
fn received_argument(world: &TestWorld, arg: String) -> Result<()> {
    let expected = strip_quotes(&arg);
    let invocation = read_invocation(&project_dir(world)?)?;
    ensure!(
        invocation.args.iter().any(|a| a == expected),
        "{expected:?} not among {:?}",
        invocation.args
    );
    Ok(())
}

#[then("the build tool received exactly one repository argument")]
fn single_repository_argument(world: &TestWorld) -> Result<()> {
    let invocation = read_invocation(&project_dir(world)?)?;
    let found = invocation
        .args
        .iter()
        .filter(|a| a.starts_with("-Dmaven.repo.local="))
        .count();
    ensure!(found == 1, "found {found} repository arguments");
    Ok(())
}

#[then("the build tool ran in the project directory")]
fn ran_in_project(world: &TestWorld) -> Result<()> {
    let project = project_dir(world)?.canonicalize_utf8()?;
    let invocation = read_invocation(&project)?;
    let cwd = invocation.cwd.canonicalize_utf8()?;
    ensure!(cwd == project, "build ran in {cwd}, expected {project}");
    Ok(())
}

#[then("the harness working directory is unchanged")]
fn cwd_unchanged(world: &TestWorld) -> Result<()> {
    let before = world
        .cwd_before
        .get()
        .ok_or_else(|| anyhow!("workspace was never created"))?;
    let after = std::env::current_dir().context("read harness cwd")?;
    ensure!(before == after, "cwd changed from {before:?} to {after:?}");
    Ok(())
}

#[then("the build outcome is a failure with exit code {code:i32}")]
fn outcome_failed(world: &TestWorld, code: i32) -> Result<()> {
    let status = world
        .context
        .with_ref(|context| match context.last_outcome() {
            Some(BuildOutcome::Exited { status, .. }) => Some(status.code()),
            _ => None,
        })
        .flatten()
        .context("no build tool exit was recorded")?;
    ensure!(status == Some(code), "exit code was {status:?}");
    Ok(())
}

#[then("the build outcome is a timeout")]
fn outcome_timed_out(world: &TestWorld) -> Result<()> {
    let timed_out = world
        .context
        .with_ref(|context| matches!(context.last_outcome(), Some(BuildOutcome::TimedOut { .. })))
        .unwrap_or(false);
    ensure!(timed_out, "build did not time out");
    Ok(())
}

#[then("the build outcome is a launch failure")]
fn outcome_launch_failure(world: &TestWorld) -> Result<()> {
    let failed = world
        .context
        .with_ref(|context| matches!(context.last_outcome(), Some(BuildOutcome::Failed { .. })))
        .unwrap_or(false);
    ensure!(failed, "build tool unexpectedly started");
    Ok(())
}
