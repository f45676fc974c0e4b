//! Steps that install a build tool into the scenario workspace.

use crate::bdd::fixtures::{RefCellOptionExt, TestWorld};
use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use jacoco_scala_acceptance::ScenarioContext;
use jacoco_scala_acceptance::build::BuildTool;
use rstest_bdd_macros::given;
use std::time::Duration;
use test_support::{FakeMvn, utf8_temp_dir};

/// Create the scenario workspace on first use and return its root.
pub(super) fn workspace_root(world: &TestWorld) -> Result<Utf8PathBuf> {
    if let Some(root) = world.root.get() {
        return Ok(root);
    }
    let cwd = std::env::current_dir().context("read harness cwd")?;
    let (dir, root) = utf8_temp_dir()?;
    world.workspace.set_value(dir);
    world.root.set(root.clone());
    world.cwd_before.set(cwd);
    Ok(root)
}

fn install(world: &TestWorld, tool: BuildTool) {
    world.context.set_value(ScenarioContext::new(tool));
}

fn install_fake(world: &TestWorld, fake: FakeMvn) -> Result<BuildTool> {
    let root = workspace_root(world)?;
    Ok(BuildTool::new(fake.install(&root)?))
}

#[given("a fake build tool that writes coverage reports")]
fn fake_jacoco_build(world: &TestWorld) -> Result<()> {
    let tool = install_fake(world, FakeMvn::Jacoco)?;
    install(world, tool);
    Ok(())
}

#[given("a fake build tool that exits with {code:i32}")]
fn fake_exit_build(world: &TestWorld, code: i32) -> Result<()> {
    let exit_code =
        u8::try_from(code).map_err(|_| anyhow!("exit code must be between 0 and 255"))?;
    let tool = install_fake(world, FakeMvn::Exit(exit_code))?;
    install(world, tool);
    Ok(())
}

#[given("a fake build tool that hangs, with a timeout of {millis:u32} milliseconds")]
fn fake_hanging_build(world: &TestWorld, millis: u32) -> Result<()> {
    let tool = install_fake(world, FakeMvn::Sleep(30))?
        .with_timeout(Some(Duration::from_millis(u64::from(millis))));
    install(world, tool);
    Ok(())
}

#[given("a build tool that does not exist")]
fn missing_build_tool(world: &TestWorld) -> Result<()> {
    let root = workspace_root(world)?;
    install(world, BuildTool::new(root.join("missing").join("mvn")));
    Ok(())
}
