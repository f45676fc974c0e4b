//! Fixture module for BDD scenarios.
//!
//! `TestWorld` holds the state of one scenario. Non-Clone types use
//! `RefCell<Option<T>>` directly, while Clone types use `Slot<T>`.

// The `#[fixture]` macro generates types that cannot have doc comments attached
#![allow(
    missing_docs,
    reason = "Generated fixture types cannot have doc comments attached"
)]

use camino::Utf8PathBuf;
use jacoco_scala_acceptance::ScenarioContext;
use jacoco_scala_acceptance::build::Properties;
use rstest::fixture;
use rstest_bdd::Slot;
use std::cell::RefCell;
use std::path::PathBuf;
use tempfile::TempDir;

/// State for a single scenario.
#[derive(Default)]
pub struct TestWorld {
    /// Temporary workspace holding the fake build tool and projects.
    pub workspace: RefCell<Option<TempDir>>,
    /// UTF-8 path of the workspace.
    pub root: Slot<Utf8PathBuf>,
    /// Harness working directory when the workspace was created.
    pub cwd_before: Slot<PathBuf>,
    /// Context driven by the scenario steps (non-Clone).
    pub context: RefCell<Option<ScenarioContext>>,
    /// Extra properties for build steps.
    pub properties: RefCell<Properties>,
}

/// Fixture providing a fresh `TestWorld` for each scenario.
#[fixture]
pub fn world() -> TestWorld {
    TestWorld::default()
}

/// Helper trait extensions for `RefCell<Option<T>>`.
pub trait RefCellOptionExt<T> {
    /// Set the value inside the `RefCell`.
    fn set_value(&self, value: T);
    /// Borrow the inner value immutably and apply a function.
    fn with_ref<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R>;
    /// Borrow the inner value mutably and apply a function.
    fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R>;
}

impl<T> RefCellOptionExt<T> for RefCell<Option<T>> {
    fn set_value(&self, value: T) {
        *self.borrow_mut() = Some(value);
    }

    fn with_ref<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.borrow().as_ref().map(f)
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.borrow_mut().as_mut().map(f)
    }
}

/// Strip surrounding double quotes from a step parameter.
///
/// rstest-bdd captures quoted strings including the quotes.
#[must_use]
pub fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|stripped| stripped.strip_suffix('"'))
        .unwrap_or(s)
}
