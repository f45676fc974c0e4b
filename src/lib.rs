//! Acceptance harness for mixed-in Scala trait methods in coverage reports.
//!
//! A scenario names a local artefact repository and a sample project, runs a
//! build goal in the project, and then checks whether the JaCoCo HTML report
//! lists the mixed-in method `thisIsMixedIn()`. The [`steps`] module maps the
//! scenario phrases onto these operations and [`feature`] runs whole feature
//! files built from them.

pub mod build;
pub mod cli;
pub mod context;
pub mod error;
pub mod feature;
pub mod report;
pub mod runner;
pub mod steps;

pub use context::ScenarioContext;
pub use error::ScenarioError;
