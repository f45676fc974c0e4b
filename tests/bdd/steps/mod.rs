//! Step definition modules for BDD scenarios.
//!
//! ## File-wide lint suppressions
//!
//! The `rstest-bdd` macros generate wrapper code for each step function that
//! triggers Clippy lints the step bodies themselves do not. The generated code
//! cannot be annotated directly, so the suppressions live here.

#![expect(
    clippy::unnecessary_wraps,
    reason = "rstest-bdd macros require Result returns for step functions"
)]
#![expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd step signatures take owned captures"
)]

mod build_tool;
mod scenario;
