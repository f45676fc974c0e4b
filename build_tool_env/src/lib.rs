#![forbid(unsafe_code)]

//! Environment constants shared by the acceptance harness, its tests, and
//! the `test_support` helpers.

/// Environment variable naming the build tool executable to run instead of
/// `mvn` from `PATH`.
///
/// # Examples
///
/// ```
/// use build_tool_env::MVN_ENV;
/// assert_eq!(MVN_ENV, "JACOCO_SCALA_MVN");
/// ```
pub const MVN_ENV: &str = "JACOCO_SCALA_MVN";
