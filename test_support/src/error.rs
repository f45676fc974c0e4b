//! Error formatting helpers for stable test assertions.

use std::error::Error;

/// Join an error and its sources, outermost first, with `": "`.
///
/// # Examples
///
/// ```
/// use test_support::display_error_chain;
/// let err = std::io::Error::other("pipe closed");
/// assert_eq!(display_error_chain(&err), "pipe closed");
/// ```
pub fn display_error_chain(e: &(dyn Error + 'static)) -> String {
    let mut current: Option<&(dyn Error + 'static)> = Some(e);
    std::iter::from_fn(|| {
        let err = current?;
        current = err.source();
        Some(err.to_string())
    })
    .collect::<Vec<_>>()
    .join(": ")
}
