//! Masking of sensitive property values in logged command lines.
//!
//! Maven properties are dotted (`server.password`, `gpg.passphrase`), so a key
//! is sensitive when its final segment names a secret.

use std::borrow::Cow;

const REDACTED: &str = "***REDACTED***";

fn is_sensitive_segment(segment: &str) -> bool {
    const SENSITIVE_SEGMENTS: [&str; 9] = [
        "password",
        "passphrase",
        "token",
        "secret",
        "api_key",
        "apikey",
        "auth",
        "authorization",
        "credentials",
    ];
    SENSITIVE_SEGMENTS
        .iter()
        .any(|candidate| segment.eq_ignore_ascii_case(candidate))
}

/// Return `true` when the property `key` carries a secret.
pub(super) fn is_sensitive_key(key: &str) -> bool {
    key.trim()
        .rsplit(['.', '-'])
        .next()
        .is_some_and(is_sensitive_segment)
}

/// The value to show for `key` in logs.
pub(super) fn redact_value<'a>(key: &str, value: &'a str) -> Cow<'a, str> {
    if is_sensitive_key(key) {
        Cow::Borrowed(REDACTED)
    } else {
        Cow::Borrowed(value)
    }
}

/// The goal word to show in logs. A `-Dkey=value` word has its value masked
/// when `key` is sensitive; any other word is shown as written.
pub(super) fn redact_argument(arg: &str) -> Cow<'_, str> {
    match arg.strip_prefix("-D").and_then(|rest| rest.split_once('=')) {
        Some((key, _)) if is_sensitive_key(key) => Cow::Owned(format!("-D{key}={REDACTED}")),
        _ => Cow::Borrowed(arg),
    }
}
