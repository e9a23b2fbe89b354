//! Shell-style environment variable expansion for at-reference path-specs.
//!
//! Supported forms are `$NAME` and `${NAME}`. Undefined names expand to the
//! empty string. A `$` that does not start a valid name is kept literally,
//! while an unterminated `${` is dropped.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    // braced | unterminated brace | one-char special | alphanumeric run
    Regex::new(r"\$(?:\{([^}]*)\}|\{|([*#$@!?0-9-])|([A-Za-z0-9_]+))")
        .expect("variable pattern is valid")
});

/// Expands `$NAME` and `${NAME}` using the process environment.
#[must_use]
pub fn expand_env(input: &str) -> Cow<'_, str> {
    expand_env_with(input, |name| std::env::var(name).ok())
}

/// Expands variables in `input`, looking names up through `lookup`.
///
/// Expansion happens once: text produced by `lookup` is never re-scanned.
pub fn expand_env_with<F>(input: &str, lookup: F) -> Cow<'_, str>
where
    F: Fn(&str) -> Option<String>,
{
    VARIABLE.replace_all(input, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str());
        if name.is_empty() {
            return String::new();
        }
        lookup(name).unwrap_or_default()
    })
}
