//! Path pattern compilation.
//!
//! A pattern is a regular expression with one extra shorthand: a `:name`
//! token captures a single path segment under `name`.
//!
//! ```text
//! /user/:id/:name   →   /user/(?P<id>[^/#?]+)/(?P<name>[^/#?]+)
//! ```
//!
//! A token ends at `/`, `#`, `?`, `(`, `)`, `.` or `\`, so `/file/:stem.json`
//! captures `stem` and keeps the literal `.json` suffix. Everything else in the
//! pattern is handed to the regex engine untouched.
//!
//! Any `:` starts a token, including the one in `(?:...)`, and `$` does not
//! end one: `^/user/:id$` asks for a group named `id$` and fails to compile.
//! Anchor with `/?$` or a trailing literal instead.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::rewrite::error::PatternError;

static NAMED_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":[^/#?()\.\\]+").expect("named token regex is valid"));

/// Rewrite every `:name` token into a named capture group.
pub fn expand_pattern(pattern: &str) -> String {
    NAMED_TOKEN
        .replace_all(pattern, |caps: &Captures<'_>| {
            format!("(?P<{}>[^/#?]+)", &caps[0][1..])
        })
        .into_owned()
}

/// Compile a pattern into a matcher.
///
/// Duplicate `:name` tokens are rejected before the regex engine sees them.
/// Any other failure is the engine's own error.
pub fn compile(pattern: &str) -> Result<Regex, PatternError> {
    let mut seen = HashSet::new();
    for token in NAMED_TOKEN.find_iter(pattern) {
        let name = &token.as_str()[1..];
        if !seen.insert(name) {
            return Err(PatternError::DuplicateName(name.to_string()));
        }
    }

    Ok(Regex::new(&expand_pattern(pattern))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern_is_plain_regex() {
        let re = compile("/static/app").unwrap();
        assert_eq!(re.as_str(), "/static/app");
        assert!(re.is_match("/static/app"));
        assert!(re.is_match("/assets/static/app.js"));
        assert!(!re.is_match("/static/other"));
        assert_eq!(re.captures_len(), 1);
    }

    #[test]
    fn test_named_segments() {
        let re = compile("/:a/:b").unwrap();
        let caps = re.captures("/foo/bar").unwrap();
        assert_eq!(&caps["a"], "foo");
        assert_eq!(&caps["b"], "bar");

        let names: Vec<_> = re.capture_names().flatten().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_token_stops_at_delimiters() {
        assert_eq!(
            expand_pattern(r"^/file/:stem\.json$"),
            r"^/file/(?P<stem>[^/#?]+)\.json$"
        );
        assert_eq!(
            expand_pattern("/docs/:page.html"),
            "/docs/(?P<page>[^/#?]+).html"
        );

        let re = compile("^/user/:id(/.*)?$").unwrap();
        let caps = re.captures("/user/42/edit").unwrap();
        assert_eq!(&caps["id"], "42");
        assert_eq!(&caps[2], "/edit");
    }

    #[test]
    fn test_capture_excludes_query_and_fragment() {
        let re = compile("/search/:term").unwrap();
        let caps = re.captures("/search/rust?page=2").unwrap();
        assert_eq!(&caps["term"], "rust");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = compile("/:id/x/:id").unwrap_err();
        assert!(matches!(err, PatternError::DuplicateName(ref n) if n == "id"));
    }

    #[test]
    fn test_invalid_regex_surfaces_engine_error() {
        let err = compile("/broken/(unclosed").unwrap_err();
        let engine = Regex::new("/broken/(unclosed").unwrap_err();
        assert!(matches!(err, PatternError::Regex(_)));
        assert_eq!(err.to_string(), engine.to_string());
    }

    #[test]
    fn test_invalid_group_name_is_compile_error() {
        let err = compile("/user/:user-id").unwrap_err();
        assert!(matches!(err, PatternError::Regex(_)));

        let err = compile("^/user/:id$").unwrap_err();
        assert!(matches!(err, PatternError::Regex(_)));
        assert!(compile("^/user/:id/?$").is_ok());
    }
}
