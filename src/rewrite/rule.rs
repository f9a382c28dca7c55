//! A single rewrite rule: pattern, target template and redirect flag.

use std::str::FromStr;

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::uri::PathAndQuery;
use axum::http::Uri;
use regex::Regex;

use crate::rewrite::error::{PatternError, RewriteError};
use crate::rewrite::request::RewriteRequest;
use crate::rewrite::{path, pattern, template};

/// Header carrying the request URI as it was before the rewrite.
pub const ORIGINAL_URI_HEADER: HeaderName = HeaderName::from_static("x-rewrite-original-uri");

/// A compiled rewrite rule.
///
/// Immutable after construction and shared read-only between requests.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    matcher: Regex,
    to: String,
    redirect: bool,
}

impl Rule {
    /// Compile a rule. Fails if the pattern is not a valid matcher.
    pub fn new(
        pattern: impl Into<String>,
        to: impl Into<String>,
        redirect: bool,
    ) -> Result<Self, PatternError> {
        let pattern = pattern.into();
        let matcher = pattern::compile(&pattern)?;
        Ok(Self {
            pattern,
            matcher,
            to: to.into(),
            redirect,
        })
    }

    /// The pattern as configured, before `:name` expansion.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect
    }

    /// Expand the target template against a request URI.
    pub fn replace(&self, request_uri: &str) -> String {
        template::expand(&self.matcher, request_uri, &self.to)
    }

    /// Rewrite `req` in place if its decoded path matches.
    ///
    /// Returns false and leaves `req` untouched when the path does not match
    /// or the expanded target cannot be applied.
    pub fn rewrite<R: RewriteRequest>(&self, req: &mut R) -> bool {
        if !self.matcher.is_match(&req.path()) {
            return false;
        }

        match self.prepare(req) {
            Ok((uri, original)) => {
                req.headers_mut().insert(ORIGINAL_URI_HEADER, original);
                req.set_uri(uri);
                true
            }
            Err(e) => {
                tracing::debug!(
                    rule = %self.pattern,
                    uri = %req.request_uri(),
                    error = %e,
                    "Rewrite target rejected"
                );
                false
            }
        }
    }

    /// Build the rewritten URI and the diagnostic header value without
    /// touching the request.
    fn prepare<R: RewriteRequest>(&self, req: &R) -> Result<(Uri, HeaderValue), RewriteError> {
        let original = req.request_uri();
        let target = normalize(&self.replace(original))?;

        let path_and_query = match (target.query(), req.query()) {
            (Some(query), _) if !query.is_empty() => format!("{}?{}", target.path(), query),
            (_, Some(existing)) => format!("{}?{}", target.path(), existing),
            _ => target.path().to_string(),
        };

        let mut parts = req.uri().clone().into_parts();
        parts.path_and_query = Some(PathAndQuery::from_str(&path_and_query)?);
        let uri = Uri::from_parts(parts)?;

        let original = HeaderValue::from_bytes(original.as_bytes())?;
        Ok((uri, original))
    }
}

/// Clean the path part of an expanded target and parse the result.
///
/// The query (and any fragment) is kept exactly as expanded. Targets must be
/// origin-form paths; scheme-qualified targets such as `http://host/x` are
/// not supported and are rejected as relative.
fn normalize(target: &str) -> Result<PathAndQuery, RewriteError> {
    let split = target.find(['?', '#']).unwrap_or(target.len());
    let (raw_path, rest) = target.split_at(split);

    let cleaned = path::clean(raw_path);
    if !cleaned.starts_with('/') {
        return Err(RewriteError::RelativeTarget(target.to_string()));
    }

    Ok(PathAndQuery::from_str(&format!("{}{}", cleaned, rest))?)
}
