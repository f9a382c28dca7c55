//! Error types for the rewrite engine.

/// A configured pattern could not be turned into a matcher.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// The pattern is not a valid regex after `:name` expansion.
    /// Displays the regex engine's message as-is.
    #[error("{0}")]
    Regex(#[from] regex::Error),

    #[error("duplicate capture name `:{0}`")]
    DuplicateName(String),
}

/// A rule from configuration failed to compile.
#[derive(Debug, thiserror::Error)]
#[error("rule #{index} (`{pattern}`): {source}")]
pub struct RuleError {
    /// Position of the rule in the configured list.
    pub index: usize,
    pub pattern: String,
    #[source]
    pub source: PatternError,
}

/// The expanded target of a matching rule could not be applied.
///
/// Never leaves the rule that produced it: the rule is treated as
/// non-matching for that request.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("rewritten target `{0}` is not an absolute path")]
    RelativeTarget(String),

    #[error("rewritten target is not a valid path and query: {0}")]
    InvalidTarget(#[from] axum::http::uri::InvalidUri),

    #[error("rewritten URI could not be assembled: {0}")]
    InvalidUri(#[from] axum::http::uri::InvalidUriParts),

    #[error("original URI is not a valid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),
}
