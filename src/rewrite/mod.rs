//! Request path rewrite engine.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, query, headers)
//!     → chain.rs (rules in configured order)
//!     → rule.rs (match decoded path against compiled pattern)
//!     → template.rs (expand target: $n / $name, then :name)
//!     → path.rs (clean the rewritten path)
//!     → Return: Passthrough, Rewritten or Redirect
//!
//! Rule compilation (at startup / reload):
//!     RuleConfig[]
//!     → pattern.rs (:name → (?P<name>[^/#?]+), compile regex)
//!     → Freeze as immutable RewriteChain
//! ```
//!
//! # Design Decisions
//! - Rules compiled once, immutable at runtime, shared without locks
//! - First match wins; later rules are never evaluated
//! - A request is only mutated once its new URI is fully built
//! - A target that does not parse makes the rule a non-match, never an error response

pub mod chain;
pub mod error;
pub mod path;
pub mod pattern;
pub mod request;
pub mod rule;
pub mod template;

pub use chain::{RewriteChain, RewriteOutcome, SharedChain};
pub use error::{PatternError, RewriteError, RuleError};
pub use request::RewriteRequest;
pub use rule::{Rule, ORIGINAL_URI_HEADER};
