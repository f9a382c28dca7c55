//! Ordered rule evaluation.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::StatusCode;

use crate::config::schema::{RedirectConfig, RuleConfig};
use crate::rewrite::error::RuleError;
use crate::rewrite::request::RewriteRequest;
use crate::rewrite::rule::Rule;

/// The live chain, swapped as a whole on config reload.
///
/// Each request loads one snapshot and evaluates only that.
pub type SharedChain = Arc<ArcSwap<RewriteChain>>;

/// What a chain did to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// No rule matched; the request is unchanged.
    Passthrough,
    /// Rule `rule` rewrote the request internally.
    Rewritten { rule: usize },
    /// Rule `rule` rewrote the request and the client must be redirected.
    Redirect {
        rule: usize,
        status: StatusCode,
        location: String,
    },
}

/// Ordered rules. Insertion order is evaluation order.
#[derive(Debug, Clone)]
pub struct RewriteChain {
    rules: Vec<Rule>,
    redirect_status: StatusCode,
    redirect_query: bool,
}

impl RewriteChain {
    /// Create a chain that redirects with 302 and path-only locations.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            redirect_status: StatusCode::FOUND,
            redirect_query: false,
        }
    }

    /// Compile every configured rule. Fails on the first rule that does not
    /// compile; nothing is registered in that case.
    pub fn from_config(rules: &[RuleConfig], redirect: &RedirectConfig) -> Result<Self, RuleError> {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                Rule::new(rule.pattern.clone(), rule.to.clone(), rule.redirect).map_err(|source| {
                    RuleError {
                        index,
                        pattern: rule.pattern.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let status = StatusCode::from_u16(redirect.status)
            .ok()
            .filter(|s| s.is_redirection())
            .unwrap_or(StatusCode::FOUND);

        Ok(Self::new(rules)
            .with_redirect_status(status)
            .with_redirect_query(redirect.include_query))
    }

    pub fn with_redirect_status(mut self, status: StatusCode) -> Self {
        self.redirect_status = status;
        self
    }

    /// Carry the rewritten query in redirect locations.
    pub fn with_redirect_query(mut self, include: bool) -> Self {
        self.redirect_query = include;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply the first rule that rewrites `req`.
    pub fn apply<R: RewriteRequest>(&self, req: &mut R) -> RewriteOutcome {
        let Some(index) = self.rules.iter().position(|rule| rule.rewrite(&mut *req)) else {
            return RewriteOutcome::Passthrough;
        };

        if !self.rules[index].is_redirect() {
            return RewriteOutcome::Rewritten { rule: index };
        }

        let location = match req.query() {
            Some(query) if self.redirect_query => format!("{}?{}", req.raw_path(), query),
            _ => req.raw_path().to_string(),
        };

        RewriteOutcome::Redirect {
            rule: index,
            status: self.redirect_status,
            location,
        }
    }

    /// Wrap the chain for sharing between requests and reloads.
    pub fn into_shared(self) -> SharedChain {
        Arc::new(ArcSwap::from_pointee(self))
    }
}

impl Default for RewriteChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
