//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every rewrite rule so broken patterns fail at load time
//! - Validate value ranges (timeouts > 0, addresses parse, redirect status)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;
use axum::http::StatusCode;

use crate::config::schema::GatewayConfig;
use crate::rewrite::error::RuleError;
use crate::rewrite::rule::Rule;

/// A single semantic problem in a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("upstream.address `{0}` is not a host:port authority")]
    InvalidUpstream(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("redirect.status {0} is not one of 301, 302, 303, 307, 308")]
    InvalidRedirectStatus(u16),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error(transparent)]
    Rule(#[from] RuleError),
}

const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Some(upstream) = &config.upstream {
        let valid = upstream
            .address
            .parse::<Authority>()
            .map(|a| a.port_u16().is_some())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidUpstream(upstream.address.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let status_ok = REDIRECT_STATUSES.contains(&config.redirect.status)
        && StatusCode::from_u16(config.redirect.status).is_ok();
    if !status_ok {
        errors.push(ValidationError::InvalidRedirectStatus(config.redirect.status));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    for (index, rule) in config.rules.iter().enumerate() {
        if let Err(source) = Rule::new(rule.pattern.clone(), rule.to.clone(), rule.redirect) {
            errors.push(ValidationError::Rule(RuleError {
                index,
                pattern: rule.pattern.clone(),
                source,
            }));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RuleConfig, UpstreamConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream = Some(UpstreamConfig {
            address: "no port here".into(),
        });
        config.redirect.status = 200;
        config.timeouts.request_secs = 0;
        config.rules = vec![
            RuleConfig::new("/good/:id", "/x/:id", false),
            RuleConfig::new("/:dup/:dup", "/y", false),
            RuleConfig::new("/bad[", "/z", true),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(matches!(errors[0], ValidationError::InvalidBindAddress(_)));
        assert!(matches!(errors[1], ValidationError::InvalidUpstream(_)));
        assert!(matches!(errors[2], ValidationError::InvalidRedirectStatus(200)));
        assert!(matches!(errors[3], ValidationError::ZeroRequestTimeout));
        assert!(matches!(errors[4], ValidationError::Rule(RuleError { index: 1, .. })));
        assert!(matches!(errors[5], ValidationError::Rule(RuleError { index: 2, .. })));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidMetricsAddress(_)));
    }

    #[test]
    fn test_upstream_with_port_is_valid() {
        let mut config = GatewayConfig::default();
        config.upstream = Some(UpstreamConfig {
            address: "backend.internal:3000".into(),
        });
        assert!(validate_config(&config).is_ok());
    }
}
