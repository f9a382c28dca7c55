//! Rewrite middleware.
//! Applies the rewrite chain before the request reaches the downstream handler.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdExt;
use crate::observability::metrics;
use crate::rewrite::{RewriteOutcome, SharedChain};

pub async fn rewrite_middleware(
    State(chain): State<SharedChain>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let chain = chain.load_full();
    let original = req.uri().clone();

    match chain.apply(&mut req) {
        RewriteOutcome::Passthrough => {
            metrics::record_outcome("passthrough");
            next.run(req).await
        }
        RewriteOutcome::Rewritten { rule } => {
            let pattern = chain.rules()[rule].pattern();
            tracing::debug!(
                request_id = req.request_id().unwrap_or("unknown"),
                rule = %pattern,
                from = %original,
                to = %req.uri(),
                "Request rewritten"
            );
            metrics::record_outcome("rewritten");
            metrics::record_rule_hit(pattern);
            next.run(req).await
        }
        RewriteOutcome::Redirect {
            rule,
            status,
            location,
        } => {
            let pattern = chain.rules()[rule].pattern();
            tracing::debug!(
                request_id = req.request_id().unwrap_or("unknown"),
                rule = %pattern,
                from = %original,
                location = %location,
                status = status.as_u16(),
                "Request redirected"
            );
            metrics::record_outcome("redirect");
            metrics::record_rule_hit(pattern);
            (status, [(header::LOCATION, location)]).into_response()
        }
    }
}
