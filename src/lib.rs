//! Request path rewrite gateway.
//!
//! Matches each request path against an ordered list of pattern rules and,
//! on the first match, rewrites the request internally or redirects the
//! client, substituting captures from the path into the target.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use rewrite::{RewriteChain, Rule};
