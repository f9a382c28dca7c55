//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the downstream handler
//! - Wire up middleware (rewrite, timeout, request ID, tracing)
//! - Bind server to listener
//! - Swap in recompiled rewrite rules on config updates
//! - Forward rewritten requests to the upstream, or echo them back

use axum::{
    body::Body,
    extract::State,
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{Request, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::middleware::rewrite_middleware;
use crate::http::request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::rewrite::{RewriteChain, SharedChain, ORIGINAL_URI_HEADER};

/// Application state injected into the downstream handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Option<Authority>,
}

/// Body returned by the echo handler when no upstream is configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EchoResponse {
    pub method: String,
    pub uri: String,
    pub original_uri: Option<String>,
    pub request_id: Option<String>,
}

/// HTTP server for the rewrite gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    chain: SharedChain,
}

impl HttpServer {
    /// Create a new HTTP server serving `chain` with the given configuration.
    pub fn new(config: GatewayConfig, chain: SharedChain) -> Self {
        let upstream = config.upstream.as_ref().and_then(|u| {
            let authority = u.address.parse::<Authority>();
            if authority.is_err() {
                tracing::warn!(address = %u.address, "Invalid upstream address, echoing requests");
            }
            authority.ok()
        });

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState { client, upstream };

        let router = Self::build_router(&config, state, chain.clone());
        Self {
            router,
            config,
            chain,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, chain: SharedChain) -> Router {
        Router::new()
            .route("/{*path}", any(downstream_handler))
            .route("/", any(downstream_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(chain, rewrite_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configs arriving on `config_updates` replace the rewrite rules and
    /// redirect settings; a config whose rules fail to compile is rejected
    /// and the running rules stay in place.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rules = self.chain.load().len(),
            upstream = ?self.config.upstream.as_ref().map(|u| &u.address),
            "HTTP server starting"
        );

        let chain = self.chain.clone();
        tokio::spawn(async move {
            while let Some(update) = config_updates.recv().await {
                match RewriteChain::from_config(&update.rules, &update.redirect) {
                    Ok(new_chain) => {
                        tracing::info!(rules = new_chain.len(), "Rewrite rules reloaded");
                        chain.store(Arc::new(new_chain));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected rule update, keeping current rules");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for driving the server without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Receives every request after the rewrite chain has run.
async fn downstream_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match &state.upstream {
        Some(upstream) => forward(&state.client, upstream, request).await,
        None => echo(request).into_response(),
    }
}

/// Forward the (rewritten) request to the upstream and stream the response back.
async fn forward(
    client: &Client<HttpConnector, Body>,
    upstream: &Authority,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Could not build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    tracing::debug!(request_id = %request_id, uri = %parts.uri, "Forwarding request");

    match client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_upstream(response.status().as_u16(), start_time);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream(StatusCode::BAD_GATEWAY.as_u16(), start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Describe the request as the downstream sees it.
fn echo(request: Request<Body>) -> Json<EchoResponse> {
    let original_uri = request
        .headers()
        .get(ORIGINAL_URI_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Json(EchoResponse {
        method: request.method().to_string(),
        uri: request.uri().to_string(),
        original_uri,
        request_id: request.request_id().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use tower::ServiceExt;

    fn server(rules: Vec<RuleConfig>) -> HttpServer {
        let mut config = GatewayConfig::default();
        config.rules = rules;
        let chain = RewriteChain::from_config(&config.rules, &config.redirect)
            .unwrap()
            .into_shared();
        HttpServer::new(config, chain)
    }

    async fn echo_of(response: Response) -> EchoResponse {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_echo_reports_rewrite_and_request_id() {
        let server = server(vec![RuleConfig::new("/user/:id", "/profile/:id", false)]);

        let request = Request::builder()
            .method("POST")
            .uri("/user/42")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let header_id = response
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        assert!(header_id.is_some());

        let echo = echo_of(response).await;
        assert_eq!(echo.method, "POST");
        assert_eq!(echo.uri, "/profile/42");
        assert_eq!(echo.original_uri.as_deref(), Some("/user/42"));
        assert_eq!(echo.request_id, header_id);
    }

    #[tokio::test]
    async fn test_client_request_id_is_kept() {
        let server = server(Vec::new());

        let request = Request::builder()
            .uri("/")
            .header("x-request-id", "client-chosen")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.headers()[X_REQUEST_ID], "client-chosen");
        let echo = echo_of(response).await;
        assert_eq!(echo.uri, "/");
        assert_eq!(echo.original_uri, None);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let mut config = GatewayConfig::default();
        config.upstream = Some(crate::config::UpstreamConfig {
            address: "127.0.0.1:1".into(),
        });
        let server = HttpServer::new(config, RewriteChain::default().into_shared());

        let request = Request::builder().uri("/x").body(Body::empty()).unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
