//! Request path rewrite gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │               REWRITE GATEWAY                │
//!     Client Request     │  ┌────────┐   ┌──────────────┐               │
//!     ───────────────────┼─▶│  http  │──▶│ rewrite chain│──┐            │
//!                        │  │ server │   │ (first match)│  │            │
//!                        │  └────────┘   └──────┬───────┘  │            │
//!                        │                      │ redirect │ rewrite /  │
//!     302 Location       │                      ▼          │ passthrough│
//!     ◀──────────────────┼──────────────────────┘          ▼            │
//!                        │                        ┌─────────────────┐   │
//!     Client Response    │                        │   downstream    │───┼──▶ Upstream
//!     ◀──────────────────┼────────────────────────│ (forward/echo)  │◀──┼─── Server
//!                        │                        └─────────────────┘   │
//!                        │  config (+watch) · observability · lifecycle │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use rewrite_gateway::config::{load_config, watcher::ConfigWatcher, GatewayConfig};
use rewrite_gateway::http::HttpServer;
use rewrite_gateway::lifecycle::{signals, Shutdown};
use rewrite_gateway::observability::{logging, metrics};
use rewrite_gateway::rewrite::RewriteChain;

#[derive(Parser)]
#[command(name = "rewrite-gateway")]
#[command(about = "HTTP gateway that rewrites or redirects request paths by pattern", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload rewrite rules when the configuration file changes.
    #[arg(long, requires = "config")]
    watch: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    if cli.check {
        println!("configuration OK: {} rule(s)", config.rules.len());
        return Ok(());
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("rewrite-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let chain = RewriteChain::from_config(&config.rules, &config.redirect)?.into_shared();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rules = config.rules.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    // Keep the watcher alive for the lifetime of the server.
    let (config_updates, _watcher) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        _ => (mpsc::unbounded_channel().1, None),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, chain);
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
