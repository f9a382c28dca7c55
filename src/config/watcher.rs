//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// How long to wait for a burst of file events to finish before reloading.
const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file.
    ///
    /// File events are collected on notify's thread and reloads run on a
    /// tokio task, so this must be called inside a tokio runtime. The
    /// returned watcher must be kept alive for events to keep flowing; the
    /// reload task ends when it is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<()>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        let path = self.path.clone();
        let update_tx = self.update_tx;
        tokio::spawn(async move {
            while event_rx.recv().await.is_some() {
                // A single save can truncate and write in separate events.
                tokio::time::sleep(SETTLE_DELAY).await;
                while event_rx.try_recv().is_ok() {}

                tracing::info!(path = ?path, "Config file change detected, reloading");
                match load_config(&path) {
                    Ok(new_config) => {
                        tracing::info!(rules = new_config.rules.len(), "Config reloaded");
                        if update_tx.send(new_config).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to reload config, keeping current rules");
                    }
                }
            }
        });

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}
