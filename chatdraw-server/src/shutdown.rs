//! Signal handling for graceful shutdown and config reload.

use crate::config::ConfigLoader;
use chatdraw_core::config::{ChannelList, ConfigStore};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Notify;

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C).
pub async fn shutdown_signal() {
    let sigterm = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = sigterm => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for SIGINT, shutting down");
            } else {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
        }
    }
}

/// Spawns a task that listens for SIGHUP and reloads the configuration.
///
/// The channel list is republished so the chat relay can join and part
/// live. Returns a Notify that stops the task.
pub fn spawn_config_reload_handler(
    config_loader: Arc<ConfigLoader>,
    channel_store: ConfigStore<ChannelList>,
) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(sighup) => sighup,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler, reload disabled");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded_config) => {
                            apply_channel_list(&channel_store, loaded_config.channels);
                            tracing::info!(
                                "Configuration reloaded; sections other than twitch.channels apply on restart"
                            );
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload configuration: {}", e);
                        }
                    }
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }
            }
        }
    });

    shutdown_notify
}

/// Publish `channels` if it differs from the current list.
///
/// Returns whether the store was updated.
fn apply_channel_list(store: &ConfigStore<ChannelList>, channels: ChannelList) -> bool {
    if store.snapshot() == channels {
        tracing::debug!("Channel list unchanged");
        return false;
    }
    tracing::info!(channels = channels.len(), "Publishing new channel list");
    store.update(channels);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_channel_list_only_publishes_changes() {
        let store = ConfigStore::new(ChannelList::from_raw(["a", "b"]));
        let mut watcher = store.subscribe();

        assert!(!apply_channel_list(&store, ChannelList::from_raw(["#A", "b"])));
        assert!(apply_channel_list(&store, ChannelList::from_raw(["b", "c"])));

        let published = watcher.changed().await.unwrap();
        assert_eq!(published, ChannelList::from_raw(["b", "c"]));
    }
}
