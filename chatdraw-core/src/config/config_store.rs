//! Shared, reloadable configuration value with change notification.
//!
//! `ConfigStore<T>` keeps the current value inside a `watch` channel so
//! readers get a cheap snapshot and long-running tasks can `await` the next
//! reload without polling.

use std::sync::Arc;
use tokio::sync::watch;

/// A shared configuration value that can be replaced at runtime.
pub struct ConfigStore<T> {
    tx: Arc<watch::Sender<T>>,
}

/// Receives notifications when a [`ConfigStore`] is updated.
pub struct ConfigWatcher<T> {
    rx: watch::Receiver<T>,
}

impl<T> ConfigStore<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the stored value and wake every watcher.
    pub fn update(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Subscribe to change notifications.
    ///
    /// The current value counts as seen; only later updates wake the watcher.
    pub fn subscribe(&self) -> ConfigWatcher<T> {
        ConfigWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone> ConfigStore<T> {
    /// Clone of the current value.
    pub fn snapshot(&self) -> T {
        self.tx.borrow().clone()
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone> ConfigWatcher<T> {
    /// Wait until the store is updated and return the new value.
    ///
    /// Returns `Err` once every [`ConfigStore`] handle has been dropped.
    pub async fn changed(&mut self) -> Result<T, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_wakes_watcher() {
        let store = ConfigStore::new(1u32);
        let mut watcher = store.subscribe();
        assert_eq!(store.snapshot(), 1);

        let clone = store.clone();
        clone.update(2);
        assert_eq!(watcher.changed().await.ok(), Some(2));
        assert_eq!(store.snapshot(), 2);
    }

    #[tokio::test]
    async fn test_watcher_errors_when_store_dropped() {
        let store = ConfigStore::new("a".to_string());
        let mut watcher = store.subscribe();
        drop(store);
        assert!(watcher.changed().await.is_err());
    }
}
