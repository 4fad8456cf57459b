//! Periodic maintenance: the notification pruner.
//!
//! Constructed once at process start and handed its dependencies
//! explicitly; the returned handle is kept by `main` and aborted on
//! shutdown.

use std::time::Duration;

use chrono::Utc;
use record_store::{NotificationStore, RecordStore};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Pruner cadence and retention.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// How often the pruner runs.
    pub interval: Duration,

    /// How long read notifications are kept.
    pub retention: chrono::Duration,
}

/// Spawns the notification pruner task.
///
/// Every `interval` it deletes read notifications older than `retention`.
/// Errors are logged and the loop keeps running.
pub fn spawn_notification_pruner<S: RecordStore>(
    store: S,
    config: MaintenanceConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - config.retention;
            match store.prune_read_before(cutoff).await {
                Ok(0) => {}
                Ok(pruned) => tracing::info!(pruned, "pruned read notifications"),
                Err(err) => tracing::warn!(error = %err, "notification pruning failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use record_store::{InMemoryStore, Notification};

    #[tokio::test]
    async fn pruner_removes_stale_read_notifications() {
        let store = InMemoryStore::new();
        let user = UserId::new();

        let mut stale = Notification::order(user, "stale");
        stale.read = true;
        stale.created_at = Utc::now() - chrono::Duration::days(60);
        store.insert_notification(stale).await.unwrap();

        let fresh = Notification::order(user, "fresh");
        store.insert_notification(fresh).await.unwrap();

        let handle = spawn_notification_pruner(
            store.clone(),
            MaintenanceConfig {
                interval: Duration::from_millis(20),
                retention: chrono::Duration::days(30),
            },
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(store.notification_count().await, 1);
    }
}
