use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::ProgressEvent;
use super::sink::NotificationSink;

const USER_CHANNEL_CAPACITY: usize = 100;

/// Distributes progress events to per-user subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    /// user_id -> sender
    user_channels: Arc<RwLock<HashMap<String, broadcast::Sender<ProgressEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            user_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Emits an event to all subscribers of one user
    pub async fn emit_to_user(&self, user_id: &str, event: ProgressEvent) {
        let user_channels = self.user_channels.read().await;

        let Some(sender) = user_channels.get(user_id) else {
            // Nobody has subscribed yet, so nobody can receive it
            debug!(user_id = %user_id, event_type = event.event_type(), "No user channel - event dropped");
            return;
        };

        match sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    user_id = %user_id,
                    receivers = receiver_count,
                    "Progress event emitted"
                );
            }
            Err(_) => {
                drop(user_channels);
                self.prune_user_channel(user_id).await;
            }
        }
    }

    /// Removes the user's channel once its last receiver is gone
    async fn prune_user_channel(&self, user_id: &str) {
        let mut user_channels = self.user_channels.write().await;
        // A new subscriber may have arrived between the send and the write lock
        if user_channels
            .get(user_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            user_channels.remove(user_id);
            debug!(user_id = %user_id, "User channel removed after its last receiver dropped");
        }
    }

    pub async fn channel_count(&self) -> usize {
        self.user_channels.read().await.len()
    }

    /// Subscribe to events for one user
    pub async fn subscribe_to_user(&self, user_id: &str) -> broadcast::Receiver<ProgressEvent> {
        let user_channels = self.user_channels.read().await;

        if let Some(sender) = user_channels.get(user_id) {
            sender.subscribe()
        } else {
            debug!(user_id = %user_id, "Creating new user channel for subscription");
            drop(user_channels);

            let mut user_channels = self.user_channels.write().await;
            // Another subscriber may have created it in between
            let sender = user_channels
                .entry(user_id.to_string())
                .or_insert_with(|| broadcast::channel(USER_CHANNEL_CAPACITY).0);
            sender.subscribe()
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for EventBus {
    async fn notify(&self, event: ProgressEvent) {
        let user_id = event.user_id().to_string();
        self.emit_to_user(&user_id, event).await;
    }
}
