use async_trait::async_trait;

use super::events::ProgressEvent;

/// Receives progression notifications.
///
/// Delivery is fire-and-forget: a sink must not fail the operation that produced the event.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: ProgressEvent);
}
