//! Redis Pub/Sub publisher.
//!
//! Pushes each created notification onto the recipient's `notifications:{user_id}`
//! channel so connected clients can be told in real time. Delivery is fire-and-forget:
//! nobody listening is not an error.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::Serialize;

use engage_core::entities::Notification;
use engage_core::traits::{NotificationSink, RepoResult};

use crate::keys;
use crate::pool::{RedisPool, RedisResult};

/// Event type carried by every notification message
pub const NOTIFICATION_EVENT: &str = "NOTIFICATION_CREATE";

/// Wire envelope for Pub/Sub messages
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent<'a> {
    pub event_type: &'static str,
    pub data: &'a Notification,
}

impl<'a> NotificationEvent<'a> {
    #[must_use]
    pub fn new(notification: &'a Notification) -> Self {
        Self {
            event_type: NOTIFICATION_EVENT,
            data: notification,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Publishes notifications to per-user channels
#[derive(Clone)]
pub struct RedisNotificationPublisher {
    pool: RedisPool,
}

impl RedisNotificationPublisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish a notification; returns how many subscribers received it
    pub async fn publish(&self, notification: &Notification) -> RedisResult<u32> {
        let channel = keys::notification_channel(notification.user_id);
        let payload = NotificationEvent::new(notification).to_json()?;

        let mut conn = self.pool.get().await?;
        let receivers: u32 = conn.publish(&channel, &payload).await?;

        tracing::debug!(
            channel = %channel,
            kind = notification.kind.as_str(),
            receivers = receivers,
            "Published notification"
        );

        Ok(receivers)
    }
}

#[async_trait]
impl NotificationSink for RedisNotificationPublisher {
    async fn create_notification(&self, notification: &Notification) -> RepoResult<()> {
        self.publish(notification)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }
}
