//! Redis Pub/Sub notification fan-out

mod publisher;

pub use publisher::{NotificationEvent, RedisNotificationPublisher, NOTIFICATION_EVENT};
