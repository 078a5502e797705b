//! Notification delivery
//!
//! Notifications are always best-effort: a failed delivery is logged and never fails
//! the operation that produced it.

use std::sync::Arc;

use async_trait::async_trait;
use engage_core::entities::Notification;
use engage_core::traits::{NotificationSink, RepoResult};
use tracing::{debug, instrument, warn};

use super::context::ServiceContext;

/// Sink that writes to a primary store, then forwards to secondary sinks.
///
/// Only the primary's result is reported; secondary failures are logged.
pub struct FanoutNotificationSink {
    primary: Arc<dyn NotificationSink>,
    secondaries: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutNotificationSink {
    pub fn new(primary: Arc<dyn NotificationSink>) -> Self {
        Self {
            primary,
            secondaries: Vec::new(),
        }
    }

    pub fn with_secondary(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.secondaries.push(sink);
        self
    }
}

#[async_trait]
impl NotificationSink for FanoutNotificationSink {
    async fn create_notification(&self, notification: &Notification) -> RepoResult<()> {
        self.primary.create_notification(notification).await?;
        for sink in &self.secondaries {
            if let Err(e) = sink.create_notification(notification).await {
                warn!(
                    notification_id = %notification.id,
                    error = %e,
                    "Secondary notification sink failed"
                );
            }
        }
        Ok(())
    }
}

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    /// Create a new NotificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Deliver a notification, logging instead of failing
    #[instrument(skip(self, notification), fields(user_id = %notification.user_id, kind = notification.kind.as_str()))]
    pub async fn send(&self, notification: &Notification) -> bool {
        match self.ctx.notification_sink().create_notification(notification).await {
            Ok(()) => {
                debug!("Notification created");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to create notification");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use engage_core::DomainError;
    use uuid::Uuid;

    use super::*;

    #[derive(Default)]
    struct CountingSink {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSink for CountingSink {
        async fn create_notification(&self, _notification: &Notification) -> RepoResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DomainError::CacheError("publish failed".into()))
            } else {
                Ok(())
            }
        }
    }

    fn sample() -> Notification {
        let user = Uuid::new_v4();
        Notification::rank_up(user, "Pendatang", "Warga", 100)
    }

    #[tokio::test]
    async fn test_secondary_failure_is_not_reported() {
        let primary = Arc::new(CountingSink::default());
        let secondary = Arc::new(CountingSink {
            fail: true,
            ..CountingSink::default()
        });
        let sink = FanoutNotificationSink::new(primary.clone()).with_secondary(secondary.clone());

        assert!(sink.create_notification(&sample()).await.is_ok());
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_primary_failure_skips_secondaries() {
        let primary = Arc::new(CountingSink {
            fail: true,
            ..CountingSink::default()
        });
        let secondary = Arc::new(CountingSink::default());
        let sink = FanoutNotificationSink::new(primary).with_secondary(secondary.clone());

        assert!(sink.create_notification(&sample()).await.is_err());
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }
}
