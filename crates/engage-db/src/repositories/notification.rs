//! PostgreSQL notification sink

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use engage_core::entities::Notification;
use engage_core::traits::{NotificationSink, RepoResult};

use super::error::map_db_error;

/// Persists notifications into the `notifications` table
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for PgNotificationRepository {
    #[instrument(skip(self, notification), fields(user_id = %notification.user_id, kind = notification.kind.as_str()))]
    async fn create_notification(&self, notification: &Notification) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications
                (id, user_id, actor_id, entity_id, entity_slug, entity_type, type, message, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.actor_id)
        .bind(notification.entity_id)
        .bind(notification.entity_slug.as_deref())
        .bind(&notification.entity_type)
        .bind(notification.kind.as_str())
        .bind(&notification.message)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
