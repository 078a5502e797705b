//! PostgreSQL implementation of ReactionRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use engage_core::entities::{Reaction, ReactionDelta, ReferenceType};
use engage_core::error::DomainError;
use engage_core::traits::{ReactionRepository, RepoResult};

use crate::mappers::counts_by_emoji;
use crate::models::{ReactionCountModel, ReactionModel};

use super::error::map_db_error;

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    /// Create a new PgReactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Read the user's row on the reference and hold its lock until the transaction ends
async fn lock_existing(
    conn: &mut PgConnection,
    user_id: Uuid,
    reference_id: Uuid,
    reference_type: ReferenceType,
) -> RepoResult<Option<Reaction>> {
    let row = sqlx::query_as::<_, ReactionModel>(
        r#"
        SELECT user_id, reference_id, reference_type, emoji, created_at
        FROM reactions
        WHERE user_id = $1 AND reference_id = $2 AND reference_type = $3
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(reference_id)
    .bind(reference_type.as_str())
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;

    row.map(Reaction::try_from).transpose()
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self))]
    async fn toggle(
        &self,
        user_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
        emoji: &str,
    ) -> RepoResult<ReactionDelta> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut existing = lock_existing(&mut *tx, user_id, reference_id, reference_type).await?;

        if existing.is_none() {
            let inserted = sqlx::query(
                r#"
                INSERT INTO reactions (user_id, reference_id, reference_type, emoji)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, reference_id, reference_type) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(reference_id)
            .bind(reference_type.as_str())
            .bind(emoji)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

            if inserted == 1 {
                tx.commit().await.map_err(map_db_error)?;
                return Ok(ReactionDelta::added(emoji));
            }

            // A concurrent first reaction won the unique race; toggle against its row.
            debug!("Reaction insert lost unique race, retrying as update");
            existing = lock_existing(&mut *tx, user_id, reference_id, reference_type).await?;
        }

        let current = existing.ok_or_else(|| {
            DomainError::DatabaseError("reaction row disappeared during toggle".to_string())
        })?;

        let delta = if current.is_emoji(emoji) {
            sqlx::query(
                r#"
                DELETE FROM reactions
                WHERE user_id = $1 AND reference_id = $2 AND reference_type = $3
                "#,
            )
            .bind(user_id)
            .bind(reference_id)
            .bind(reference_type.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            ReactionDelta::removed(current.emoji)
        } else {
            sqlx::query(
                r#"
                UPDATE reactions SET emoji = $4, updated_at = NOW()
                WHERE user_id = $1 AND reference_id = $2 AND reference_type = $3
                "#,
            )
            .bind(user_id)
            .bind(reference_id)
            .bind(reference_type.as_str())
            .bind(emoji)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            ReactionDelta::switched(current.emoji, emoji)
        };

        tx.commit().await.map_err(map_db_error)?;
        Ok(delta)
    }

    #[instrument(skip(self))]
    async fn find_user_emoji(
        &self,
        user_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
    ) -> RepoResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT emoji
            FROM reactions
            WHERE user_id = $1 AND reference_id = $2 AND reference_type = $3
            "#,
        )
        .bind(user_id)
        .bind(reference_id)
        .bind(reference_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn count_by_emoji(
        &self,
        reference_id: Uuid,
        reference_type: ReferenceType,
    ) -> RepoResult<HashMap<String, i64>> {
        let results = sqlx::query_as::<_, ReactionCountModel>(
            r#"
            SELECT emoji, COUNT(*) AS count
            FROM reactions
            WHERE reference_id = $1 AND reference_type = $2
            GROUP BY emoji
            "#,
        )
        .bind(reference_id)
        .bind(reference_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(counts_by_emoji(results))
    }
}
