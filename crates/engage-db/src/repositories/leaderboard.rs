//! PostgreSQL implementation of LeaderboardRepository
//!
//! `point_logs` is the append-only ledger; `user_stats` holds one additive all-time total
//! per user. Windowed (weekly/monthly) scores are always summed from the ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use engage_core::entities::{ActionType, NewPointLog, RecordOutcome, ScoreRow, UserStats};
use engage_core::traits::{LeaderboardRepository, RepoResult};

use crate::models::{ScoreRowModel, UserStatsModel};

use super::error::map_db_error;

/// PostgreSQL implementation of LeaderboardRepository
#[derive(Clone)]
pub struct PgLeaderboardRepository {
    pool: PgPool,
}

impl PgLeaderboardRepository {
    /// Create a new PgLeaderboardRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaderboardRepository for PgLeaderboardRepository {
    #[instrument(skip(self, log), fields(user_id = %log.user_id, action = %log.action_type))]
    async fn record_award(&self, log: &NewPointLog) -> RepoResult<RecordOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        if let Some(cap) = log.daily_cap {
            // held until commit, so capped awards for one user are counted one at a time
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
                .bind(log.user_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;

            let credited = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*) FROM point_logs
                WHERE user_id = $1 AND action_type = $2 AND created_at >= $3
                "#,
            )
            .bind(log.user_id)
            .bind(log.action_type.as_str())
            .bind(cap.since)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;

            if credited >= cap.max {
                debug!(credited, max = cap.max, "Daily cap reached, nothing recorded");
                return Ok(RecordOutcome::CapReached);
            }
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO point_logs (user_id, action_type, points, reference_id, reference_table, actor_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(log.user_id)
        .bind(log.action_type.as_str())
        .bind(log.points)
        .bind(&log.reference_id)
        .bind(&log.reference_table)
        .bind(log.actor_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        if inserted == 0 {
            debug!("Duplicate actor credit, nothing recorded");
            return Ok(RecordOutcome::Duplicate);
        }

        sqlx::query(
            r#"
            INSERT INTO user_stats (user_id, total_all_time, last_updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET total_all_time = user_stats.total_all_time + EXCLUDED.total_all_time,
                last_updated_at = NOW()
            "#,
        )
        .bind(log.user_id)
        .bind(i64::from(log.points))
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(RecordOutcome::Recorded)
    }

    #[instrument(skip(self))]
    async fn has_point_from_actor(
        &self,
        actor_id: Uuid,
        action: ActionType,
        reference_id: &str,
    ) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM point_logs
                WHERE actor_id = $1 AND action_type = $2 AND reference_id = $3
            )
            "#,
        )
        .bind(actor_id)
        .bind(action.as_str())
        .bind(reference_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn count_actions_since(
        &self,
        user_id: Uuid,
        action: ActionType,
        since: DateTime<Utc>,
    ) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM point_logs
            WHERE user_id = $1 AND action_type = $2 AND created_at >= $3
            "#,
        )
        .bind(user_id)
        .bind(action.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_user_stats(&self, user_id: Uuid) -> RepoResult<Option<UserStats>> {
        let result = sqlx::query_as::<_, UserStatsModel>(
            r#"
            SELECT user_id, total_all_time, last_updated_at
            FROM user_stats
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(UserStats::from))
    }

    #[instrument(skip(self))]
    async fn top_by_all_time(&self, limit: i64) -> RepoResult<Vec<ScoreRow>> {
        let results = sqlx::query_as::<_, ScoreRowModel>(
            r#"
            SELECT u.id AS user_id, u.username, u.avatar_url, u.role, s.total_all_time AS score
            FROM user_stats s
            JOIN users u ON u.id = s.user_id
            ORDER BY s.total_all_time DESC, u.username ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ScoreRow::from).collect())
    }

    #[instrument(skip(self))]
    async fn top_by_period(&self, since: DateTime<Utc>, limit: i64) -> RepoResult<Vec<ScoreRow>> {
        let results = sqlx::query_as::<_, ScoreRowModel>(
            r#"
            SELECT u.id AS user_id, u.username, u.avatar_url, u.role, SUM(p.points)::BIGINT AS score
            FROM point_logs p
            JOIN users u ON u.id = p.user_id
            WHERE p.created_at >= $1
            GROUP BY u.id, u.username, u.avatar_url, u.role
            ORDER BY score DESC, u.username ASC
            LIMIT $2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ScoreRow::from).collect())
    }

    #[instrument(skip(self, user_ids), fields(users = user_ids.len()))]
    async fn all_time_points(&self, user_ids: &[Uuid]) -> RepoResult<HashMap<Uuid, i64>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT user_id, total_all_time
            FROM user_stats
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().collect())
    }

    #[instrument(skip(self, user_ids), fields(users = user_ids.len()))]
    async fn sum_points_since(
        &self,
        user_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> RepoResult<HashMap<Uuid, i64>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT user_id, SUM(points)::BIGINT
            FROM point_logs
            WHERE user_id = ANY($1) AND created_at >= $2
            GROUP BY user_id
            "#,
        )
        .bind(user_ids)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().collect())
    }
}
