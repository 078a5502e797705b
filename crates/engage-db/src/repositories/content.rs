//! PostgreSQL implementations of ThreadRepository and PostRepository

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use engage_core::entities::{NewPost, NewThread, Post, Thread, ThreadSummary};
use engage_core::error::DomainError;
use engage_core::traits::{PostRepository, RepoResult, ThreadRepository};
use engage_core::value_objects::{
    AGE_OFFSET_HOURS, GRAVITY, REACTION_WEIGHT, REPLY_WEIGHT, TRENDING_WINDOW_DAYS,
};

use crate::models::{PostModel, ThreadModel, TrendingThreadModel};

use super::error::{map_db_error, map_unique_violation};

// ============================================================================
// Threads
// ============================================================================

/// PostgreSQL implementation of ThreadRepository
#[derive(Clone)]
pub struct PgThreadRepository {
    pool: PgPool,
}

impl PgThreadRepository {
    /// Create a new PgThreadRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThreadRepository for PgThreadRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Thread>> {
        let result = sqlx::query_as::<_, ThreadModel>(
            r#"
            SELECT id, user_id, title, slug, content, views, created_at
            FROM threads
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Thread::from))
    }

    #[instrument(skip(self, thread), fields(thread_id = %thread.id))]
    async fn create(&self, thread: &NewThread) -> RepoResult<Thread> {
        let model = sqlx::query_as::<_, ThreadModel>(
            r#"
            INSERT INTO threads (id, user_id, title, slug, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, slug, content, views, created_at
            "#,
        )
        .bind(thread.id)
        .bind(thread.user_id)
        .bind(&thread.title)
        .bind(&thread.slug)
        .bind(&thread.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::SlugAlreadyExists(thread.slug.clone()))
        })?;

        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn add_views(&self, id: Uuid, delta: i64) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE threads SET views = views + $2 WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ThreadNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn trending(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<ThreadSummary>> {
        let since = now - Duration::days(TRENDING_WINDOW_DAYS);

        let results = sqlx::query_as::<_, TrendingThreadModel>(
            r#"
            SELECT
                t.id,
                t.title,
                t.slug,
                t.user_id AS author_id,
                t.views,
                COALESCE(r.reaction_count, 0) AS reaction_count,
                COALESCE(p.reply_count, 0) AS reply_count,
                t.created_at,
                (
                    (t.views + $2 * COALESCE(r.reaction_count, 0) + $3 * COALESCE(p.reply_count, 0))::DOUBLE PRECISION
                    / POWER(
                        GREATEST(EXTRACT(EPOCH FROM ($1 - t.created_at))::DOUBLE PRECISION / 3600.0, 0) + $4,
                        $5
                    )
                )::DOUBLE PRECISION AS score
            FROM threads t
            LEFT JOIN (
                SELECT reference_id, COUNT(*) AS reaction_count
                FROM reactions
                WHERE reference_type = 'thread'
                GROUP BY reference_id
            ) r ON r.reference_id = t.id
            LEFT JOIN (
                SELECT thread_id, COUNT(*) AS reply_count
                FROM posts
                GROUP BY thread_id
            ) p ON p.thread_id = t.id
            WHERE t.created_at >= $6
            ORDER BY score DESC, t.created_at DESC
            LIMIT $7
            "#,
        )
        .bind(now)
        .bind(REACTION_WEIGHT)
        .bind(REPLY_WEIGHT)
        .bind(AGE_OFFSET_HOURS)
        .bind(GRAVITY)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ThreadSummary::from).collect())
    }
}

// ============================================================================
// Posts
// ============================================================================

/// PostgreSQL implementation of PostRepository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new PgPostRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Post>> {
        let result = sqlx::query_as::<_, PostModel>(
            r#"
            SELECT id, thread_id, user_id, parent_id, content, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Post::from))
    }

    #[instrument(skip(self, post), fields(post_id = %post.id, thread_id = %post.thread_id))]
    async fn create(&self, post: &NewPost) -> RepoResult<Post> {
        let model = sqlx::query_as::<_, PostModel>(
            r#"
            INSERT INTO posts (id, thread_id, user_id, parent_id, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, thread_id, user_id, parent_id, content, created_at
            "#,
        )
        .bind(post.id)
        .bind(post.thread_id)
        .bind(post.user_id)
        .bind(post.parent_id)
        .bind(&post.content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(model.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repos_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgThreadRepository>();
        assert_send_sync::<PgPostRepository>();
    }
}
