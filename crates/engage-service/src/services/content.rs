//! Content service
//!
//! Rate-gated thread and reply creation. Both take a global lock plus a per-kind
//! lock; the locks are released again when creation fails so a rejected write does
//! not cost the user a cooldown.

use engage_core::entities::{ActionType, NewPost, NewThread, Notification, Post, Thread};
use engage_core::RateLimitScope;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::gamification::{AwardRequest, GamificationService};
use super::notification::NotificationService;
use super::rate_limit::RateLimitService;

const THREAD_SCOPES: [RateLimitScope; 2] = [RateLimitScope::Global, RateLimitScope::Thread];
const POST_SCOPES: [RateLimitScope; 2] = [RateLimitScope::Global, RateLimitScope::Post];

/// Content service
pub struct ContentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ContentService<'a> {
    /// Create a new ContentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a thread and queue its `create_thread` award
    #[instrument(skip(self, content))]
    pub async fn create_thread(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> ServiceResult<Thread> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ServiceError::validation("title is required"));
        }

        let mut guard = RateLimitService::new(self.ctx)
            .acquire(user_id, &THREAD_SCOPES)
            .await?;

        let thread = match self
            .ctx
            .thread_repo()
            .create(&NewThread::new(user_id, title, content))
            .await
        {
            Ok(thread) => thread,
            Err(e) => {
                guard.rollback().await;
                return Err(e.into());
            }
        };
        guard.commit();

        info!(thread_id = %thread.id, slug = %thread.slug, "Thread created");

        GamificationService::new(self.ctx).add_points_async(AwardRequest {
            user_id,
            action: ActionType::CreateThread,
            reference_id: thread.id.to_string(),
            reference_table: "threads".to_string(),
            actor_id: None,
        });

        Ok(thread)
    }

    /// Create a reply, then notify the replied-to author and award the thread author
    #[instrument(skip(self, content))]
    pub async fn create_post(
        &self,
        user_id: Uuid,
        thread_id: Uuid,
        parent_id: Option<Uuid>,
        content: &str,
    ) -> ServiceResult<Post> {
        if content.trim().is_empty() {
            return Err(ServiceError::validation("content is required"));
        }

        let mut guard = RateLimitService::new(self.ctx)
            .acquire(user_id, &POST_SCOPES)
            .await?;

        let (thread, parent, post) = match self
            .insert_post(user_id, thread_id, parent_id, content)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                guard.rollback().await;
                return Err(e);
            }
        };
        guard.commit();

        info!(post_id = %post.id, thread_id = %thread.id, "Reply created");

        let ctx = self.ctx.clone();
        let post_id = post.id;
        self.ctx.task_queue().submit("reply_side_effects", async move {
            ContentService::new(&ctx)
                .run_reply_side_effects(user_id, post_id, &thread, parent.as_ref())
                .await;
        });

        Ok(post)
    }

    async fn insert_post(
        &self,
        user_id: Uuid,
        thread_id: Uuid,
        parent_id: Option<Uuid>,
        content: &str,
    ) -> ServiceResult<(Thread, Option<Post>, Post)> {
        let thread = self
            .ctx
            .thread_repo()
            .find_by_id(thread_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Thread", thread_id.to_string()))?;

        let parent = match parent_id {
            Some(parent_id) => Some(
                self.ctx
                    .post_repo()
                    .find_by_id(parent_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Post", parent_id.to_string()))?,
            ),
            None => None,
        };

        let post = self
            .ctx
            .post_repo()
            .create(&NewPost::new(thread_id, user_id, parent_id, content))
            .await?;

        Ok((thread, parent, post))
    }

    async fn run_reply_side_effects(
        &self,
        replier_id: Uuid,
        post_id: Uuid,
        thread: &Thread,
        parent: Option<&Post>,
    ) {
        let recipient = match parent {
            Some(parent) => (parent.user_id != replier_id).then_some((parent.user_id, true)),
            None => (thread.user_id != replier_id).then_some((thread.user_id, false)),
        };
        if let Some((recipient_id, to_post)) = recipient {
            let notification = Notification::reply(
                recipient_id,
                replier_id,
                thread.id,
                &thread.slug,
                &thread.title,
                to_post,
            );
            NotificationService::new(self.ctx).send(&notification).await;
        }

        if thread.user_id == replier_id {
            return;
        }
        let outcome = GamificationService::new(self.ctx)
            .award_points(AwardRequest {
                user_id: thread.user_id,
                action: ActionType::CommentReceived,
                reference_id: post_id.to_string(),
                reference_table: "posts".to_string(),
                actor_id: None,
            })
            .await;
        if let Err(e) = outcome {
            warn!(post_id = %post_id, error = %e, "Comment award failed");
        }
    }
}
