//! Reaction service
//!
//! Handles reaction toggles, the per-reference count cache, and the like-received
//! side effects (points and notification for the content author).

use std::collections::HashMap;

use engage_cache::keys;
use engage_core::entities::{
    ActionType, Notification, ReactionDelta, ReactionSummary, ReferenceType,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::gamification::{AwardRequest, GamificationService};
use super::notification::NotificationService;

/// Content author plus what a notification needs to link back to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceOwner {
    pub author_id: Uuid,
    pub slug: Option<String>,
    pub title: Option<String>,
}

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add, remove, or switch the user's reaction on a reference
    #[instrument(skip(self))]
    pub async fn toggle_reaction(
        &self,
        user_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
        emoji: &str,
    ) -> ServiceResult<ReactionDelta> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(ServiceError::validation("emoji is required"));
        }

        let delta = self
            .ctx
            .reaction_repo()
            .toggle(user_id, reference_id, reference_type, emoji)
            .await?;

        info!(
            reference_id = %reference_id,
            reference_type = %reference_type,
            old_emoji = ?delta.old_emoji,
            new_emoji = ?delta.new_emoji,
            "Reaction toggled"
        );

        // best-effort; the database is authoritative
        if let Err(e) = self
            .ctx
            .reaction_cache()
            .apply_delta(reference_type, reference_id, &delta)
            .await
        {
            warn!(error = %e, "Reaction count cache update failed");
        }

        if let Some(new_emoji) = delta.activated() {
            if !reference_type.is_anonymous() {
                self.dispatch_side_effects(user_id, reference_id, reference_type, new_emoji);
            }
        }

        Ok(delta)
    }

    /// Counts per emoji, plus the caller's active emoji when `user_id` is given
    #[instrument(skip(self))]
    pub async fn get_reactions(
        &self,
        user_id: Option<Uuid>,
        reference_id: Uuid,
        reference_type: ReferenceType,
    ) -> ServiceResult<ReactionSummary> {
        let counts = match self.cached_counts(reference_type, reference_id).await {
            Some(counts) => counts,
            None => self.rebuild_counts(reference_type, reference_id).await?,
        };

        let user_reacted = match user_id {
            Some(user_id) => {
                self.ctx
                    .reaction_repo()
                    .find_user_emoji(user_id, reference_id, reference_type)
                    .await?
            }
            None => None,
        };

        Ok(ReactionSummary::new(counts, user_reacted))
    }

    /// Warm cache contents; `None` on a cold key or a cache failure
    async fn cached_counts(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> Option<HashMap<String, i64>> {
        match self
            .ctx
            .reaction_cache()
            .get_counts(reference_type, reference_id)
            .await
        {
            Ok(counts) if !counts.is_empty() => Some(counts),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Reaction count cache read failed, using database");
                None
            }
        }
    }

    /// Recompute from the aggregate and repopulate, one rebuild per key at a time
    async fn rebuild_counts(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> ServiceResult<HashMap<String, i64>> {
        let key = keys::reaction_counts(reference_type, reference_id);
        let _flight = self.ctx.rebuild_locks().acquire(&key).await;

        // a concurrent caller may have finished the rebuild while we waited
        if let Some(counts) = self.cached_counts(reference_type, reference_id).await {
            return Ok(counts);
        }

        let counts = self
            .ctx
            .reaction_repo()
            .count_by_emoji(reference_id, reference_type)
            .await?;
        let counts: HashMap<String, i64> =
            counts.into_iter().filter(|(_, count)| *count > 0).collect();

        if let Err(e) = self
            .ctx
            .reaction_cache()
            .replace_counts(reference_type, reference_id, &counts)
            .await
        {
            warn!(error = %e, "Failed to repopulate reaction count cache");
        }

        debug!(key = %key, emojis = counts.len(), "Reaction counts rebuilt");
        Ok(counts)
    }

    fn dispatch_side_effects(
        &self,
        actor_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
        emoji: &str,
    ) {
        let ctx = self.ctx.clone();
        let emoji = emoji.to_string();
        self.ctx.task_queue().submit("reaction_side_effects", async move {
            let service = ReactionService::new(&ctx);
            if let Err(e) = service
                .run_side_effects(actor_id, reference_id, reference_type, &emoji)
                .await
            {
                warn!(
                    reference_id = %reference_id,
                    error = %e,
                    "Reaction side effects failed"
                );
            }
        });
    }

    /// Award like_received to the author and notify them, unless they reacted themselves
    async fn run_side_effects(
        &self,
        actor_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
        emoji: &str,
    ) -> ServiceResult<()> {
        let Some(owner) = self.resolve_owner(reference_id, reference_type).await? else {
            debug!(reference_id = %reference_id, "Reacted content no longer exists");
            return Ok(());
        };
        if owner.author_id == actor_id {
            return Ok(());
        }

        let outcome = GamificationService::new(self.ctx)
            .award_points(AwardRequest {
                user_id: owner.author_id,
                action: ActionType::LikeReceived,
                reference_id: reference_id.to_string(),
                reference_table: reference_type.reference_table().to_string(),
                actor_id: Some(actor_id),
            })
            .await;
        if let Err(e) = outcome {
            warn!(error = %e, "Like award failed");
        }

        let notification = Notification::reaction(
            owner.author_id,
            actor_id,
            reference_id,
            reference_type,
            owner.slug,
            emoji,
            owner.title.as_deref(),
        );
        NotificationService::new(self.ctx).send(&notification).await;

        Ok(())
    }

    /// Author of the reacted content; posts link through their thread
    pub async fn resolve_owner(
        &self,
        reference_id: Uuid,
        reference_type: ReferenceType,
    ) -> ServiceResult<Option<ReferenceOwner>> {
        let owner = match reference_type {
            ReferenceType::Thread => self
                .ctx
                .thread_repo()
                .find_by_id(reference_id)
                .await?
                .map(|thread| ReferenceOwner {
                    author_id: thread.user_id,
                    slug: Some(thread.slug),
                    title: Some(thread.title),
                }),
            ReferenceType::Post => {
                let Some(post) = self.ctx.post_repo().find_by_id(reference_id).await? else {
                    return Ok(None);
                };
                let thread = self.ctx.thread_repo().find_by_id(post.thread_id).await?;
                Some(ReferenceOwner {
                    author_id: post.user_id,
                    slug: thread.as_ref().map(|t| t.slug.clone()),
                    title: thread.map(|t| t.title),
                })
            }
            ReferenceType::Menfess => None,
        };
        Ok(owner)
    }
}
