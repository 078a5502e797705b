//! Gamification service
//!
//! Point awarding with anti-abuse guards, rank-change detection and leaderboard
//! queries. Rank is always derived from all-time points; windowed figures come from
//! the point log.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use engage_core::entities::{
    ActionType, NewPointLog, Notification, RecordOutcome, MAX_DAILY_THREAD_POINTS,
};
use engage_core::{GamificationStatus, RankTier, Timeframe};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::dto::LeaderboardEntry;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::notification::NotificationService;

/// Largest leaderboard page
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// Tier transition caused by an award
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankChange {
    pub from: RankTier,
    pub to: RankTier,
}

/// Result of one award attempt. Refusals are outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwardOutcome {
    /// Points were credited
    Awarded {
        points: i32,
        total: i64,
        rank_change: Option<RankChange>,
    },
    /// Target is a configured bot account
    BotUser,
    /// Target user does not exist
    UserNotFound,
    /// The actor already produced a credit for this reference
    DuplicateLike,
    /// Daily thread-creation credits already used up
    DailyCapReached,
}

impl AwardOutcome {
    pub fn is_awarded(&self) -> bool {
        matches!(self, Self::Awarded { .. })
    }
}

/// One award request, as queued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardRequest {
    pub user_id: Uuid,
    pub action: ActionType,
    pub reference_id: String,
    pub reference_table: String,
    pub actor_id: Option<Uuid>,
}

/// Gamification service
pub struct GamificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GamificationService<'a> {
    /// Create a new GamificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Queue an award. Returns false when the queue dropped the job.
    pub fn add_points_async(&self, request: AwardRequest) -> bool {
        let ctx = self.ctx.clone();
        self.ctx.task_queue().submit("award_points", async move {
            let user_id = request.user_id;
            let action = request.action;
            match GamificationService::new(&ctx).award_points(request).await {
                Ok(outcome) => debug!(user_id = %user_id, action = %action, ?outcome, "Award processed"),
                Err(e) => warn!(user_id = %user_id, action = %action, error = %e, "Award failed"),
            }
        })
    }

    /// Run the award pipeline synchronously
    #[instrument(skip(self), fields(user_id = %request.user_id, action = %request.action))]
    pub async fn award_points(&self, request: AwardRequest) -> ServiceResult<AwardOutcome> {
        let Some(user) = self.ctx.user_repo().find_by_id(request.user_id).await? else {
            return Ok(AwardOutcome::UserNotFound);
        };
        if user.is_bot(self.ctx.settings().gamification.bot_usernames.as_slice()) {
            return Ok(AwardOutcome::BotUser);
        }

        let leaderboard = self.ctx.leaderboard_repo();

        if let (ActionType::LikeReceived, Some(actor_id)) = (request.action, request.actor_id) {
            if leaderboard
                .has_point_from_actor(actor_id, request.action, &request.reference_id)
                .await?
            {
                return Ok(AwardOutcome::DuplicateLike);
            }
        }

        let today = start_of_day(Utc::now());
        if request.action == ActionType::CreateThread {
            let credited = leaderboard
                .count_actions_since(user.id, request.action, today)
                .await?;
            if credited >= MAX_DAILY_THREAD_POINTS {
                return Ok(AwardOutcome::DailyCapReached);
            }
        }

        let before = leaderboard
            .find_user_stats(user.id)
            .await?
            .map_or(0, |stats| stats.total_all_time);

        let mut log = NewPointLog::new(
            user.id,
            request.action,
            request.reference_id,
            request.reference_table,
            request.actor_id,
        );
        if request.action == ActionType::CreateThread {
            log = log.with_daily_cap(today, MAX_DAILY_THREAD_POINTS);
        }
        // the checks above are a fast path; the ledger re-checks both atomically
        match leaderboard.record_award(&log).await? {
            RecordOutcome::Recorded => {}
            RecordOutcome::Duplicate => return Ok(AwardOutcome::DuplicateLike),
            RecordOutcome::CapReached => return Ok(AwardOutcome::DailyCapReached),
        }

        let points = log.points;
        let total = before + i64::from(points);
        let from = RankTier::for_points(before);
        let to = RankTier::for_points(total);
        let rank_change = (from != to).then_some(RankChange { from, to });

        info!(points, total, "Points awarded");

        if let Some(change) = rank_change {
            info!(from = %change.from, to = %change.to, "Rank up");
            let notification =
                Notification::rank_up(user.id, change.from.name(), change.to.name(), total);
            NotificationService::new(self.ctx).send(&notification).await;
        }

        Ok(AwardOutcome::Awarded {
            points,
            total,
            rank_change,
        })
    }

    /// Ranked users for a timeframe. Positions are 1-based.
    #[instrument(skip(self))]
    pub async fn get_leaderboard(
        &self,
        limit: i64,
        timeframe: Timeframe,
    ) -> ServiceResult<Vec<LeaderboardEntry>> {
        let limit = limit.clamp(1, MAX_LEADERBOARD_LIMIT);
        let now = Utc::now();
        let week_start = Timeframe::Weekly.window_start(now).unwrap_or(now);
        let leaderboard = self.ctx.leaderboard_repo();

        let (rows, all_time, weekly) = match timeframe.window_start(now) {
            None => {
                let rows = leaderboard.top_by_all_time(limit).await?;
                let ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
                let all_time: HashMap<Uuid, i64> =
                    rows.iter().map(|row| (row.user_id, row.score)).collect();
                let weekly = leaderboard.sum_points_since(&ids, week_start).await?;
                (rows, all_time, weekly)
            }
            Some(since) => {
                let rows = leaderboard.top_by_period(since, limit).await?;
                let ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
                let all_time = leaderboard.all_time_points(&ids).await?;
                let weekly = if timeframe == Timeframe::Weekly {
                    rows.iter().map(|row| (row.user_id, row.score)).collect()
                } else {
                    leaderboard.sum_points_since(&ids, week_start).await?
                };
                (rows, all_time, weekly)
            }
        };

        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                let status = GamificationStatus::calculate(
                    all_time.get(&row.user_id).copied().unwrap_or(0),
                    weekly.get(&row.user_id).copied().unwrap_or(0),
                );
                LeaderboardEntry::new(row, index + 1, status)
            })
            .collect();

        Ok(entries)
    }

    /// Rank and weekly activity for one user
    #[instrument(skip(self))]
    pub async fn get_user_status(&self, user_id: Uuid) -> ServiceResult<GamificationStatus> {
        if self.ctx.user_repo().find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::not_found("User", user_id.to_string()));
        }

        let leaderboard = self.ctx.leaderboard_repo();
        let all_time = leaderboard
            .find_user_stats(user_id)
            .await?
            .map_or(0, |stats| stats.total_all_time);
        let now = Utc::now();
        let week_start = Timeframe::Weekly.window_start(now).unwrap_or(now);
        let weekly = leaderboard
            .sum_points_since(&[user_id], week_start)
            .await?
            .get(&user_id)
            .copied()
            .unwrap_or(0);

        Ok(GamificationStatus::calculate(all_time, weekly))
    }
}

/// Midnight UTC of the day containing `now`
fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |midnight| midnight.and_utc())
}
