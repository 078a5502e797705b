//! In-memory port implementations for service tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engage_common::TaskQueueConfig;
use engage_core::entities::{
    ActionType, NewPointLog, NewPost, NewThread, Notification, PointLog, Post, ReactionDelta,
    RecordOutcome, ReferenceType, ScoreRow, Thread, ThreadSummary, User, UserStats,
};
use engage_core::traits::{
    LeaderboardRepository, NotificationSink, PostRepository, RateLimitStore, ReactionCountCache,
    ReactionRepository, RepoResult, ThreadRepository, UserRepository, ViewCounterStore,
};
use engage_core::value_objects::TRENDING_WINDOW_DAYS;
use engage_core::{trending_score, DomainError, RateLimitScope};
use engage_service::{EngineSettings, ServiceContext, ServiceContextBuilder, TaskQueue};
use parking_lot::Mutex;
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

#[derive(Default)]
pub struct FakeUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

impl FakeUsers {
    pub fn add(&self, username: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            avatar_url: None,
            role: None,
            created_at: Utc::now(),
        };
        self.users.lock().insert(user.id, user.clone());
        user
    }

    fn username(&self, id: Uuid) -> String {
        self.users
            .lock()
            .get(&id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UserRepository for FakeUsers {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.users.lock().get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

// ============================================================================
// Threads and posts
// ============================================================================

#[derive(Default)]
pub struct FakeContent {
    threads: Mutex<HashMap<Uuid, Thread>>,
    posts: Mutex<HashMap<Uuid, Post>>,
    pub fail_creates: AtomicBool,
    pub fail_view_writes: AtomicBool,
}

impl FakeContent {
    pub fn add_thread(&self, author: Uuid, title: &str) -> Thread {
        self.add_thread_at(author, title, Utc::now())
    }

    pub fn add_thread_at(&self, author: Uuid, title: &str, created_at: DateTime<Utc>) -> Thread {
        let new = NewThread::new(author, title, "body");
        let thread = Thread {
            id: new.id,
            user_id: author,
            title: new.title,
            slug: new.slug,
            content: new.content,
            views: 0,
            created_at,
        };
        self.threads.lock().insert(thread.id, thread.clone());
        thread
    }

    pub fn add_post(&self, thread_id: Uuid, author: Uuid) -> Post {
        let new = NewPost::new(thread_id, author, None, "reply");
        let post = Post {
            id: new.id,
            thread_id,
            user_id: author,
            parent_id: None,
            content: new.content,
            created_at: Utc::now(),
        };
        self.posts.lock().insert(post.id, post.clone());
        post
    }

    pub fn views(&self, thread_id: Uuid) -> i64 {
        self.threads.lock().get(&thread_id).map_or(0, |t| t.views)
    }

    pub fn delete_thread(&self, thread_id: Uuid) {
        self.threads.lock().remove(&thread_id);
    }

    pub fn thread_count(&self) -> usize {
        self.threads.lock().len()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().len()
    }
}

#[async_trait]
impl ThreadRepository for FakeContent {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Thread>> {
        Ok(self.threads.lock().get(&id).cloned())
    }

    async fn create(&self, thread: &NewThread) -> RepoResult<Thread> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("insert failed".into()));
        }
        let created = Thread {
            id: thread.id,
            user_id: thread.user_id,
            title: thread.title.clone(),
            slug: thread.slug.clone(),
            content: thread.content.clone(),
            views: 0,
            created_at: Utc::now(),
        };
        self.threads.lock().insert(created.id, created.clone());
        Ok(created)
    }

    async fn add_views(&self, id: Uuid, delta: i64) -> RepoResult<()> {
        if self.fail_view_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("connection reset".into()));
        }
        let mut threads = self.threads.lock();
        let thread = threads.get_mut(&id).ok_or(DomainError::ThreadNotFound(id))?;
        thread.views += delta;
        Ok(())
    }

    async fn trending(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<ThreadSummary>> {
        let window_start = now - chrono::Duration::days(TRENDING_WINDOW_DAYS);
        let posts = self.posts.lock();
        let mut summaries: Vec<ThreadSummary> = self
            .threads
            .lock()
            .values()
            .filter(|t| t.created_at >= window_start)
            .map(|t| {
                let replies = posts.values().filter(|p| p.thread_id == t.id).count() as i64;
                let age_hours = (now - t.created_at).num_seconds() as f64 / 3600.0;
                ThreadSummary {
                    id: t.id,
                    title: t.title.clone(),
                    slug: t.slug.clone(),
                    author_id: t.user_id,
                    views: t.views,
                    reaction_count: 0,
                    reply_count: replies,
                    created_at: t.created_at,
                    score: trending_score(t.views, 0, replies, age_hours),
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.score.total_cmp(&a.score));
        summaries.truncate(limit as usize);
        Ok(summaries)
    }
}

#[async_trait]
impl PostRepository for FakeContent {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Post>> {
        Ok(self.posts.lock().get(&id).cloned())
    }

    async fn create(&self, post: &NewPost) -> RepoResult<Post> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("insert failed".into()));
        }
        let created = Post {
            id: post.id,
            thread_id: post.thread_id,
            user_id: post.user_id,
            parent_id: post.parent_id,
            content: post.content.clone(),
            created_at: Utc::now(),
        };
        self.posts.lock().insert(created.id, created.clone());
        Ok(created)
    }
}

// ============================================================================
// Reactions
// ============================================================================

#[derive(Default)]
pub struct FakeReactions {
    rows: Mutex<HashMap<(Uuid, Uuid, ReferenceType), String>>,
    pub aggregate_calls: AtomicUsize,
}

impl FakeReactions {
    pub fn rows_for(&self, reference_id: Uuid) -> Vec<String> {
        self.rows
            .lock()
            .iter()
            .filter(|((_, r, _), _)| *r == reference_id)
            .map(|(_, emoji)| emoji.clone())
            .collect()
    }
}

#[async_trait]
impl ReactionRepository for FakeReactions {
    async fn toggle(
        &self,
        user_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
        emoji: &str,
    ) -> RepoResult<ReactionDelta> {
        let mut rows = self.rows.lock();
        let key = (user_id, reference_id, reference_type);
        let delta = match rows.get(&key).cloned() {
            None => {
                rows.insert(key, emoji.to_string());
                ReactionDelta::added(emoji)
            }
            Some(existing) if existing == emoji => {
                rows.remove(&key);
                ReactionDelta::removed(emoji)
            }
            Some(existing) => {
                rows.insert(key, emoji.to_string());
                ReactionDelta::switched(existing, emoji)
            }
        };
        Ok(delta)
    }

    async fn find_user_emoji(
        &self,
        user_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
    ) -> RepoResult<Option<String>> {
        Ok(self
            .rows
            .lock()
            .get(&(user_id, reference_id, reference_type))
            .cloned())
    }

    async fn count_by_emoji(
        &self,
        reference_id: Uuid,
        reference_type: ReferenceType,
    ) -> RepoResult<HashMap<String, i64>> {
        self.aggregate_calls.fetch_add(1, Ordering::SeqCst);
        // widen the window in which concurrent cold reads overlap
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut counts = HashMap::new();
        for ((_, r, t), emoji) in self.rows.lock().iter() {
            if *r == reference_id && *t == reference_type {
                *counts.entry(emoji.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

// ============================================================================
// Leaderboard
// ============================================================================

pub struct FakeLeaderboard {
    users: Arc<FakeUsers>,
    logs: Mutex<Vec<PointLog>>,
    totals: Mutex<HashMap<Uuid, i64>>,
    /// Delay the pre-award reads the way database round-trips would
    pub slow_reads: AtomicBool,
}

impl FakeLeaderboard {
    pub fn new(users: Arc<FakeUsers>) -> Self {
        Self {
            users,
            logs: Mutex::new(Vec::new()),
            totals: Mutex::new(HashMap::new()),
            slow_reads: AtomicBool::new(false),
        }
    }

    async fn read_latency(&self) {
        if self.slow_reads.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub fn total(&self, user_id: Uuid) -> i64 {
        self.totals.lock().get(&user_id).copied().unwrap_or(0)
    }

    pub fn log_count(&self, user_id: Uuid, action: ActionType) -> usize {
        self.logs
            .lock()
            .iter()
            .filter(|l| l.user_id == user_id && l.action_type == action)
            .count()
    }

    /// Seed history directly, e.g. points earned long ago
    pub fn seed(&self, user_id: Uuid, action: ActionType, points: i32, created_at: DateTime<Utc>) {
        let mut logs = self.logs.lock();
        let id = logs.len() as i64 + 1;
        logs.push(PointLog {
            id,
            user_id,
            action_type: action,
            points,
            reference_id: Uuid::new_v4().to_string(),
            reference_table: "threads".to_string(),
            actor_id: None,
            created_at,
        });
        *self.totals.lock().entry(user_id).or_insert(0) += i64::from(points);
    }

    fn rows(&self, scores: Vec<(Uuid, i64)>, limit: i64) -> Vec<ScoreRow> {
        let mut scores = scores;
        scores.sort_by(|a, b| b.1.cmp(&a.1));
        scores
            .into_iter()
            .take(limit as usize)
            .map(|(user_id, score)| ScoreRow {
                user_id,
                username: self.users.username(user_id),
                avatar_url: None,
                role: None,
                score,
            })
            .collect()
    }
}

#[async_trait]
impl LeaderboardRepository for FakeLeaderboard {
    async fn record_award(&self, log: &NewPointLog) -> RepoResult<RecordOutcome> {
        let mut logs = self.logs.lock();
        if let Some(cap) = log.daily_cap {
            let credited = logs
                .iter()
                .filter(|l| {
                    l.user_id == log.user_id
                        && l.action_type == log.action_type
                        && l.created_at >= cap.since
                })
                .count() as i64;
            if credited >= cap.max {
                return Ok(RecordOutcome::CapReached);
            }
        }
        if let Some(actor) = log.actor_id {
            let duplicate = logs.iter().any(|l| {
                l.actor_id == Some(actor)
                    && l.action_type == log.action_type
                    && l.reference_id == log.reference_id
            });
            if duplicate {
                return Ok(RecordOutcome::Duplicate);
            }
        }
        let id = logs.len() as i64 + 1;
        logs.push(PointLog {
            id,
            user_id: log.user_id,
            action_type: log.action_type,
            points: log.points,
            reference_id: log.reference_id.clone(),
            reference_table: log.reference_table.clone(),
            actor_id: log.actor_id,
            created_at: Utc::now(),
        });
        *self.totals.lock().entry(log.user_id).or_insert(0) += i64::from(log.points);
        Ok(RecordOutcome::Recorded)
    }

    async fn has_point_from_actor(
        &self,
        actor_id: Uuid,
        action: ActionType,
        reference_id: &str,
    ) -> RepoResult<bool> {
        Ok(self.logs.lock().iter().any(|l| {
            l.actor_id == Some(actor_id) && l.action_type == action && l.reference_id == reference_id
        }))
    }

    async fn count_actions_since(
        &self,
        user_id: Uuid,
        action: ActionType,
        since: DateTime<Utc>,
    ) -> RepoResult<i64> {
        self.read_latency().await;
        Ok(self
            .logs
            .lock()
            .iter()
            .filter(|l| l.user_id == user_id && l.action_type == action && l.created_at >= since)
            .count() as i64)
    }

    async fn find_user_stats(&self, user_id: Uuid) -> RepoResult<Option<UserStats>> {
        self.read_latency().await;
        Ok(self.totals.lock().get(&user_id).map(|total| UserStats {
            user_id,
            total_all_time: *total,
            last_updated_at: Utc::now(),
        }))
    }

    async fn top_by_all_time(&self, limit: i64) -> RepoResult<Vec<ScoreRow>> {
        let scores = self.totals.lock().iter().map(|(k, v)| (*k, *v)).collect();
        Ok(self.rows(scores, limit))
    }

    async fn top_by_period(&self, since: DateTime<Utc>, limit: i64) -> RepoResult<Vec<ScoreRow>> {
        let mut sums: HashMap<Uuid, i64> = HashMap::new();
        for log in self.logs.lock().iter().filter(|l| l.created_at >= since) {
            *sums.entry(log.user_id).or_insert(0) += i64::from(log.points);
        }
        Ok(self.rows(sums.into_iter().collect(), limit))
    }

    async fn all_time_points(&self, user_ids: &[Uuid]) -> RepoResult<HashMap<Uuid, i64>> {
        let totals = self.totals.lock();
        Ok(user_ids
            .iter()
            .filter_map(|id| totals.get(id).map(|t| (*id, *t)))
            .collect())
    }

    async fn sum_points_since(
        &self,
        user_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> RepoResult<HashMap<Uuid, i64>> {
        let mut sums = HashMap::new();
        for log in self.logs.lock().iter() {
            if log.created_at >= since && user_ids.contains(&log.user_id) {
                *sums.entry(log.user_id).or_insert(0) += i64::from(log.points);
            }
        }
        Ok(sums)
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Default)]
pub struct FakeNotifications {
    sent: Mutex<Vec<Notification>>,
}

impl FakeNotifications {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn for_user(&self, user_id: Uuid) -> Vec<Notification> {
        self.sent
            .lock()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for FakeNotifications {
    async fn create_notification(&self, notification: &Notification) -> RepoResult<()> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

// ============================================================================
// Cache stores
// ============================================================================

/// Redis-hash semantics: a hash whose last field is deleted disappears
#[derive(Default)]
pub struct FakeCountCache {
    hashes: Mutex<HashMap<(ReferenceType, Uuid), HashMap<String, i64>>>,
    pub fail_reads: AtomicBool,
}

impl FakeCountCache {
    pub fn evict(&self, reference_type: ReferenceType, reference_id: Uuid) {
        self.hashes.lock().remove(&(reference_type, reference_id));
    }

    pub fn is_warm(&self, reference_type: ReferenceType, reference_id: Uuid) -> bool {
        self.hashes.lock().contains_key(&(reference_type, reference_id))
    }
}

#[async_trait]
impl ReactionCountCache for FakeCountCache {
    async fn get_counts(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> RepoResult<HashMap<String, i64>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::CacheError("connection refused".into()));
        }
        Ok(self
            .hashes
            .lock()
            .get(&(reference_type, reference_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn apply_delta(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
        delta: &ReactionDelta,
    ) -> RepoResult<()> {
        let mut hashes = self.hashes.lock();
        let key = (reference_type, reference_id);
        let Some(hash) = hashes.get_mut(&key) else {
            return Ok(());
        };
        for (emoji, change) in delta.increments() {
            let count = hash.entry(emoji.to_string()).or_insert(0);
            *count += change;
            if *count <= 0 {
                hash.remove(emoji);
            }
        }
        if hash.is_empty() {
            hashes.remove(&key);
        }
        Ok(())
    }

    async fn replace_counts(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
        counts: &HashMap<String, i64>,
    ) -> RepoResult<()> {
        let positive: HashMap<String, i64> = counts
            .iter()
            .filter(|(_, c)| **c > 0)
            .map(|(e, c)| (e.clone(), *c))
            .collect();
        let mut hashes = self.hashes.lock();
        if positive.is_empty() {
            hashes.remove(&(reference_type, reference_id));
        } else {
            hashes.insert((reference_type, reference_id), positive);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeViewCounter {
    markers: Mutex<HashSet<(Uuid, Uuid)>>,
    counters: Mutex<HashMap<Uuid, i64>>,
    pending: Mutex<HashSet<Uuid>>,
}

impl FakeViewCounter {
    pub fn counter(&self, thread_id: Uuid) -> i64 {
        self.counters.lock().get(&thread_id).copied().unwrap_or(0)
    }

    pub fn is_pending(&self, thread_id: Uuid) -> bool {
        self.pending.lock().contains(&thread_id)
    }

    /// Simulate the dedup marker expiring
    pub fn expire_markers(&self) {
        self.markers.lock().clear();
    }
}

#[async_trait]
impl ViewCounterStore for FakeViewCounter {
    async fn record_view(&self, thread_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        if !self.markers.lock().insert((thread_id, user_id)) {
            return Ok(false);
        }
        *self.counters.lock().entry(thread_id).or_insert(0) += 1;
        self.pending.lock().insert(thread_id);
        Ok(true)
    }

    async fn pending_threads(&self) -> RepoResult<Vec<Uuid>> {
        Ok(self.pending.lock().iter().copied().collect())
    }

    async fn take_pending(&self, thread_id: Uuid) -> RepoResult<i64> {
        self.pending.lock().remove(&thread_id);
        Ok(self.counters.lock().remove(&thread_id).unwrap_or(0))
    }

    async fn restore(&self, thread_id: Uuid, delta: i64) -> RepoResult<()> {
        *self.counters.lock().entry(thread_id).or_insert(0) += delta;
        self.pending.lock().insert(thread_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRateLimits {
    locks: Mutex<HashMap<(Uuid, RateLimitScope), Instant>>,
}

impl FakeRateLimits {
    pub fn is_locked(&self, user_id: Uuid, scope: RateLimitScope) -> bool {
        self.locks
            .lock()
            .get(&(user_id, scope))
            .is_some_and(|expiry| *expiry > Instant::now())
    }
}

#[async_trait]
impl RateLimitStore for FakeRateLimits {
    async fn try_acquire(
        &self,
        user_id: Uuid,
        scope: RateLimitScope,
        window: Duration,
    ) -> RepoResult<bool> {
        if window.is_zero() {
            return Ok(true);
        }
        let now = Instant::now();
        let mut locks = self.locks.lock();
        match locks.get(&(user_id, scope)) {
            Some(expiry) if *expiry > now => Ok(false),
            _ => {
                locks.insert((user_id, scope), now + window);
                Ok(true)
            }
        }
    }

    async fn remaining(&self, user_id: Uuid, scope: RateLimitScope) -> RepoResult<Duration> {
        let now = Instant::now();
        Ok(self
            .locks
            .lock()
            .get(&(user_id, scope))
            .map_or(Duration::ZERO, |expiry| expiry.saturating_duration_since(now)))
    }

    async fn release(&self, user_id: Uuid, scope: RateLimitScope) -> RepoResult<()> {
        self.locks.lock().remove(&(user_id, scope));
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

/// Every fake, shared with the context built from them
pub struct Harness {
    pub users: Arc<FakeUsers>,
    pub content: Arc<FakeContent>,
    pub reactions: Arc<FakeReactions>,
    pub leaderboard: Arc<FakeLeaderboard>,
    pub notifications: Arc<FakeNotifications>,
    pub counts: Arc<FakeCountCache>,
    pub views: Arc<FakeViewCounter>,
    pub rate_limits: Arc<FakeRateLimits>,
    pub ctx: ServiceContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        let users = Arc::new(FakeUsers::default());
        let content = Arc::new(FakeContent::default());
        let reactions = Arc::new(FakeReactions::default());
        let leaderboard = Arc::new(FakeLeaderboard::new(Arc::clone(&users)));
        let notifications = Arc::new(FakeNotifications::default());
        let counts = Arc::new(FakeCountCache::default());
        let views = Arc::new(FakeViewCounter::default());
        let rate_limits = Arc::new(FakeRateLimits::default());

        let ctx = ServiceContextBuilder::new()
            .user_repo(users.clone())
            .thread_repo(content.clone())
            .post_repo(content.clone())
            .reaction_repo(reactions.clone())
            .leaderboard_repo(leaderboard.clone())
            .notification_sink(notifications.clone())
            .reaction_cache(counts.clone())
            .view_counter(views.clone())
            .rate_limit_store(rate_limits.clone())
            .task_queue(TaskQueue::new(&TaskQueueConfig {
                workers: 2,
                capacity: 64,
            }))
            .settings(settings)
            .build()
            .expect("all ports provided");

        Self {
            users,
            content,
            reactions,
            leaderboard,
            notifications,
            counts,
            views,
            rate_limits,
            ctx,
        }
    }

    /// Wait for queued side effects
    pub async fn settle(&self) {
        self.ctx.task_queue().wait_idle().await;
    }
}
