//! Service context - dependency container for services
//!
//! Holds every port (repositories, cache stores, notification sink), the background
//! task queue and the engine settings needed by services.

use std::sync::Arc;

use engage_cache::{
    RedisNotificationPublisher, RedisPool, RedisRateLimitStore, RedisReactionCountCache,
    RedisViewCounter,
};
use engage_common::{AppConfig, GamificationConfig, RateLimitConfig, ViewSyncConfig};
use engage_core::traits::{
    LeaderboardRepository, NotificationSink, PostRepository, RateLimitStore, ReactionCountCache,
    ReactionRepository, ThreadRepository, UserRepository, ViewCounterStore,
};
use engage_db::{
    PgLeaderboardRepository, PgNotificationRepository, PgPool, PgPostRepository,
    PgReactionRepository, PgThreadRepository, PgUserRepository,
};

use super::error::{ServiceError, ServiceResult};
use super::notification::FanoutNotificationSink;
use crate::runtime::{SingleFlight, TaskQueue};

/// Tunables the engines read at call time
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub rate_limit: RateLimitConfig,
    pub gamification: GamificationConfig,
    pub view_sync: ViewSyncConfig,
}

impl From<&AppConfig> for EngineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            rate_limit: config.rate_limit.clone(),
            gamification: config.gamification.clone(),
            view_sync: config.view_sync.clone(),
        }
    }
}

/// Service context containing all dependencies
///
/// Cloning is cheap; background jobs take their own clone so they outlive the
/// request that queued them.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    thread_repo: Arc<dyn ThreadRepository>,
    post_repo: Arc<dyn PostRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    leaderboard_repo: Arc<dyn LeaderboardRepository>,
    notification_sink: Arc<dyn NotificationSink>,

    // Cache stores
    reaction_cache: Arc<dyn ReactionCountCache>,
    view_counter: Arc<dyn ViewCounterStore>,
    rate_limit_store: Arc<dyn RateLimitStore>,

    // Runtime
    task_queue: TaskQueue,
    rebuild_locks: Arc<SingleFlight>,
    settings: Arc<EngineSettings>,
}

impl ServiceContext {
    /// Wire the Postgres repositories and Redis stores.
    /// Notifications are persisted first and then published on the user's channel.
    pub fn from_infrastructure(
        pool: PgPool,
        redis_pool: RedisPool,
        config: &AppConfig,
        task_queue: TaskQueue,
    ) -> Self {
        let notification_sink = FanoutNotificationSink::new(Arc::new(
            PgNotificationRepository::new(pool.clone()),
        ))
        .with_secondary(Arc::new(RedisNotificationPublisher::new(redis_pool.clone())));

        Self {
            user_repo: Arc::new(PgUserRepository::new(pool.clone())),
            thread_repo: Arc::new(PgThreadRepository::new(pool.clone())),
            post_repo: Arc::new(PgPostRepository::new(pool.clone())),
            reaction_repo: Arc::new(PgReactionRepository::new(pool.clone())),
            leaderboard_repo: Arc::new(PgLeaderboardRepository::new(pool)),
            notification_sink: Arc::new(notification_sink),
            reaction_cache: Arc::new(RedisReactionCountCache::new(redis_pool.clone())),
            view_counter: Arc::new(RedisViewCounter::new(redis_pool.clone())),
            rate_limit_store: Arc::new(RedisRateLimitStore::new(redis_pool)),
            task_queue,
            rebuild_locks: Arc::new(SingleFlight::new()),
            settings: Arc::new(EngineSettings::from(config)),
        }
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the thread repository
    pub fn thread_repo(&self) -> &dyn ThreadRepository {
        self.thread_repo.as_ref()
    }

    /// Get the post repository
    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    /// Get the reaction repository
    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    /// Get the leaderboard repository
    pub fn leaderboard_repo(&self) -> &dyn LeaderboardRepository {
        self.leaderboard_repo.as_ref()
    }

    /// Get the notification sink
    pub fn notification_sink(&self) -> &dyn NotificationSink {
        self.notification_sink.as_ref()
    }

    // === Cache Stores ===

    /// Get the reaction count cache
    pub fn reaction_cache(&self) -> &dyn ReactionCountCache {
        self.reaction_cache.as_ref()
    }

    /// Get the view counter store
    pub fn view_counter(&self) -> &dyn ViewCounterStore {
        self.view_counter.as_ref()
    }

    /// Get the rate limit store
    pub fn rate_limit_store(&self) -> &dyn RateLimitStore {
        self.rate_limit_store.as_ref()
    }

    pub(crate) fn rate_limit_store_handle(&self) -> Arc<dyn RateLimitStore> {
        Arc::clone(&self.rate_limit_store)
    }

    // === Runtime ===

    /// Get the background task queue
    pub fn task_queue(&self) -> &TaskQueue {
        &self.task_queue
    }

    /// Per-key cache rebuild locks
    pub fn rebuild_locks(&self) -> &SingleFlight {
        self.rebuild_locks.as_ref()
    }

    /// Get the engine settings
    pub fn settings(&self) -> &EngineSettings {
        self.settings.as_ref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("cache_stores", &"...")
            .field("task_queue", &self.task_queue)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom ports
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    thread_repo: Option<Arc<dyn ThreadRepository>>,
    post_repo: Option<Arc<dyn PostRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    leaderboard_repo: Option<Arc<dyn LeaderboardRepository>>,
    notification_sink: Option<Arc<dyn NotificationSink>>,
    reaction_cache: Option<Arc<dyn ReactionCountCache>>,
    view_counter: Option<Arc<dyn ViewCounterStore>>,
    rate_limit_store: Option<Arc<dyn RateLimitStore>>,
    task_queue: Option<TaskQueue>,
    settings: EngineSettings,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            thread_repo: None,
            post_repo: None,
            reaction_repo: None,
            leaderboard_repo: None,
            notification_sink: None,
            reaction_cache: None,
            view_counter: None,
            rate_limit_store: None,
            task_queue: None,
            settings: EngineSettings::default(),
        }
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn thread_repo(mut self, repo: Arc<dyn ThreadRepository>) -> Self {
        self.thread_repo = Some(repo);
        self
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn leaderboard_repo(mut self, repo: Arc<dyn LeaderboardRepository>) -> Self {
        self.leaderboard_repo = Some(repo);
        self
    }

    pub fn notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    pub fn reaction_cache(mut self, cache: Arc<dyn ReactionCountCache>) -> Self {
        self.reaction_cache = Some(cache);
        self
    }

    pub fn view_counter(mut self, store: Arc<dyn ViewCounterStore>) -> Self {
        self.view_counter = Some(store);
        self
    }

    pub fn rate_limit_store(mut self, store: Arc<dyn RateLimitStore>) -> Self {
        self.rate_limit_store = Some(store);
        self
    }

    pub fn task_queue(mut self, queue: TaskQueue) -> Self {
        self.task_queue = Some(queue);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            user_repo: required(self.user_repo, "user_repo")?,
            thread_repo: required(self.thread_repo, "thread_repo")?,
            post_repo: required(self.post_repo, "post_repo")?,
            reaction_repo: required(self.reaction_repo, "reaction_repo")?,
            leaderboard_repo: required(self.leaderboard_repo, "leaderboard_repo")?,
            notification_sink: required(self.notification_sink, "notification_sink")?,
            reaction_cache: required(self.reaction_cache, "reaction_cache")?,
            view_counter: required(self.view_counter, "view_counter")?,
            rate_limit_store: required(self.rate_limit_store, "rate_limit_store")?,
            task_queue: required(self.task_queue, "task_queue")?,
            rebuild_locks: Arc::new(SingleFlight::new()),
            settings: Arc::new(self.settings),
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
}
