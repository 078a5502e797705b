//! Rate limit service
//!
//! Per-user cooldown locks for write paths. A multi-scope acquisition is all or
//! nothing: when a later scope is refused, or the guarded operation fails, every
//! scope taken so far is released again.

use std::sync::Arc;
use std::time::Duration;

use engage_core::traits::RateLimitStore;
use engage_core::RateLimitScope;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Rate limit service
pub struct RateLimitService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RateLimitService<'a> {
    /// Create a new RateLimitService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Take the lock for `window`. True means the action is allowed.
    #[instrument(skip(self))]
    pub async fn check_and_set(
        &self,
        user_id: Uuid,
        scope: RateLimitScope,
        window: Duration,
    ) -> ServiceResult<bool> {
        Ok(self
            .ctx
            .rate_limit_store()
            .try_acquire(user_id, scope, window)
            .await?)
    }

    /// Remaining cooldown; zero when unlocked
    #[instrument(skip(self))]
    pub async fn ttl(&self, user_id: Uuid, scope: RateLimitScope) -> ServiceResult<Duration> {
        Ok(self.ctx.rate_limit_store().remaining(user_id, scope).await?)
    }

    /// Explicit unlock
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Uuid, scope: RateLimitScope) -> ServiceResult<()> {
        Ok(self.ctx.rate_limit_store().release(user_id, scope).await?)
    }

    /// Acquire `scopes` in order with their configured windows.
    ///
    /// Returns `ServiceError::RateLimited` for the first refused scope after releasing
    /// the ones already taken.
    #[instrument(skip(self))]
    pub async fn acquire(
        &self,
        user_id: Uuid,
        scopes: &[RateLimitScope],
    ) -> ServiceResult<RateLimitGuard> {
        let mut guard = RateLimitGuard {
            store: self.ctx.rate_limit_store_handle(),
            user_id,
            held: Vec::with_capacity(scopes.len()),
        };

        for &scope in scopes {
            let window = self.ctx.settings().rate_limit.window(scope);
            let allowed = match self.check_and_set(user_id, scope, window).await {
                Ok(allowed) => allowed,
                Err(e) => {
                    guard.rollback().await;
                    return Err(e);
                }
            };

            if !allowed {
                guard.rollback().await;
                let retry_after = self.ttl(user_id, scope).await.unwrap_or_else(|e| {
                    warn!(error = %e, scope = %scope, "Failed to read rate limit TTL");
                    window
                });
                info!(user_id = %user_id, scope = %scope, "Rate limited");
                return Err(ServiceError::rate_limited(
                    refusal_message(scope, window, retry_after),
                    retry_after,
                ));
            }

            guard.held.push(scope);
        }

        Ok(guard)
    }
}

/// Locks taken by [`RateLimitService::acquire`].
///
/// Call [`commit`](Self::commit) once the guarded action succeeded. Otherwise call
/// [`rollback`](Self::rollback); a guard dropped without either releases its locks
/// in the background.
#[must_use = "an uncommitted guard releases its locks when dropped"]
pub struct RateLimitGuard {
    store: Arc<dyn RateLimitStore>,
    user_id: Uuid,
    held: Vec<RateLimitScope>,
}

impl RateLimitGuard {
    /// Scopes currently held
    pub fn scopes(&self) -> &[RateLimitScope] {
        &self.held
    }

    /// Keep the locks; they expire with their windows
    pub fn commit(mut self) {
        self.held.clear();
    }

    /// Release every held lock now
    pub async fn rollback(&mut self) {
        let held = std::mem::take(&mut self.held);
        release_all(self.store.as_ref(), self.user_id, &held).await;
    }
}

impl Drop for RateLimitGuard {
    fn drop(&mut self) {
        if self.held.is_empty() {
            return;
        }
        let held = std::mem::take(&mut self.held);
        let store = Arc::clone(&self.store);
        let user_id = self.user_id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { release_all(store.as_ref(), user_id, &held).await });
            }
            Err(_) => warn!(user_id = %user_id, "Rate limit guard dropped outside a runtime"),
        }
    }
}

async fn release_all(store: &dyn RateLimitStore, user_id: Uuid, scopes: &[RateLimitScope]) {
    for &scope in scopes.iter().rev() {
        match store.release(user_id, scope).await {
            Ok(()) => debug!(user_id = %user_id, scope = %scope, "Rate limit released"),
            Err(e) => warn!(user_id = %user_id, scope = %scope, error = %e, "Failed to release rate limit"),
        }
    }
}

fn refusal_message(scope: RateLimitScope, window: Duration, remaining: Duration) -> String {
    match scope {
        RateLimitScope::Global => format!(
            "you are doing that too fast. Please wait {:.0} seconds",
            remaining.as_secs_f64()
        ),
        RateLimitScope::Thread => format!(
            "you can only create one thread every {:.0} minutes. Please wait {:.0} minutes",
            window.as_secs_f64() / 60.0,
            remaining.as_secs_f64() / 60.0
        ),
        RateLimitScope::Post => format!(
            "you can only create one post every {:.0} seconds. Please wait {:.0} seconds",
            window.as_secs_f64(),
            remaining.as_secs_f64()
        ),
    }
}
