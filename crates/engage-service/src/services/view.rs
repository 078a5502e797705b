//! View service
//!
//! Views accumulate in the cache with a one-hour per-user dedup marker and are
//! flushed onto `threads.views` by a periodic worker.

use std::future::Future;

use engage_core::DomainError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// What one flush did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Threads that were pending at the start of the tick
    pub threads: usize,
    /// Views written to the database
    pub flushed: i64,
    /// Views discarded because their thread no longer exists
    pub dropped: i64,
    /// Threads put back for the next tick after a failure
    pub restored: usize,
}

/// View service
pub struct ViewService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ViewService<'a> {
    /// Create a new ViewService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Count a view; returns false when the user already viewed within the hour
    #[instrument(skip(self))]
    pub async fn increment_view(&self, thread_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        let counted = self.ctx.view_counter().record_view(thread_id, user_id).await?;
        debug!(counted, "View recorded");
        Ok(counted)
    }

    /// Flush every pending counter once. Per-thread failures never abort the tick.
    #[instrument(skip(self))]
    pub async fn sync_views_once(&self) -> ServiceResult<SyncReport> {
        let store = self.ctx.view_counter();
        let pending = store.pending_threads().await?;
        let mut report = SyncReport {
            threads: pending.len(),
            ..SyncReport::default()
        };

        for thread_id in pending {
            let delta = match store.take_pending(thread_id).await {
                Ok(delta) => delta,
                Err(e) => {
                    warn!(thread_id = %thread_id, error = %e, "Failed to take pending views");
                    continue;
                }
            };
            if delta <= 0 {
                continue;
            }

            match self.ctx.thread_repo().add_views(thread_id, delta).await {
                Ok(()) => report.flushed += delta,
                Err(DomainError::ThreadNotFound(_)) => {
                    warn!(thread_id = %thread_id, delta, "Dropping views for deleted thread");
                    report.dropped += delta;
                }
                Err(e) => {
                    warn!(thread_id = %thread_id, delta, error = %e, "Failed to flush views, restoring");
                    if let Err(restore_err) = store.restore(thread_id, delta).await {
                        error!(
                            thread_id = %thread_id,
                            delta,
                            error = %restore_err,
                            "Failed to restore views; delta lost"
                        );
                    } else {
                        report.restored += 1;
                    }
                }
            }
        }

        if report.threads > 0 {
            info!(
                threads = report.threads,
                flushed = report.flushed,
                dropped = report.dropped,
                restored = report.restored,
                "Synced thread views"
            );
        }
        Ok(report)
    }
}

/// Run [`ViewService::sync_views_once`] on the configured interval until `shutdown` resolves
pub fn start_view_sync_worker<S>(ctx: ServiceContext, shutdown: S) -> JoinHandle<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let period = ctx.settings().view_sync.interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;
        tokio::pin!(shutdown);

        info!(interval_secs = period.as_secs(), "View sync worker started");
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    if let Err(e) = ViewService::new(&ctx).sync_views_once().await {
                        warn!(error = %e, "View sync tick failed");
                    }
                }
            }
        }
        info!("View sync worker stopped");
    })
}
