//! Bounded background job queue
//!
//! Side effects (point awards, notifications) are submitted here instead of being
//! spawned directly. A fixed number of jobs run at once; when the buffer is full the
//! job is dropped with a warning and the request that triggered it is never blocked.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use engage_common::TaskQueueConfig;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Notify, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

struct QueuedJob {
    name: &'static str,
    job: BoxFuture<'static, ()>,
}

/// Counts submitted jobs that have not finished yet
#[derive(Default)]
struct Tracker {
    pending: AtomicUsize,
    idle: Notify,
}

impl Tracker {
    fn finish_one(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

struct Inner {
    sender: Mutex<Option<mpsc::Sender<QueuedJob>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    tracker: Arc<Tracker>,
}

/// Handle to the worker pool. Cheap to clone.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<Inner>,
}

impl TaskQueue {
    /// Start the dispatcher. Must be called from within a tokio runtime.
    pub fn new(config: &TaskQueueConfig) -> Self {
        let workers = config.workers.max(1);
        let capacity = config.capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let tracker = Arc::new(Tracker::default());

        let dispatcher = tokio::spawn(run_dispatcher(receiver, workers, Arc::clone(&tracker)));
        info!(workers, capacity, "Task queue started");

        Self {
            inner: Arc::new(Inner {
                sender: Mutex::new(Some(sender)),
                dispatcher: Mutex::new(Some(dispatcher)),
                tracker,
            }),
        }
    }

    /// Queue a job. Returns false when the job was dropped (queue full or shut down).
    pub fn submit<F>(&self, name: &'static str, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sender = self.inner.sender.lock();
        let Some(sender) = sender.as_ref() else {
            warn!(job = name, "Task queue is shut down, dropping job");
            return false;
        };

        self.inner.tracker.pending.fetch_add(1, Ordering::AcqRel);
        let queued = QueuedJob {
            name,
            job: Box::pin(job),
        };
        match sender.try_send(queued) {
            Ok(()) => {
                debug!(job = name, "Job queued");
                true
            }
            Err(TrySendError::Full(_)) => {
                self.inner.tracker.finish_one();
                warn!(job = name, "Task queue is full, dropping job");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.inner.tracker.finish_one();
                warn!(job = name, "Task queue is closed, dropping job");
                false
            }
        }
    }

    /// Jobs queued or running
    pub fn pending(&self) -> usize {
        self.inner.tracker.pending.load(Ordering::Acquire)
    }

    /// Wait until every submitted job has finished
    pub async fn wait_idle(&self) {
        let tracker = &self.inner.tracker;
        loop {
            let notified = tracker.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if tracker.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stop accepting jobs, drain what is queued, and wait for running jobs
    pub async fn shutdown(&self) {
        drop(self.inner.sender.lock().take());
        let dispatcher = self.inner.dispatcher.lock().take();
        if let Some(handle) = dispatcher {
            if let Err(e) = handle.await {
                error!(error = %e, "Task queue dispatcher failed");
            }
        }
        info!("Task queue stopped");
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

async fn run_dispatcher(
    mut receiver: mpsc::Receiver<QueuedJob>,
    workers: usize,
    tracker: Arc<Tracker>,
) {
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut running = JoinSet::new();

    while let Some(QueuedJob { name, job }) = receiver.recv().await {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let tracker = Arc::clone(&tracker);

        running.spawn(async move {
            let _permit = permit;
            // a panicking job must still release its pending slot
            if let Err(e) = tokio::spawn(job).await {
                error!(job = name, error = %e, "Background job panicked");
            }
            tracker.finish_one();
        });

        while running.try_join_next().is_some() {}
    }

    while running.join_next().await.is_some() {}
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;

    fn config(workers: usize, capacity: usize) -> TaskQueueConfig {
        TaskQueueConfig { workers, capacity }
    }

    #[tokio::test]
    async fn test_runs_jobs_and_waits_idle() {
        let queue = TaskQueue::new(&config(2, 16));
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let done = Arc::clone(&done);
            assert!(queue.submit("count", async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                done.fetch_add(1, Ordering::SeqCst);
            }));
        }

        queue.wait_idle().await;
        assert_eq!(done.load(Ordering::SeqCst), 10);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_full_queue_drops_job() {
        let queue = TaskQueue::new(&config(1, 1));
        let gate = Arc::new(Notify::new());

        // occupies the only worker
        let blocker = Arc::clone(&gate);
        assert!(queue.submit("block", async move { blocker.notified().await }));
        tokio::time::sleep(Duration::from_millis(20)).await;

        // held by the dispatcher while it waits for a worker
        assert!(queue.submit("waiting", async {}));
        tokio::time::sleep(Duration::from_millis(20)).await;

        // fills the buffer
        assert!(queue.submit("buffered", async {}));
        assert!(!queue.submit("overflow", async {}));

        gate.notify_one();
        queue.wait_idle().await;
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_wedge_queue() {
        let queue = TaskQueue::new(&config(1, 4));
        assert!(queue.submit("panic", async { panic!("job failed") }));
        queue.wait_idle().await;

        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        assert!(queue.submit("after", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        queue.wait_idle().await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_jobs() {
        let queue = TaskQueue::new(&config(1, 4));
        queue.shutdown().await;
        assert!(!queue.submit("late", async {}));
    }
}
