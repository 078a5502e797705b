//! Server setup and initialization
//!
//! Provides the application builder, dependency wiring, and the server runner with
//! graceful shutdown of the view sync worker and the background task queue.

use std::net::SocketAddr;

use axum::Router;
use engage_cache::RedisPool;
use engage_common::{AppConfig, AppError};
use engage_db::{create_pool, run_migrations};
use engage_service::{start_view_sync_worker, ServiceContext, TaskQueue};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: &AppConfig, task_queue: TaskQueue) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&config.database)
        .await
        .map_err(AppError::database)?;
    run_migrations(&pool).await.map_err(AppError::database)?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool = RedisPool::from_config(&config.redis).map_err(AppError::cache)?;
    if let Err(e) = redis_pool.health_check().await {
        // reaction counts fall back to Postgres until Redis is back
        warn!(error = %e, "Redis not reachable at startup");
    }

    let service_context =
        ServiceContext::from_infrastructure(pool.clone(), redis_pool.clone(), config, task_queue);

    Ok(AppState::new(service_context, pool, redis_pool))
}

/// Run the HTTP server until `shutdown` resolves
pub async fn run_server<F>(app: Router, addr: &str, shutdown: F) -> Result<(), AppError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {addr}: {e}")))?;

    let local: Option<SocketAddr> = listener.local_addr().ok();
    info!(address = ?local, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Server(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let task_queue = TaskQueue::new(&config.task_queue);
    let state = create_app_state(&config, task_queue.clone()).await?;

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let worker = start_view_sync_worker(state.service_context().clone(), async move {
        let _ = stop_rx.changed().await;
    });

    let app = create_app(state);
    let served = run_server(app, &config.api.address(), shutdown_signal()).await;

    info!("Shutting down background work...");
    let _ = stop_tx.send(true);
    if let Err(e) = worker.await {
        warn!(error = %e, "View sync worker ended abnormally");
    }
    task_queue.shutdown().await;
    info!("Shutdown complete");

    served
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
