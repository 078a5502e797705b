//! # engage-common
//!
//! Shared utilities including configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    parse_duration, AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment,
    GamificationConfig, RateLimitConfig, RedisConfig, ServerConfig, TaskQueueConfig,
    ViewSyncConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
