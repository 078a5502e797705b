//! Configuration structs

mod app_config;
mod duration;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, GamificationConfig,
    RateLimitConfig, RedisConfig, ServerConfig, TaskQueueConfig, ViewSyncConfig,
};
pub use duration::parse_duration;
