//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use std::env;
use std::time::Duration;

use engage_core::RateLimitScope;

use super::duration::parse_duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub rate_limit: RateLimitConfig,
    pub gamification: GamificationConfig,
    pub view_sync: ViewSyncConfig,
    pub task_queue: TaskQueueConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Per-scope cooldown windows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub global: Duration,
    pub thread: Duration,
    pub post: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global: Duration::from_secs(5),
            thread: Duration::from_secs(300),
            post: Duration::from_secs(15),
        }
    }
}

impl RateLimitConfig {
    /// Cooldown configured for a scope
    #[must_use]
    pub fn window(&self, scope: RateLimitScope) -> Duration {
        match scope {
            RateLimitScope::Global => self.global,
            RateLimitScope::Thread => self.thread,
            RateLimitScope::Post => self.post,
        }
    }
}

/// Point awarding settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamificationConfig {
    /// Accounts that never earn points
    pub bot_usernames: Vec<String>,
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            bot_usernames: vec![default_bot_username()],
        }
    }
}

/// View counter flush settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSyncConfig {
    pub interval: Duration,
}

impl Default for ViewSyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Background job queue sizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQueueConfig {
    pub workers: usize,
    pub capacity: usize,
}

impl Default for TaskQueueConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            capacity: 1024,
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "engage".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_bot_username() -> String {
    "Mading_Bot".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);
        let rate_defaults = RateLimitConfig::default();
        let queue_defaults = TaskQueueConfig::default();

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: vars
                    .get("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: vars.get("API_HOST").unwrap_or_else(default_host),
                port: vars.parsed::<u16>("API_PORT")?.unwrap_or_else(default_port),
            },
            database: DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars
                    .parsed::<u32>("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: vars
                    .parsed::<u32>("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            redis: RedisConfig {
                url: vars.required("REDIS_URL")?,
                max_connections: vars
                    .parsed::<u32>("REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_redis_max_connections),
            },
            rate_limit: RateLimitConfig {
                global: vars
                    .duration("RATE_LIMIT_GLOBAL")?
                    .unwrap_or(rate_defaults.global),
                thread: vars
                    .duration("RATE_LIMIT_THREAD")?
                    .unwrap_or(rate_defaults.thread),
                post: vars.duration("RATE_LIMIT_POST")?.unwrap_or(rate_defaults.post),
            },
            gamification: GamificationConfig {
                bot_usernames: vars
                    .get("GAMIFICATION_BOT_USERNAMES")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|name| !name.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_else(|| vec![default_bot_username()]),
            },
            view_sync: ViewSyncConfig {
                interval: vars
                    .duration("VIEW_SYNC_INTERVAL")?
                    .filter(|d| !d.is_zero())
                    .unwrap_or_else(|| ViewSyncConfig::default().interval),
            },
            task_queue: TaskQueueConfig {
                workers: vars
                    .parsed::<usize>("TASK_QUEUE_WORKERS")?
                    .filter(|n| *n > 0)
                    .unwrap_or(queue_defaults.workers),
                capacity: vars
                    .parsed::<usize>("TASK_QUEUE_CAPACITY")?
                    .filter(|n| *n > 0)
                    .unwrap_or(queue_defaults.capacity),
            },
        })
    }
}

/// Typed access over a key lookup
struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn parsed<T: std::str::FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key, raw.clone()))
            })
            .transpose()
    }

    fn duration(&self, key: &'static str) -> Result<Option<Duration>, ConfigError> {
        self.get(key)
            .map(|raw| parse_duration(&raw).ok_or(ConfigError::InvalidValue(key, raw.clone())))
            .transpose()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/engage"),
        ("REDIS_URL", "redis://localhost:6379"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.app.env, Environment::Development);
        assert_eq!(config.api.address(), "127.0.0.1:8080");
        assert_eq!(config.rate_limit, RateLimitConfig::default());
        assert_eq!(config.rate_limit.thread, Duration::from_secs(300));
        assert_eq!(config.gamification.bot_usernames, vec!["Mading_Bot"]);
        assert_eq!(config.view_sync.interval, Duration::from_secs(60));
        assert_eq!(config.task_queue, TaskQueueConfig::default());
    }

    #[test]
    fn test_missing_required() {
        let err = load(&[("REDIS_URL", "redis://x")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("APP_ENV", "Production"),
            ("API_PORT", "9000"),
            ("RATE_LIMIT_GLOBAL", "10"),
            ("RATE_LIMIT_THREAD", "2m"),
            ("RATE_LIMIT_POST", "500ms"),
            ("GAMIFICATION_BOT_USERNAMES", "bot_a, bot_b,,"),
            ("VIEW_SYNC_INTERVAL", "30s"),
            ("TASK_QUEUE_WORKERS", "8"),
        ]);
        let config = load(&pairs).unwrap();
        assert!(config.app.env.is_production());
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.rate_limit.global, Duration::from_secs(10));
        assert_eq!(config.rate_limit.thread, Duration::from_secs(120));
        assert_eq!(config.rate_limit.post, Duration::from_millis(500));
        assert_eq!(config.gamification.bot_usernames, vec!["bot_a", "bot_b"]);
        assert_eq!(config.view_sync.interval, Duration::from_secs(30));
        assert_eq!(config.task_queue.workers, 8);
        assert_eq!(config.task_queue.capacity, 1024);
    }

    #[test]
    fn test_invalid_duration() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("RATE_LIMIT_GLOBAL", "soon"));
        let err = load(&pairs).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("RATE_LIMIT_GLOBAL", _)));
    }
}
