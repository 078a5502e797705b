//! Integration tests for the Redis stores
//!
//! These tests require a running Redis server:
//!
//! ```bash
//! export REDIS_URL="redis://127.0.0.1:6379"
//! cargo test -p engage-cache --test redis_integration
//! ```

use std::collections::HashMap;
use std::time::Duration;

use redis::AsyncCommands;
use uuid::Uuid;

use engage_cache::keys;
use engage_cache::{
    RedisPool, RedisPoolConfig, RedisRateLimitStore, RedisReactionCountCache, RedisViewCounter,
};
use engage_core::entities::{ReactionDelta, ReferenceType};
use engage_core::traits::{RateLimitStore, ReactionCountCache, ViewCounterStore};
use engage_core::value_objects::RateLimitScope;

async fn get_test_pool() -> Option<RedisPool> {
    let url = std::env::var("REDIS_URL").ok()?;
    let pool = RedisPool::new(RedisPoolConfig {
        url,
        max_connections: 4,
    })
    .ok()?;
    pool.health_check().await.ok()?;
    Some(pool)
}

#[tokio::test]
async fn test_rate_limit_lock_and_expiry() {
    let Some(pool) = get_test_pool().await else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    let store = RedisRateLimitStore::new(pool);
    let user = Uuid::new_v4();
    let window = Duration::from_millis(300);

    assert!(store.try_acquire(user, RateLimitScope::Global, window).await.unwrap());
    assert!(!store.try_acquire(user, RateLimitScope::Global, window).await.unwrap());
    // scopes are independent
    assert!(store.try_acquire(user, RateLimitScope::Post, window).await.unwrap());

    let remaining = store.remaining(user, RateLimitScope::Global).await.unwrap();
    assert!(remaining > Duration::ZERO && remaining <= window);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(store.try_acquire(user, RateLimitScope::Global, window).await.unwrap());

    store.release(user, RateLimitScope::Global).await.unwrap();
    store.release(user, RateLimitScope::Post).await.unwrap();
    assert_eq!(
        store.remaining(user, RateLimitScope::Global).await.unwrap(),
        Duration::ZERO
    );
}

#[tokio::test]
async fn test_rate_limit_zero_window_always_allows() {
    let Some(pool) = get_test_pool().await else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    let store = RedisRateLimitStore::new(pool);
    let user = Uuid::new_v4();
    for _ in 0..3 {
        assert!(store
            .try_acquire(user, RateLimitScope::Thread, Duration::ZERO)
            .await
            .unwrap());
    }
}

#[tokio::test]
async fn test_rate_limit_key_without_ttl_self_heals() {
    let Some(pool) = get_test_pool().await else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    let user = Uuid::new_v4();
    let key = keys::rate_limit(user, RateLimitScope::Global);
    let mut conn = pool.get().await.unwrap();
    conn.set::<_, _, ()>(&key, "locked").await.unwrap();

    let store = RedisRateLimitStore::new(pool.clone());
    assert_eq!(
        store.remaining(user, RateLimitScope::Global).await.unwrap(),
        Duration::ZERO
    );
    let exists: bool = conn.exists(&key).await.unwrap();
    assert!(!exists);
}

#[tokio::test]
async fn test_count_cache_never_seeds_cold_key() {
    let Some(pool) = get_test_pool().await else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    let cache = RedisReactionCountCache::new(pool);
    let reference = Uuid::new_v4();
    let kind = ReferenceType::Thread;

    cache
        .apply_delta(kind, reference, &ReactionDelta::added("👍"))
        .await
        .unwrap();
    assert!(cache.get_counts(kind, reference).await.unwrap().is_empty());

    let counts = HashMap::from([("👍".to_string(), 2), ("😂".to_string(), 0)]);
    cache.replace_counts(kind, reference, &counts).await.unwrap();
    cache
        .apply_delta(kind, reference, &ReactionDelta::switched("👍", "❤️"))
        .await
        .unwrap();

    let cached = cache.get_counts(kind, reference).await.unwrap();
    assert_eq!(cached.get("👍"), Some(&1));
    assert_eq!(cached.get("❤️"), Some(&1));
    assert_eq!(cached.get("😂"), None);

    cache
        .replace_counts(kind, reference, &HashMap::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_view_counter_dedup_and_take() {
    let Some(pool) = get_test_pool().await else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    let views = RedisViewCounter::new(pool);
    let thread = Uuid::new_v4();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    assert!(views.record_view(thread, alice).await.unwrap());
    assert!(!views.record_view(thread, alice).await.unwrap());
    assert!(views.record_view(thread, bob).await.unwrap());

    assert!(views.pending_threads().await.unwrap().contains(&thread));
    assert_eq!(views.take_pending(thread).await.unwrap(), 2);
    assert!(!views.pending_threads().await.unwrap().contains(&thread));
    assert_eq!(views.take_pending(thread).await.unwrap(), 0);

    views.restore(thread, 2).await.unwrap();
    assert!(views.pending_threads().await.unwrap().contains(&thread));
    assert_eq!(views.take_pending(thread).await.unwrap(), 2);
}

#[tokio::test]
async fn test_malformed_pending_entry_is_removed() {
    let Some(pool) = get_test_pool().await else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    let junk = format!("junk-{}", Uuid::new_v4().simple());
    let mut conn = pool.get().await.unwrap();
    conn.sadd::<_, _, ()>(keys::PENDING_VIEWS_KEY, &junk)
        .await
        .unwrap();

    let views = RedisViewCounter::new(pool);
    views.pending_threads().await.unwrap();

    let still_pending: bool = conn
        .sismember(keys::PENDING_VIEWS_KEY, &junk)
        .await
        .unwrap();
    assert!(!still_pending);
}
