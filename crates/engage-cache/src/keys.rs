//! Redis key layout

use engage_core::entities::ReferenceType;
use engage_core::value_objects::RateLimitScope;
use uuid::Uuid;

/// Set of thread ids with unflushed views
pub const PENDING_VIEWS_KEY: &str = "pending:thread_views";

/// Reaction count hash for a reference
pub fn reaction_counts(reference_type: ReferenceType, reference_id: Uuid) -> String {
    format!("counts:{reference_type}:{reference_id}")
}

/// Accumulated view counter for a thread
pub fn thread_views(thread_id: Uuid) -> String {
    format!("thread:views:{thread_id}")
}

/// Per-user view dedup marker
pub fn thread_user_view(thread_id: Uuid, user_id: Uuid) -> String {
    format!("thread:user_view:{thread_id}:{user_id}")
}

/// Cooldown lock
pub fn rate_limit(user_id: Uuid, scope: RateLimitScope) -> String {
    format!("rate_limit:user:{user_id}:{scope}")
}

/// Per-user notification channel
pub fn notification_channel(user_id: Uuid) -> String {
    format!("notifications:{user_id}")
}
