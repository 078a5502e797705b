//! Thread/post entity <- model mappers

use engage_core::entities::{Post, Thread, ThreadSummary};

use crate::models::{PostModel, ThreadModel, TrendingThreadModel};

impl From<ThreadModel> for Thread {
    fn from(model: ThreadModel) -> Self {
        Thread {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            slug: model.slug,
            content: model.content,
            views: model.views,
            created_at: model.created_at,
        }
    }
}

impl From<PostModel> for Post {
    fn from(model: PostModel) -> Self {
        Post {
            id: model.id,
            thread_id: model.thread_id,
            user_id: model.user_id,
            parent_id: model.parent_id,
            content: model.content,
            created_at: model.created_at,
        }
    }
}

impl From<TrendingThreadModel> for ThreadSummary {
    fn from(model: TrendingThreadModel) -> Self {
        ThreadSummary {
            id: model.id,
            title: model.title,
            slug: model.slug,
            author_id: model.author_id,
            views: model.views,
            reaction_count: model.reaction_count,
            reply_count: model.reply_count,
            created_at: model.created_at,
            score: model.score,
        }
    }
}
