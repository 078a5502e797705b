//! Point ledger entity <- model mappers

use engage_core::entities::{ScoreRow, UserStats};

use crate::models::{ScoreRowModel, UserStatsModel};

impl From<UserStatsModel> for UserStats {
    fn from(model: UserStatsModel) -> Self {
        UserStats {
            user_id: model.user_id,
            total_all_time: model.total_all_time,
            last_updated_at: model.last_updated_at,
        }
    }
}

impl From<ScoreRowModel> for ScoreRow {
    fn from(model: ScoreRowModel) -> Self {
        ScoreRow {
            user_id: model.user_id,
            username: model.username,
            avatar_url: model.avatar_url,
            role: model.role,
            score: model.score,
        }
    }
}
