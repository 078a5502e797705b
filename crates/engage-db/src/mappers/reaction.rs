//! Reaction entity <- model mapper

use std::collections::HashMap;

use engage_core::entities::{Reaction, ReferenceType};
use engage_core::error::DomainError;

use crate::models::{ReactionCountModel, ReactionModel};

impl TryFrom<ReactionModel> for Reaction {
    type Error = DomainError;

    fn try_from(model: ReactionModel) -> Result<Self, Self::Error> {
        Ok(Reaction {
            user_id: model.user_id,
            reference_id: model.reference_id,
            reference_type: model.reference_type.parse::<ReferenceType>()?,
            emoji: model.emoji,
            created_at: model.created_at,
        })
    }
}

/// Collect aggregate rows into an emoji → count map
pub fn counts_by_emoji(rows: Vec<ReactionCountModel>) -> HashMap<String, i64> {
    rows.into_iter().map(|row| (row.emoji, row.count)).collect()
}
