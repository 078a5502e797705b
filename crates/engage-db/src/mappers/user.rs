//! User entity <- model mapper

use engage_core::entities::User;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: model.id,
            username: model.username,
            avatar_url: model.avatar_url,
            role: model.role,
            created_at: model.created_at,
        }
    }
}
