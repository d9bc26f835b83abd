use crate::entities::users::User as UserEntity;
use serde::{Deserialize, Serialize};

/// Display fields of a user, resolved from the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub headline: Option<String>,
}

impl From<UserEntity> for UserInfo {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            avatar_url: value.avatar_url,
            headline: value.headline,
        }
    }
}
