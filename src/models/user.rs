//! User model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub user_name: String,
}

/// Identity of a Telegram user as seen in an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub user_name: String,
    pub is_bot: bool,
}

impl UserProfile {
    pub fn new(id: i64, user_name: impl Into<String>) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            is_bot: false,
        }
    }
}

impl From<&teloxide::types::User> for UserProfile {
    fn from(user: &teloxide::types::User) -> Self {
        Self {
            id: user.id.0 as i64,
            user_name: user.username.clone().unwrap_or_default(),
            is_bot: user.is_bot,
        }
    }
}

impl From<&UserProfile> for User {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            user_name: profile.user_name.clone(),
        }
    }
}
