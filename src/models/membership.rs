//! Membership model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::utils::errors::ShamebotError;

/// Role a user holds in a chat. A (user, chat) pair has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ShamebotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            other => Err(ShamebotError::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub chat_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub role: Role,
    /// Unix seconds of the last qualifying signal, 0 when never active
    pub last_active_time: i64,
    /// Unix seconds of the last report about this member, 0 when never reported
    pub last_notified_time: i64,
    pub is_muted: bool,
}

impl Membership {
    pub fn new(chat_id: i64, user_id: i64, user_name: impl Into<String>, role: Role) -> Self {
        Self {
            chat_id,
            user_id,
            user_name: user_name.into(),
            role,
            last_active_time: 0,
            last_notified_time: 0,
            is_muted: false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
