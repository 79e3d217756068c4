//! Shamebot Telegram Bot
//!
//! Tracks when members of group chats were last active and tells the chat's
//! administrators about members who have gone quiet. This library provides the
//! membership store, the activity recorder, the staleness evaluator and the
//! notification scheduler, plus the teloxide handlers feeding them.

pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ShamebotError, Result};

// Re-export main components for easy access
pub use database::{MembershipStore, MemoryStore, PgMembershipStore};
pub use services::{ActivityRecorder, NotificationScheduler, ServiceFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
