//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod chat;
pub mod membership;
pub mod user;

// Re-export commonly used models
pub use chat::{Chat, ChatSettings, TriggerKind, Triggers};
pub use membership::{Membership, Role};
pub use user::{User, UserProfile};
