//! Bot handlers module
//!
//! This module contains all Telegram update handlers organized by type:
//! - Message handlers for group messages and join service messages
//! - Member handlers for `my_chat_member` and `chat_member` updates

pub mod members;
pub mod messages;

// Re-export commonly used handler functions
pub use members::{handle_chat_member, handle_my_chat_member};
pub use messages::{handle_group_message, handle_new_chat_members};
