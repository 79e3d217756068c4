//! Message handlers module
//!
//! Handles group messages (activity signals) and new member service messages

use teloxide::types::{Chat, Message};
use tracing::debug;
use crate::models::UserProfile;
use crate::services::{ActivitySignal, ContentKind, MemberChange, ServiceFactory};
use crate::utils::errors::Result;

/// Only groups and supergroups are tracked
pub fn is_tracked_chat(chat: &Chat) -> bool {
    chat.is_group() || chat.is_supergroup()
}

/// Content kind of a message, `None` for kinds that never count as activity
pub fn content_kind(msg: &Message) -> Option<ContentKind> {
    if msg.text().is_some() {
        Some(ContentKind::Text)
    } else if msg.photo().is_some() {
        Some(ContentKind::Photo)
    } else if msg.video().is_some() {
        Some(ContentKind::Video)
    } else if msg.voice().is_some() {
        Some(ContentKind::Voice)
    } else if msg.video_note().is_some() {
        Some(ContentKind::VideoNote)
    } else {
        None
    }
}

/// Handle a message posted in a group
pub async fn handle_group_message(msg: Message, services: ServiceFactory) -> Result<()> {
    if !is_tracked_chat(&msg.chat) {
        return Ok(());
    }

    let Some(kind) = content_kind(&msg) else {
        debug!(chat_id = msg.chat.id.0, message_id = msg.id.0, "Ignoring message of untracked kind");
        return Ok(());
    };

    let sender = msg.from.as_ref().map(UserProfile::from);
    services
        .activity_recorder
        .record_activity(msg.chat.id.0, sender.as_ref(), ActivitySignal::Message(kind))
        .await?;

    Ok(())
}

/// Handle new chat member events
pub async fn handle_new_chat_members(msg: Message, services: ServiceFactory) -> Result<()> {
    if !is_tracked_chat(&msg.chat) {
        return Ok(());
    }

    if let Some(new_members) = msg.new_chat_members() {
        for member in new_members.iter().filter(|member| !member.is_bot) {
            debug!(user_id = member.id.0, chat_id = msg.chat.id.0, "New member joined chat");
            services
                .lifecycle_service
                .member_changed(msg.chat.id.0, &UserProfile::from(member), MemberChange::Joined)
                .await?;
        }
    }

    Ok(())
}
