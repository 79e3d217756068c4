//! Chat member update handlers
//!
//! `my_chat_member` updates describe the bot's own status, `chat_member`
//! updates describe everybody else. Both are reduced to a coarse status before
//! being handed to the lifecycle service.

use teloxide::types::{ChatMember, ChatMemberUpdated};
use tracing::debug;
use crate::models::UserProfile;
use crate::services::{BotStatus, MemberChange, ServiceFactory};
use crate::utils::errors::Result;

/// Coarse membership status of a user in a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceStatus {
    Absent,
    Present,
    Admin,
}

impl From<&ChatMember> for PresenceStatus {
    fn from(member: &ChatMember) -> Self {
        if member.kind.is_privileged() {
            PresenceStatus::Admin
        } else if member.kind.is_present() {
            PresenceStatus::Present
        } else {
            PresenceStatus::Absent
        }
    }
}

/// The bot's status after an update
pub fn bot_status(new: PresenceStatus) -> BotStatus {
    match new {
        PresenceStatus::Admin => BotStatus::Administrator,
        PresenceStatus::Present => BotStatus::Member,
        PresenceStatus::Absent => BotStatus::Gone,
    }
}

/// What a status transition means for tracking, `None` when nothing changed
pub fn member_change(old: PresenceStatus, new: PresenceStatus) -> Option<MemberChange> {
    use PresenceStatus::*;

    match (old, new) {
        (Absent, Present) => Some(MemberChange::Joined),
        (Absent | Present, Admin) => Some(MemberChange::Promoted),
        (Admin, Present) => Some(MemberChange::Demoted),
        (Present | Admin, Absent) => Some(MemberChange::Left),
        _ => None,
    }
}

/// Handle an update of the bot's own membership
pub async fn handle_my_chat_member(update: ChatMemberUpdated, services: ServiceFactory) -> Result<()> {
    let status = bot_status(PresenceStatus::from(&update.new_chat_member));
    let chat_name = update.chat.title().unwrap_or_default();
    let actor = UserProfile::from(&update.from);

    let outcome = services
        .lifecycle_service
        .bot_status_changed(update.chat.id.0, chat_name, &actor, status)
        .await?;

    debug!(chat_id = update.chat.id.0, outcome = ?outcome, "Bot status change handled");
    Ok(())
}

/// Handle a membership update of another user
pub async fn handle_chat_member(update: ChatMemberUpdated, services: ServiceFactory) -> Result<()> {
    let old = PresenceStatus::from(&update.old_chat_member);
    let new = PresenceStatus::from(&update.new_chat_member);

    let Some(change) = member_change(old, new) else {
        return Ok(());
    };

    let user = UserProfile::from(&update.new_chat_member.user);
    services
        .lifecycle_service
        .member_changed(update.chat.id.0, &user, change)
        .await?;

    Ok(())
}
