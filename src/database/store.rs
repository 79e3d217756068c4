//! Membership store abstraction
//!
//! Every method is one unit of work: the Postgres implementation runs it in a
//! single transaction, the in-memory one under a single lock acquisition.
//! Absent entities are reported through `Option`/`bool` results, never as errors;
//! only store failures are returned as `Err`.

use async_trait::async_trait;
use crate::models::{Chat, ChatSettings, Membership, TriggerKind, User, UserProfile};
use crate::utils::errors::Result;

/// Result of registering a signal for a user in a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The user is tracked as a member; `refreshed` tells whether `last_active_time` moved
    Member { created: bool, refreshed: bool },
    /// The user administers the chat, nothing was written for them
    Admin,
}

/// A signal of the given kind observed at `at` (unix seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityMark {
    pub trigger: TriggerKind,
    pub at: i64,
}

impl ActivityMark {
    pub fn new(trigger: TriggerKind, at: i64) -> Self {
        Self { trigger, at }
    }
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn get_chat(&self, chat_id: i64) -> Result<Option<Chat>>;

    /// Insert the chat if unknown, otherwise refresh its name. Configuration is kept.
    async fn upsert_chat(&self, chat_id: i64, chat_name: &str) -> Result<Chat>;

    /// Delete the chat together with all its memberships
    async fn delete_chat(&self, chat_id: i64) -> Result<bool>;

    async fn set_bot_is_admin(&self, chat_id: i64, is_admin: bool) -> Result<bool>;

    /// Replace triggers and durations and mark setup as complete.
    /// Settings failing `ChatSettings::validate` are refused with `InvalidInput` before anything is written.
    async fn update_chat_settings(&self, chat_id: i64, settings: &ChatSettings) -> Result<Option<Chat>>;

    /// Chats with `notify_time > 0`, ordered by id
    async fn chats_with_notifications_enabled(&self) -> Result<Vec<Chat>>;

    async fn chats_administered_by(&self, user_id: i64) -> Result<Vec<Chat>>;

    async fn upsert_user(&self, profile: &UserProfile) -> Result<User>;

    /// Upsert the user and ensure a member row unless they are an admin.
    /// With a mark whose trigger is enabled on the chat as stored at write time,
    /// `last_active_time` moves to `mark.at`. `None` when the chat is unknown.
    async fn register_activity(
        &self,
        chat_id: i64,
        profile: &UserProfile,
        mark: Option<ActivityMark>,
    ) -> Result<Option<RegisterOutcome>>;

    /// Move the user into the admin role. `false` when the chat is unknown.
    /// A real role change starts the row over: unmuted, never active, never notified.
    async fn promote_to_admin(&self, chat_id: i64, profile: &UserProfile) -> Result<bool>;

    /// Move the user into the member role. `false` when the chat is unknown.
    /// Resets the row like `promote_to_admin` when the role actually changes.
    async fn demote_to_member(&self, chat_id: i64, profile: &UserProfile) -> Result<bool>;

    /// Promote every listed user; admins missing from the list are left alone.
    /// Returns the number of admins written, `None` when the chat is unknown.
    async fn refresh_admins(&self, chat_id: i64, admins: &[UserProfile]) -> Result<Option<usize>>;

    async fn remove_membership(&self, chat_id: i64, user_id: i64) -> Result<bool>;

    async fn set_muted(&self, chat_id: i64, user_id: i64, muted: bool) -> Result<bool>;

    /// All memberships of a chat, admins and members, ordered by user id
    async fn chat_memberships(&self, chat_id: i64) -> Result<Vec<Membership>>;

    /// Member-role memberships of a chat, ordered by user id
    async fn member_memberships(&self, chat_id: i64) -> Result<Vec<Membership>>;

    /// Admin-role memberships of a chat, ordered by user id
    async fn admin_memberships(&self, chat_id: i64) -> Result<Vec<Membership>>;

    /// Set `last_notified_time` on a member row. `false` when the row is gone.
    async fn mark_notified(&self, chat_id: i64, user_id: i64, at: i64) -> Result<bool>;
}
