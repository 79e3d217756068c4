//! Chat lifecycle
//!
//! Reacts to changes of the bot's own status in a chat (added, demoted,
//! promoted, removed) and to membership changes of users. Onboarding messages
//! go to the user who caused the change; failing to deliver them is logged
//! and never aborts the state change.

use std::sync::Arc;
use tracing::{info, warn};
use crate::database::MembershipStore;
use crate::models::{Chat, UserProfile};
use crate::services::activity::{ActivityOutcome, ActivityRecorder, ActivitySignal};
use crate::services::notification::{
    chat_parameters, NotificationService, BOT_ADDED_NEEDS_ADMIN, BOT_DEMOTED, BOT_PROMOTED_AGAIN,
    BOT_PROMOTED_SETUP, BOT_REMOVED,
};
use crate::utils::errors::Result;
use crate::utils::logging::log_chat_event;

/// The bot's new status in a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotStatus {
    Member,
    Administrator,
    /// Left or kicked
    Gone,
}

/// What happened to a user in a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberChange {
    Joined,
    Left,
    Promoted,
    Demoted,
}

/// Result of handling a bot status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotStatusOutcome {
    /// Chat registered, waiting for admin rights
    AwaitingPromotion,
    /// Admin rights were taken away
    Demoted,
    /// Chat and its memberships deleted
    Removed,
    /// Admin rights granted; `admins` is the number of administrators stored
    Promoted { first_setup: bool, admins: usize },
}

#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<dyn MembershipStore>,
    notifications: NotificationService,
    recorder: ActivityRecorder,
}

impl LifecycleService {
    pub fn new(
        store: Arc<dyn MembershipStore>,
        notifications: NotificationService,
        recorder: ActivityRecorder,
    ) -> Self {
        Self {
            store,
            notifications,
            recorder,
        }
    }

    /// Handle a change of the bot's own status, `actor` being the user who made it
    pub async fn bot_status_changed(
        &self,
        chat_id: i64,
        chat_name: &str,
        actor: &UserProfile,
        status: BotStatus,
    ) -> Result<BotStatusOutcome> {
        match status {
            BotStatus::Member => self.bot_became_member(chat_id, chat_name, actor).await,
            BotStatus::Gone => self.bot_removed(chat_id, chat_name, actor).await,
            BotStatus::Administrator => self.bot_promoted(chat_id, chat_name, actor).await,
        }
    }

    async fn bot_became_member(&self, chat_id: i64, chat_name: &str, actor: &UserProfile) -> Result<BotStatusOutcome> {
        let known_as_admin = self
            .store
            .get_chat(chat_id)
            .await?
            .map(|chat| chat.bot_is_admin)
            .unwrap_or(false);

        if known_as_admin {
            self.store.set_bot_is_admin(chat_id, false).await?;
            log_chat_event(chat_id, "bot_demoted", Some(actor.id));
            self.direct_message(actor, BOT_DEMOTED, &Chat::new(chat_id, chat_name)).await;
            return Ok(BotStatusOutcome::Demoted);
        }

        let chat = self.store.upsert_chat(chat_id, chat_name).await?;
        if !actor.is_bot {
            self.store.register_activity(chat_id, actor, None).await?;
        }
        log_chat_event(chat_id, "bot_added", Some(actor.id));
        self.direct_message(actor, BOT_ADDED_NEEDS_ADMIN, &chat).await;

        Ok(BotStatusOutcome::AwaitingPromotion)
    }

    async fn bot_removed(&self, chat_id: i64, chat_name: &str, actor: &UserProfile) -> Result<BotStatusOutcome> {
        let chat = self
            .store
            .get_chat(chat_id)
            .await?
            .unwrap_or_else(|| Chat::new(chat_id, chat_name));

        self.direct_message(actor, BOT_REMOVED, &chat).await;
        if self.store.delete_chat(chat_id).await? {
            log_chat_event(chat_id, "bot_removed", Some(actor.id));
        } else {
            info!(chat_id = chat_id, "Bot removed from a chat that was never registered");
        }

        Ok(BotStatusOutcome::Removed)
    }

    async fn bot_promoted(&self, chat_id: i64, chat_name: &str, actor: &UserProfile) -> Result<BotStatusOutcome> {
        let chat = self.store.upsert_chat(chat_id, chat_name).await?;
        let first_setup = !chat.setup_complete;

        let template = if first_setup { BOT_PROMOTED_SETUP } else { BOT_PROMOTED_AGAIN };
        self.direct_message(actor, template, &chat).await;

        self.store.set_bot_is_admin(chat_id, true).await?;
        log_chat_event(chat_id, "bot_promoted", Some(actor.id));

        let admins = self.sync_admins(chat_id).await?;
        Ok(BotStatusOutcome::Promoted { first_setup, admins })
    }

    /// Pull the administrator list from the platform into the store.
    ///
    /// A failed fetch is logged and leaves the stored admins as they are.
    pub async fn sync_admins(&self, chat_id: i64) -> Result<usize> {
        let admins = match self.notifications.messenger().chat_administrators(chat_id).await {
            Ok(admins) => admins,
            Err(e) => {
                warn!(chat_id = chat_id, error = %e, "Failed to fetch chat administrators");
                return Ok(0);
            }
        };

        let stored = self.store.refresh_admins(chat_id, &admins).await?.unwrap_or(0);
        info!(chat_id = chat_id, fetched = admins.len(), stored = stored, "Chat administrators refreshed");
        Ok(stored)
    }

    /// Handle a user's membership change in a chat.
    ///
    /// Returns `false` when nothing was changed (unknown chat or membership).
    pub async fn member_changed(&self, chat_id: i64, user: &UserProfile, change: MemberChange) -> Result<bool> {
        if user.is_bot {
            return Ok(false);
        }

        let changed = match change {
            MemberChange::Joined => matches!(
                self.recorder.record_activity(chat_id, Some(user), ActivitySignal::Join).await?,
                ActivityOutcome::Member { .. } | ActivityOutcome::AdminUntouched
            ),
            MemberChange::Left => self.store.remove_membership(chat_id, user.id).await?,
            MemberChange::Promoted => self.store.promote_to_admin(chat_id, user).await?,
            MemberChange::Demoted => self.store.demote_to_member(chat_id, user).await?,
        };

        if changed {
            let event = match change {
                MemberChange::Joined => "user_joined",
                MemberChange::Left => "user_left",
                MemberChange::Promoted => "user_promoted",
                MemberChange::Demoted => "user_demoted",
            };
            log_chat_event(chat_id, event, Some(user.id));
        }
        Ok(changed)
    }

    async fn direct_message(&self, recipient: &UserProfile, template_key: &str, chat: &Chat) {
        if let Err(e) = self.notifications.send(recipient.id, template_key, &chat_parameters(chat)).await {
            warn!(
                chat_id = chat.id,
                recipient_id = recipient.id,
                template_key = template_key,
                error = %e,
                "Failed to deliver direct message"
            );
        }
    }
}
