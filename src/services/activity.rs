//! Activity recording
//!
//! Turns inbound signals (a message of some content kind, a join) into
//! `last_active_time` updates. Whether a signal counts is decided by the store
//! against the chat's trigger mapping, inside the same unit of work as the write.

use std::sync::Arc;
use tracing::{debug, info};
use crate::database::{ActivityMark, MembershipStore, RegisterOutcome};
use crate::models::{TriggerKind, UserProfile};
use crate::utils::errors::Result;
use crate::utils::helpers::Clock;
use crate::utils::logging::log_activity_recorded;

/// Content kinds of group messages that can count as activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Photo,
    Video,
    Voice,
    VideoNote,
}

impl ContentKind {
    pub fn trigger(&self) -> TriggerKind {
        match self {
            ContentKind::Text => TriggerKind::Text,
            ContentKind::Photo => TriggerKind::Photo,
            ContentKind::Video => TriggerKind::Video,
            ContentKind::Voice => TriggerKind::Voice,
            ContentKind::VideoNote => TriggerKind::VideoNote,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySignal {
    Message(ContentKind),
    Join,
}

impl ActivitySignal {
    pub fn trigger(&self) -> TriggerKind {
        match self {
            ActivitySignal::Message(kind) => kind.trigger(),
            ActivitySignal::Join => TriggerKind::Join,
        }
    }
}

/// What recording a signal did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityOutcome {
    /// The chat is not tracked
    ChatUnknown,
    /// The signal carried no sender
    Anonymous,
    /// Bots are never tracked as members
    BotIgnored,
    /// The sender administers the chat; their row was left untouched
    AdminUntouched,
    /// The sender is a tracked member
    Member { created: bool, refreshed: bool },
}

#[derive(Clone)]
pub struct ActivityRecorder {
    store: Arc<dyn MembershipStore>,
    clock: Arc<dyn Clock>,
}

impl ActivityRecorder {
    pub fn new(store: Arc<dyn MembershipStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Record a signal from `user` in `chat_id`.
    ///
    /// Only store failures are returned as errors; every expected condition
    /// ends in an `ActivityOutcome`.
    pub async fn record_activity(
        &self,
        chat_id: i64,
        user: Option<&UserProfile>,
        signal: ActivitySignal,
    ) -> Result<ActivityOutcome> {
        let Some(user) = user else {
            info!(chat_id = chat_id, "Signal has no sender, nothing to record");
            return Ok(ActivityOutcome::Anonymous);
        };
        if user.is_bot {
            debug!(chat_id = chat_id, user_id = user.id, "Ignoring signal from a bot");
            return Ok(ActivityOutcome::BotIgnored);
        }

        let mark = ActivityMark::new(signal.trigger(), self.clock.now());

        let outcome = match self.store.register_activity(chat_id, user, Some(mark)).await? {
            None => {
                info!(chat_id = chat_id, "Chat not found in database");
                ActivityOutcome::ChatUnknown
            }
            Some(RegisterOutcome::Admin) => {
                debug!(chat_id = chat_id, user_id = user.id, "Sender is an admin, activity not tracked");
                ActivityOutcome::AdminUntouched
            }
            Some(RegisterOutcome::Member { created, refreshed }) => {
                if created {
                    info!(chat_id = chat_id, user_id = user.id, user_name = %user.user_name, "Added user to chat members");
                }
                if refreshed {
                    log_activity_recorded(chat_id, user.id, mark.trigger.as_str(), mark.at);
                } else {
                    debug!(
                        chat_id = chat_id,
                        user_id = user.id,
                        trigger = %mark.trigger,
                        "Trigger disabled for chat, activity not refreshed"
                    );
                }
                ActivityOutcome::Member { created, refreshed }
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::{ChatSettings, Role, Triggers};
    use crate::utils::helpers::ManualClock;
    use assert_matches::assert_matches;

    const CHAT: i64 = -100;
    const T0: i64 = 1_700_000_000;

    async fn setup(triggers: Triggers) -> (Arc<MemoryStore>, ActivityRecorder) {
        let store = Arc::new(MemoryStore::new());
        store.upsert_chat(CHAT, "General").await.unwrap();
        store
            .update_chat_settings(
                CHAT,
                &ChatSettings { triggers, notify_time: 60, notify_max_time: 600, notify_interval: 10 },
            )
            .await
            .unwrap();
        let recorder = ActivityRecorder::new(store.clone(), Arc::new(ManualClock::new(T0)));
        (store, recorder)
    }

    #[tokio::test]
    async fn test_enabled_kind_refreshes_timestamp() {
        let (store, recorder) = setup(Triggers::none().with(TriggerKind::Text)).await;
        let alice = UserProfile::new(1, "alice");

        let outcome = recorder
            .record_activity(CHAT, Some(&alice), ActivitySignal::Message(ContentKind::Text))
            .await
            .unwrap();

        assert_eq!(outcome, ActivityOutcome::Member { created: true, refreshed: true });
        assert_eq!(store.membership(CHAT, 1).unwrap().unwrap().last_active_time, T0);
    }

    #[tokio::test]
    async fn test_disabled_kind_keeps_timestamp() {
        let (store, recorder) = setup(Triggers::none().with(TriggerKind::Text)).await;
        let alice = UserProfile::new(1, "alice");
        recorder
            .record_activity(CHAT, Some(&alice), ActivitySignal::Message(ContentKind::Text))
            .await
            .unwrap();

        let outcome = recorder
            .record_activity(CHAT, Some(&alice), ActivitySignal::Message(ContentKind::Photo))
            .await
            .unwrap();

        assert_eq!(outcome, ActivityOutcome::Member { created: false, refreshed: false });
        assert_eq!(store.membership(CHAT, 1).unwrap().unwrap().last_active_time, T0);
    }

    #[tokio::test]
    async fn test_join_respects_join_trigger() {
        let (store, recorder) = setup(Triggers::none().with(TriggerKind::Text)).await;
        let bob = UserProfile::new(2, "bob");

        let outcome = recorder.record_activity(CHAT, Some(&bob), ActivitySignal::Join).await.unwrap();
        assert_eq!(outcome, ActivityOutcome::Member { created: true, refreshed: false });
        assert_eq!(store.membership(CHAT, 2).unwrap().unwrap().last_active_time, 0);

        let (store, recorder) = setup(Triggers::none().with(TriggerKind::Join)).await;
        recorder.record_activity(CHAT, Some(&bob), ActivitySignal::Join).await.unwrap();
        assert_eq!(store.membership(CHAT, 2).unwrap().unwrap().last_active_time, T0);
    }

    #[tokio::test]
    async fn test_settings_change_applies_to_next_signal() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_chat(CHAT, "General").await.unwrap();
        let text_only = ChatSettings {
            triggers: Triggers::none().with(TriggerKind::Text),
            notify_time: 60,
            notify_max_time: 600,
            notify_interval: 10,
        };
        store.update_chat_settings(CHAT, &text_only).await.unwrap();
        let clock = Arc::new(ManualClock::new(T0));
        let recorder = ActivityRecorder::new(store.clone(), clock.clone());
        let alice = UserProfile::new(1, "alice");
        let text = ActivitySignal::Message(ContentKind::Text);

        recorder.record_activity(CHAT, Some(&alice), text).await.unwrap();

        let photo_only = ChatSettings { triggers: Triggers::none().with(TriggerKind::Photo), ..text_only };
        store.update_chat_settings(CHAT, &photo_only).await.unwrap();
        clock.advance(30);

        let outcome = recorder.record_activity(CHAT, Some(&alice), text).await.unwrap();
        assert_eq!(outcome, ActivityOutcome::Member { created: false, refreshed: false });
        assert_eq!(store.membership(CHAT, 1).unwrap().unwrap().last_active_time, T0);
    }

    #[tokio::test]
    async fn test_admin_is_not_turned_into_member() {
        let (store, recorder) = setup(Triggers::all()).await;
        let admin = UserProfile::new(3, "carol");
        store.promote_to_admin(CHAT, &admin).await.unwrap();

        let outcome = recorder
            .record_activity(CHAT, Some(&admin), ActivitySignal::Message(ContentKind::Voice))
            .await
            .unwrap();

        assert_eq!(outcome, ActivityOutcome::AdminUntouched);
        let membership = store.membership(CHAT, 3).unwrap().unwrap();
        assert_eq!(membership.role, Role::Admin);
        assert_eq!(membership.last_active_time, 0);
    }

    #[tokio::test]
    async fn test_no_ops() {
        let (store, recorder) = setup(Triggers::all()).await;
        let signal = ActivitySignal::Message(ContentKind::Text);

        assert_eq!(recorder.record_activity(CHAT, None, signal).await.unwrap(), ActivityOutcome::Anonymous);
        assert_eq!(
            recorder.record_activity(-999, Some(&UserProfile::new(1, "alice")), signal).await.unwrap(),
            ActivityOutcome::ChatUnknown
        );

        let mut bot = UserProfile::new(4, "helper_bot");
        bot.is_bot = true;
        assert_eq!(recorder.record_activity(CHAT, Some(&bot), signal).await.unwrap(), ActivityOutcome::BotIgnored);
        assert!(store.chat_memberships(CHAT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (store, recorder) = setup(Triggers::all()).await;
        store.set_available(false);

        let result = recorder
            .record_activity(CHAT, Some(&UserProfile::new(1, "alice")), ActivitySignal::Join)
            .await;
        assert_matches!(result, Err(e) if e.is_store_failure());
    }
}
