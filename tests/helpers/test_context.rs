//! Test context for engine tests
//!
//! Wires the services over an in-memory store, a manual clock and a
//! recording messenger, and offers shortcuts for building chats.

use super::recording_messenger::RecordingMessenger;
use shamebot::config::Settings;
use shamebot::database::{MembershipStore, MemoryStore};
use shamebot::models::{Chat, ChatSettings, Membership, Triggers, UserProfile};
use shamebot::services::{ActivitySignal, ContentKind, ServiceFactory};
use shamebot::utils::ManualClock;
use std::sync::Arc;

/// Base timestamp for tests; 0 means "never active"
pub const T0: i64 = 1_700_000_000;

pub const TEST_CHAT_ID: i64 = -1001234567890;

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub messenger: Arc<RecordingMessenger>,
    pub services: ServiceFactory,
}

/// Settings suited for tests: English texts, no pacing, short timeouts
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.i18n.default_language = "en".to_string();
    settings.scheduler.interval_seconds = 1;
    settings.scheduler.dispatch_timeout_seconds = 1;
    settings.scheduler.cycle_timeout_seconds = 30;
    settings.scheduler.send_delay_ms = 0;
    settings
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let messenger = Arc::new(RecordingMessenger::new());
        let services = ServiceFactory::new(&settings, store.clone(), messenger.clone(), clock.clone());

        Self {
            store,
            clock,
            messenger,
            services,
        }
    }

    /// A configured chat with every trigger enabled
    pub async fn configured_chat(&self, chat_id: i64, notify_time: i64, notify_max_time: i64, notify_interval: i64) -> Chat {
        self.configured_chat_with(chat_id, Triggers::all(), notify_time, notify_max_time, notify_interval).await
    }

    pub async fn configured_chat_with(
        &self,
        chat_id: i64,
        triggers: Triggers,
        notify_time: i64,
        notify_max_time: i64,
        notify_interval: i64,
    ) -> Chat {
        self.store.upsert_chat(chat_id, "Test Group").await.unwrap();
        self.store
            .update_chat_settings(
                chat_id,
                &ChatSettings { triggers, notify_time, notify_max_time, notify_interval },
            )
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn add_admin(&self, chat_id: i64, user_id: i64, user_name: &str) {
        assert!(self
            .store
            .promote_to_admin(chat_id, &UserProfile::new(user_id, user_name))
            .await
            .unwrap());
    }

    /// Record a text message from the user at `at`
    pub async fn speak_at(&self, chat_id: i64, user_id: i64, user_name: &str, at: i64) {
        self.send_at(chat_id, user_id, user_name, ContentKind::Text, at).await;
    }

    pub async fn send_at(&self, chat_id: i64, user_id: i64, user_name: &str, kind: ContentKind, at: i64) {
        self.clock.set(at);
        self.services
            .activity_recorder
            .record_activity(chat_id, Some(&UserProfile::new(user_id, user_name)), ActivitySignal::Message(kind))
            .await
            .unwrap();
    }

    pub fn membership(&self, chat_id: i64, user_id: i64) -> Membership {
        self.store.membership(chat_id, user_id).unwrap().unwrap()
    }
}
