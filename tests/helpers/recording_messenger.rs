//! In-process messenger for tests
//!
//! Records every delivered text, refuses recipients marked as blocked and
//! stalls recipients marked as unreachable so dispatch timeouts can be hit.

use async_trait::async_trait;
use shamebot::models::UserProfile;
use shamebot::services::Messenger;
use shamebot::{Result, ShamebotError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient_id: i64,
    pub text: String,
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
    blocked: Mutex<HashSet<i64>>,
    stalled: Mutex<HashSet<i64>>,
    administrators: Mutex<HashMap<i64, Vec<UserProfile>>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `recipient_id` fail as if the user blocked the bot
    pub fn block(&self, recipient_id: i64) {
        self.blocked.lock().unwrap().insert(recipient_id);
    }

    /// Make every send to `recipient_id` hang
    pub fn stall(&self, recipient_id: i64) {
        self.stalled.lock().unwrap().insert(recipient_id);
    }

    pub fn set_administrators(&self, chat_id: i64, admins: Vec<UserProfile>) {
        self.administrators.lock().unwrap().insert(chat_id, admins);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|message| message.recipient_id == recipient_id)
            .map(|message| message.text.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, recipient_id: i64, text: &str) -> Result<()> {
        let stalled = self.stalled.lock().unwrap().contains(&recipient_id);
        if stalled {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        if self.blocked.lock().unwrap().contains(&recipient_id) {
            return Err(ShamebotError::DeliveryRejected {
                recipient_id,
                reason: "Forbidden: bot was blocked by the user".to_string(),
            });
        }

        self.sent.lock().unwrap().push(SentMessage {
            recipient_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn chat_administrators(&self, chat_id: i64) -> Result<Vec<UserProfile>> {
        Ok(self
            .administrators
            .lock()
            .unwrap()
            .get(&chat_id)
            .cloned()
            .unwrap_or_default())
    }
}
