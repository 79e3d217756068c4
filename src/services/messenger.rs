//! Outbound messaging seam
//!
//! The engine only needs two calls from the messaging platform: send a text to
//! a user and list a chat's administrators. `TelegramMessenger` implements them
//! over teloxide; tests plug in their own implementation.

use async_trait::async_trait;
use teloxide::{prelude::*, types::ChatId, RequestError};
use tracing::debug;
use crate::models::UserProfile;
use crate::utils::errors::{ShamebotError, Result};

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message. A recipient that refuses messages from the
    /// bot surfaces as `ShamebotError::DeliveryRejected`.
    async fn send_text(&self, recipient_id: i64, text: &str) -> Result<()>;

    /// Current administrators of a chat, bots included
    async fn chat_administrators(&self, chat_id: i64) -> Result<Vec<UserProfile>>;
}

/// Messenger backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

/// API-level refusals (blocked, deactivated, unknown chat, ...) are per-recipient
/// delivery failures; transport errors stay Telegram errors.
fn classify_send_error(recipient_id: i64, error: RequestError) -> ShamebotError {
    match error {
        RequestError::Api(api_error) => ShamebotError::DeliveryRejected {
            recipient_id,
            reason: api_error.to_string(),
        },
        other => ShamebotError::Telegram(other),
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, recipient_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(recipient_id), text)
            .await
            .map_err(|e| classify_send_error(recipient_id, e))?;

        debug!(recipient_id = recipient_id, "Message sent");
        Ok(())
    }

    async fn chat_administrators(&self, chat_id: i64) -> Result<Vec<UserProfile>> {
        let admins = self.bot.get_chat_administrators(ChatId(chat_id)).await?;
        Ok(admins.iter().map(|member| UserProfile::from(&member.user)).collect())
    }
}
