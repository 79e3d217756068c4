//! Notification service implementation
//!
//! This service owns the message templates (per-language bodies with
//! `{placeholder}` substitution) and sends rendered texts through a `Messenger`.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use crate::config::I18nConfig;
use crate::models::{Chat, Membership};
use crate::services::messenger::Messenger;
use crate::utils::errors::{ShamebotError, Result};
use crate::utils::helpers::{chat_title, format_duration, user_mention};

pub const MEMBER_INACTIVE: &str = "member_inactive";
pub const BOT_ADDED_NEEDS_ADMIN: &str = "bot_added_needs_admin";
pub const BOT_DEMOTED: &str = "bot_demoted";
pub const BOT_REMOVED: &str = "bot_removed";
pub const BOT_PROMOTED_SETUP: &str = "bot_promoted_setup";
pub const BOT_PROMOTED_AGAIN: &str = "bot_promoted_again";

const FALLBACK_LANGUAGE: &str = "en";

/// Message template structure
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub key: String,
    pub content: HashMap<String, String>, // language -> content mapping
}

/// Notification service for message handling
#[derive(Clone)]
pub struct NotificationService {
    messenger: Arc<dyn Messenger>,
    language: String,
    templates: HashMap<String, MessageTemplate>,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(messenger: Arc<dyn Messenger>, i18n: &I18nConfig) -> Self {
        Self {
            messenger,
            language: i18n.default_language.clone(),
            templates: Self::load_default_templates(),
        }
    }

    pub fn messenger(&self) -> &Arc<dyn Messenger> {
        &self.messenger
    }

    /// Render a template and send it to one recipient
    pub async fn send(&self, recipient_id: i64, template_key: &str, parameters: &HashMap<String, String>) -> Result<()> {
        let text = self.format_message(template_key, parameters)?;
        debug!(recipient_id = recipient_id, template_key = template_key, "Sending notification");
        self.messenger.send_text(recipient_id, &text).await
    }

    /// Text telling an admin that a member has gone quiet
    pub fn member_inactive_text(&self, chat: &Chat, member: &Membership, now: i64) -> Result<String> {
        let mut parameters = chat_parameters(chat);
        parameters.insert("member".to_string(), user_mention(&member.user_name, member.user_id));
        parameters.insert(
            "inactive_for".to_string(),
            format_duration(now - member.last_active_time),
        );
        self.format_message(MEMBER_INACTIVE, &parameters)
    }

    /// Format message using template and parameters
    pub fn format_message(&self, template_key: &str, parameters: &HashMap<String, String>) -> Result<String> {
        let template = self.templates.get(template_key)
            .ok_or_else(|| ShamebotError::InvalidInput(format!("Template not found: {}", template_key)))?;

        let content = template.content.get(&self.language)
            .or_else(|| template.content.get(FALLBACK_LANGUAGE))
            .ok_or_else(|| ShamebotError::InvalidInput(format!("Template content not found for language: {}", self.language)))?;

        let mut formatted = content.clone();
        for (key, value) in parameters {
            let placeholder = format!("{{{}}}", key);
            formatted = formatted.replace(&placeholder, value);
        }

        Ok(formatted)
    }

    /// Add or update a message template
    pub fn add_template(&mut self, template: MessageTemplate) {
        self.templates.insert(template.key.clone(), template);
    }

    /// Load default message templates
    fn load_default_templates() -> HashMap<String, MessageTemplate> {
        let entries: [(&str, &str, &str); 6] = [
            (
                MEMBER_INACTIVE,
                "⏰ {member} has been silent in chat \"{chat}\" for {inactive_for}.",
                "⏰ {member} молчит в чате «{chat}» уже {inactive_for}.",
            ),
            (
                BOT_ADDED_NEEDS_ADMIN,
                "Thanks for adding me to \"{chat}\"!\n\nNow make me an administrator of the group so I can see the other members' messages.",
                "Спасибо за добавление меня в чат «{chat}»!\n\nТеперь меня надо назначить администратором этой группы, чтобы я мог видеть сообщения других участников.",
            ),
            (
                BOT_DEMOTED,
                "Looks like you removed my admin rights in \"{chat}\".\n\nI can no longer see the members' messages!",
                "Кажется, вы удалили меня из администраторов чата «{chat}»!\n\nТеперь я не смогу видеть сообщения участников!",
            ),
            (
                BOT_REMOVED,
                "Sorry to see you remove me from \"{chat}\".\n\nCould you tell us why?",
                "Жаль, что вы удалили меня из чата «{chat}».\n\nМожете рассказать, почему?",
            ),
            (
                BOT_PROMOTED_SETUP,
                "I'm an administrator in \"{chat}\" now!\n\nLet's set up which activity counts and when to notify you.",
                "Вижу, вы назначили меня администратором в чате «{chat}»!\n\nТеперь можем приступить к настройке.",
            ),
            (
                BOT_PROMOTED_AGAIN,
                "Thanks for making me an administrator in \"{chat}\" again!",
                "Спасибо, что снова сделали меня администратором в чате «{chat}»!",
            ),
        ];

        entries
            .into_iter()
            .map(|(key, en, ru)| {
                let mut content = HashMap::new();
                content.insert("en".to_string(), en.to_string());
                content.insert("ru".to_string(), ru.to_string());
                (key.to_string(), MessageTemplate { key: key.to_string(), content })
            })
            .collect()
    }
}

/// Parameters every chat-scoped template understands
pub fn chat_parameters(chat: &Chat) -> HashMap<String, String> {
    let mut parameters = HashMap::new();
    parameters.insert("chat".to_string(), chat_title(&chat.chat_name, chat.id));
    parameters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, UserProfile};
    use async_trait::async_trait;

    struct NullMessenger;

    #[async_trait]
    impl Messenger for NullMessenger {
        async fn send_text(&self, _recipient_id: i64, _text: &str) -> Result<()> {
            Ok(())
        }

        async fn chat_administrators(&self, _chat_id: i64) -> Result<Vec<UserProfile>> {
            Ok(vec![])
        }
    }

    fn service(language: &str) -> NotificationService {
        let i18n = I18nConfig {
            default_language: language.to_string(),
            supported_languages: vec![language.to_string()],
        };
        NotificationService::new(Arc::new(NullMessenger), &i18n)
    }

    #[test]
    fn test_member_inactive_text() {
        let service = service("en");
        let chat = Chat::new(-1, "General");
        let mut member = Membership::new(-1, 7, "bob", Role::Member);
        member.last_active_time = 1_000;

        let text = service.member_inactive_text(&chat, &member, 1_000 + 2 * 3_600).unwrap();
        assert_eq!(text, "⏰ @bob has been silent in chat \"General\" for 2h.");
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let service = service("de");
        let text = service
            .format_message(BOT_PROMOTED_AGAIN, &chat_parameters(&Chat::new(-5, "")))
            .unwrap();
        assert_eq!(text, "Thanks for making me an administrator in \"-5\" again!");
    }

    #[test]
    fn test_russian_templates() {
        let service = service("ru");
        let text = service
            .format_message(BOT_REMOVED, &chat_parameters(&Chat::new(-1, "Танцы")))
            .unwrap();
        assert!(text.starts_with("Жаль, что вы удалили меня из чата «Танцы»"));
    }

    #[test]
    fn test_template_management() {
        let mut service = service("en");
        assert!(service.format_message("custom", &HashMap::new()).is_err());

        let mut content = HashMap::new();
        content.insert("en".to_string(), "Hello {name}".to_string());
        service.add_template(MessageTemplate { key: "custom".to_string(), content });

        let mut parameters = HashMap::new();
        parameters.insert("name".to_string(), "admins".to_string());
        assert_eq!(service.format_message("custom", &parameters).unwrap(), "Hello admins");
    }
}
