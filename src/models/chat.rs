//! Chat model

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use crate::utils::errors::ShamebotError;

/// A category of inbound signal that may refresh a member's activity timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Text,
    Photo,
    Video,
    Voice,
    VideoNote,
    Join,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 6] = [
        TriggerKind::Text,
        TriggerKind::Photo,
        TriggerKind::Video,
        TriggerKind::Voice,
        TriggerKind::VideoNote,
        TriggerKind::Join,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Text => "text",
            TriggerKind::Photo => "photo",
            TriggerKind::Video => "video",
            TriggerKind::Voice => "voice",
            TriggerKind::VideoNote => "video_note",
            TriggerKind::Join => "join",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerKind {
    type Err = ShamebotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ShamebotError::InvalidInput(format!("Unknown trigger kind: {}", s)))
    }
}

/// Per-chat mapping of trigger kind to enabled flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Triggers(BTreeSet<TriggerKind>);

impl Triggers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self(TriggerKind::ALL.into_iter().collect())
    }

    pub fn is_enabled(&self, kind: TriggerKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn set(&mut self, kind: TriggerKind, enabled: bool) {
        if enabled {
            self.0.insert(kind);
        } else {
            self.0.remove(&kind);
        }
    }

    pub fn with(mut self, kind: TriggerKind) -> Self {
        self.set(kind, true);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = TriggerKind> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<TriggerKind> for Triggers {
    fn from_iter<I: IntoIterator<Item = TriggerKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_name: String,
    pub triggers: Triggers,
    /// Minimum inactivity, in seconds, before a member is reported. Zero disables reporting.
    pub notify_time: i64,
    /// Inactivity, in seconds, after which a member is no longer reported
    pub notify_max_time: i64,
    /// Minimum spacing, in seconds, between two reports about the same member
    pub notify_interval: i64,
    pub bot_is_admin: bool,
    pub setup_complete: bool,
}

impl Chat {
    /// A freshly discovered chat: no triggers, notifications disabled
    pub fn new(id: i64, chat_name: impl Into<String>) -> Self {
        Self {
            id,
            chat_name: chat_name.into(),
            triggers: Triggers::none(),
            notify_time: 0,
            notify_max_time: 0,
            notify_interval: 0,
            bot_is_admin: false,
            setup_complete: false,
        }
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notify_time > 0
    }

    pub fn settings(&self) -> ChatSettings {
        ChatSettings {
            triggers: self.triggers.clone(),
            notify_time: self.notify_time,
            notify_max_time: self.notify_max_time,
            notify_interval: self.notify_interval,
        }
    }

    pub fn apply_settings(&mut self, settings: ChatSettings) {
        self.triggers = settings.triggers;
        self.notify_time = settings.notify_time;
        self.notify_max_time = settings.notify_max_time;
        self.notify_interval = settings.notify_interval;
        self.setup_complete = true;
    }
}

/// Admin-editable part of a chat's configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub triggers: Triggers,
    pub notify_time: i64,
    pub notify_max_time: i64,
    pub notify_interval: i64,
}

impl ChatSettings {
    pub fn validate(&self) -> Result<(), ShamebotError> {
        if self.notify_time < 0 || self.notify_max_time < 0 || self.notify_interval < 0 {
            return Err(ShamebotError::InvalidInput(
                "Notification durations cannot be negative".to_string(),
            ));
        }

        // zero notify_time switches reporting off, the window is irrelevant then
        if self.notify_time > 0 && self.notify_time >= self.notify_max_time {
            return Err(ShamebotError::InvalidInput(format!(
                "notify_time ({}) must be lower than notify_max_time ({})",
                self.notify_time, self.notify_max_time
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_trigger_lookup() {
        let triggers = Triggers::none().with(TriggerKind::Text).with(TriggerKind::Join);
        assert!(triggers.is_enabled(TriggerKind::Text));
        assert!(triggers.is_enabled(TriggerKind::Join));
        assert!(!triggers.is_enabled(TriggerKind::Photo));
    }

    #[test]
    fn test_triggers_serialize_as_name_list() {
        let triggers = Triggers::none().with(TriggerKind::VideoNote).with(TriggerKind::Text);
        let json = serde_json::to_string(&triggers).unwrap();
        assert_eq!(json, r#"["text","video_note"]"#);

        let back: Triggers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, triggers);
    }

    #[test]
    fn test_trigger_kind_from_str() {
        assert_eq!("voice".parse::<TriggerKind>().unwrap(), TriggerKind::Voice);
        assert_matches!("sticker".parse::<TriggerKind>(), Err(ShamebotError::InvalidInput(_)));
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = ChatSettings {
            triggers: Triggers::all(),
            notify_time: 60,
            notify_max_time: 600,
            notify_interval: 10,
        };
        assert!(settings.validate().is_ok());

        settings.notify_max_time = 60;
        assert!(settings.validate().is_err());

        settings.notify_time = 0;
        settings.notify_max_time = 0;
        assert!(settings.validate().is_ok());

        settings.notify_interval = -1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_apply_settings_completes_setup() {
        let mut chat = Chat::new(-1, "General");
        assert!(!chat.notifications_enabled());

        chat.apply_settings(ChatSettings {
            triggers: Triggers::none().with(TriggerKind::Text),
            notify_time: 60,
            notify_max_time: 600,
            notify_interval: 10,
        });

        assert!(chat.setup_complete);
        assert!(chat.notifications_enabled());
        assert_eq!(chat.settings().notify_interval, 10);
    }
}
