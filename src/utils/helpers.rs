//! Helper functions and utilities
//!
//! Time sources and small formatting helpers shared by the engine and the handlers.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" as unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self { now: AtomicI64::new(start) }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Format a span of seconds the way admins read it ("2d 3h", "15m", "40s")
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    match (days, hours, minutes) {
        (0, 0, 0) => format!("{}s", seconds),
        (0, 0, m) => format!("{}m", m),
        (0, h, 0) => format!("{}h", h),
        (0, h, m) => format!("{}h {}m", h, m),
        (d, 0, _) => format!("{}d", d),
        (d, h, _) => format!("{}d {}h", d, h),
    }
}

/// Render a user for humans: `@username` when known, the numeric id otherwise
pub fn user_mention(user_name: &str, user_id: i64) -> String {
    if user_name.is_empty() {
        format!("id{}", user_id)
    } else {
        format!("@{}", user_name)
    }
}

/// Render a chat title, falling back to the numeric id for untitled chats
pub fn chat_title(chat_name: &str, chat_id: i64) -> String {
    if chat_name.is_empty() {
        chat_id.to_string()
    } else {
        chat_name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(40), "40s");
        assert_eq!(format_duration(15 * 60), "15m");
        assert_eq!(format_duration(2 * 3_600), "2h");
        assert_eq!(format_duration(2 * 3_600 + 5 * 60), "2h 5m");
        assert_eq!(format_duration(86_400 + 3 * 3_600), "1d 3h");
        assert_eq!(format_duration(3 * 86_400 + 59), "3d");
        assert_eq!(format_duration(-5), "0s");
    }

    #[test]
    fn test_user_mention() {
        assert_eq!(user_mention("alice", 1), "@alice");
        assert_eq!(user_mention("", 42), "id42");
    }

    #[test]
    fn test_chat_title() {
        assert_eq!(chat_title("General", -1), "General");
        assert_eq!(chat_title("", -100), "-100");
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        clock.advance(65);
        assert_eq!(clock.now(), 1_065);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }
}
