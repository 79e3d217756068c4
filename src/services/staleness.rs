//! Staleness evaluation
//!
//! Pure decision: given a membership, its chat's thresholds and the scan's
//! `now`, is a notification about this member due? Both window bounds are
//! inclusive. A member past `notify_max_time` stops being reported until
//! they become active again.

use crate::models::{Chat, Membership};

/// Why a member is not due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    Muted,
    NeverActive,
    /// Inactive for less than `notify_time`
    TooSoon,
    /// Inactive for longer than `notify_max_time`
    PastCutoff,
    /// Reported less than `notify_interval` ago
    CoolingDown,
}

impl Skip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Skip::Muted => "muted",
            Skip::NeverActive => "never_active",
            Skip::TooSoon => "too_soon",
            Skip::PastCutoff => "past_cutoff",
            Skip::CoolingDown => "cooling_down",
        }
    }
}

/// Evaluate a membership, reporting the first condition that rules it out
pub fn evaluate(membership: &Membership, chat: &Chat, now: i64) -> Result<(), Skip> {
    if membership.is_muted {
        return Err(Skip::Muted);
    }
    if membership.last_active_time <= 0 {
        return Err(Skip::NeverActive);
    }

    let inactive_for = now - membership.last_active_time;
    if inactive_for < chat.notify_time {
        return Err(Skip::TooSoon);
    }
    if inactive_for > chat.notify_max_time {
        return Err(Skip::PastCutoff);
    }
    if now - membership.last_notified_time < chat.notify_interval {
        return Err(Skip::CoolingDown);
    }

    Ok(())
}

/// Whether a notification about this member is due at `now`
pub fn is_due(membership: &Membership, chat: &Chat, now: i64) -> bool {
    evaluate(membership, chat, now).is_ok()
}
