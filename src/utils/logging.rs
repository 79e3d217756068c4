//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the activity tracker and the notification scheduler.

use tracing::{info, warn, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must live as long as the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "shamebot.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a refreshed activity timestamp
pub fn log_activity_recorded(chat_id: i64, user_id: i64, trigger: &str, at: i64) {
    debug!(
        chat_id = chat_id,
        user_id = user_id,
        trigger = trigger,
        at = at,
        "Activity recorded"
    );
}

/// Log a single notification delivery attempt
pub fn log_dispatch(chat_id: i64, member_id: i64, admin_id: i64, delivered: bool, error: Option<&str>) {
    if delivered {
        info!(
            chat_id = chat_id,
            member_id = member_id,
            admin_id = admin_id,
            "Inactivity notification delivered"
        );
    } else {
        warn!(
            chat_id = chat_id,
            member_id = member_id,
            admin_id = admin_id,
            error = error,
            "Inactivity notification not delivered"
        );
    }
}

/// Log chat lifecycle changes (bot added, removed, promoted)
pub fn log_chat_event(chat_id: i64, event: &str, user_id: Option<i64>) {
    info!(
        chat_id = chat_id,
        event = event,
        user_id = user_id,
        "Chat event occurred"
    );
}

/// Log the counters of a finished scan cycle
pub fn log_cycle_summary(now: i64, chats: usize, evaluated: usize, due: usize, delivered: usize, failed: usize) {
    if due > 0 {
        info!(
            now = now,
            chats = chats,
            evaluated = evaluated,
            due = due,
            delivered = delivered,
            failed = failed,
            "Scan cycle finished"
        );
    } else {
        debug!(now = now, chats = chats, evaluated = evaluated, "Scan cycle finished, nobody due");
    }
}
