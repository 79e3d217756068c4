//! Error handling for Shamebot
//!
//! This module defines the main error type used throughout the application
//! and the classification the scheduler and handlers use to decide whether
//! a failure is expected (log and continue) or fatal for the unit of work.

use thiserror::Error;

/// Main error type for Shamebot
#[derive(Error, Debug)]
pub enum ShamebotError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chat not found: {chat_id}")]
    ChatNotFound { chat_id: i64 },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Membership not found: user {user_id} in chat {chat_id}")]
    MembershipNotFound { chat_id: i64, user_id: i64 },

    #[error("Delivery to {recipient_id} rejected: {reason}")]
    DeliveryRejected { recipient_id: i64, reason: String },

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Shamebot operations
pub type Result<T> = std::result::Result<T, ShamebotError>;

impl ShamebotError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ShamebotError::Database(_) => false,
            ShamebotError::Migration(_) => false,
            ShamebotError::Telegram(_) => true,
            ShamebotError::Config(_) => false,
            ShamebotError::ChatNotFound { .. } => true,
            ShamebotError::UserNotFound { .. } => true,
            ShamebotError::MembershipNotFound { .. } => true,
            ShamebotError::DeliveryRejected { .. } => true,
            ShamebotError::Timeout(_) => true,
            ShamebotError::StoreUnavailable(_) => false,
            ShamebotError::Serialization(_) => false,
            ShamebotError::Io(_) => true,
            ShamebotError::UrlParse(_) => false,
            ShamebotError::InvalidInput(_) => false,
        }
    }

    /// Whether the error comes from the store layer. These are the only
    /// errors allowed to escape a unit of work.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            ShamebotError::Database(_) | ShamebotError::Migration(_) | ShamebotError::StoreUnavailable(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ShamebotError::Database(_) => ErrorSeverity::Critical,
            ShamebotError::Migration(_) => ErrorSeverity::Critical,
            ShamebotError::StoreUnavailable(_) => ErrorSeverity::Critical,
            ShamebotError::Config(_) => ErrorSeverity::Critical,
            ShamebotError::ChatNotFound { .. } => ErrorSeverity::Info,
            ShamebotError::UserNotFound { .. } => ErrorSeverity::Info,
            ShamebotError::MembershipNotFound { .. } => ErrorSeverity::Info,
            ShamebotError::DeliveryRejected { .. } => ErrorSeverity::Warning,
            ShamebotError::Timeout(_) => ErrorSeverity::Warning,
            ShamebotError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
