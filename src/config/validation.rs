//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{ShamebotError, Result};
use super::{Settings, StoreBackend};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_scheduler_config(&settings.scheduler)?;
    validate_i18n_config(&settings.i18n)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(ShamebotError::Config(
            "Bot token is required".to_string()
        ));
    }

    if let Some(api_url) = &config.api_url {
        url::Url::parse(api_url)?;
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.backend == StoreBackend::Memory {
        return Ok(());
    }

    if config.url.is_empty() {
        return Err(ShamebotError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(ShamebotError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(ShamebotError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    if config.acquire_timeout_seconds == 0 {
        return Err(ShamebotError::Config(
            "Acquire timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate scheduler configuration
fn validate_scheduler_config(config: &super::SchedulerConfig) -> Result<()> {
    if config.interval_seconds == 0 {
        return Err(ShamebotError::Config(
            "Scheduler interval must be greater than 0".to_string()
        ));
    }

    if config.dispatch_timeout_seconds == 0 {
        return Err(ShamebotError::Config(
            "Dispatch timeout must be greater than 0".to_string()
        ));
    }

    if config.cycle_timeout_seconds < config.dispatch_timeout_seconds {
        return Err(ShamebotError::Config(
            "Cycle timeout cannot be shorter than dispatch timeout".to_string()
        ));
    }

    Ok(())
}

/// Validate internationalization configuration
fn validate_i18n_config(config: &super::I18nConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(ShamebotError::Config(
            "Default language is required".to_string()
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(ShamebotError::Config(
            "Default language must be in supported languages list".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ShamebotError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "123:abc".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let settings = Settings::default();
        assert_matches!(validate_settings(&settings), Err(ShamebotError::Config(_)));
    }

    #[test]
    fn test_memory_backend_needs_no_url() {
        let mut settings = valid_settings();
        settings.database.backend = StoreBackend::Memory;
        settings.database.url.clear();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_zero_acquire_timeout_rejected() {
        let mut settings = valid_settings();
        settings.database.acquire_timeout_seconds = 0;
        assert_matches!(validate_settings(&settings), Err(ShamebotError::Config(_)));

        settings.database.backend = StoreBackend::Memory;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut settings = valid_settings();
        settings.scheduler.interval_seconds = 0;
        assert_matches!(validate_settings(&settings), Err(ShamebotError::Config(_)));
    }

    #[test]
    fn test_bad_api_url_rejected() {
        let mut settings = valid_settings();
        settings.bot.api_url = Some("not a url".to_string());
        assert_matches!(validate_settings(&settings), Err(ShamebotError::UrlParse(_)));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut settings = valid_settings();
        settings.logging.level = "loud".to_string();
        assert_matches!(validate_settings(&settings), Err(ShamebotError::Config(_)));
    }
}
