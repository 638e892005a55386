use crate::config::types::{Config, HttpConfig, OutputConfig, PaginatorConfig, RetryConfig, StoreEntry};
use crate::url::ListingTemplate;
use crate::ConfigError;
use std::collections::HashSet;

/// Largest accepted prefetch window
const MAX_WINDOW_SIZE: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_paginator_config(&config.paginator)?;
    validate_retry_config(&config.retry)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_stores(&config.stores)?;
    Ok(())
}

/// Validates prefetch window and termination settings
fn validate_paginator_config(config: &PaginatorConfig) -> Result<(), ConfigError> {
    if config.window_size < 1 || config.window_size > MAX_WINDOW_SIZE {
        return Err(ConfigError::Validation(format!(
            "window_size must be between 1 and {}, got {}",
            MAX_WINDOW_SIZE, config.window_size
        )));
    }

    if config.pages_per_save < 1 {
        return Err(ConfigError::Validation(
            "pages_per_save must be >= 1".to_string(),
        ));
    }

    if config.max_consecutive_empty < 1 {
        return Err(ConfigError::Validation(
            "max_consecutive_empty must be >= 1".to_string(),
        ));
    }

    if config.max_page < 1 {
        return Err(ConfigError::Validation(
            "max_page must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the retry policy
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.attempts_per_cycle < 1 {
        return Err(ConfigError::Validation(
            "attempts_per_cycle must be >= 1".to_string(),
        ));
    }

    if config.max_cycles < 1 {
        return Err(ConfigError::Validation(
            "max_cycles must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.merge_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "merge_prefix cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates store entries
fn validate_stores(stores: &[StoreEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for store in stores {
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store name cannot be empty".to_string(),
            ));
        }

        if !seen.insert(store.name.to_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store name '{}'",
                store.name
            )));
        }

        ListingTemplate::parse(&store.listing_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("store '{}': {}", store.name, e))
        })?;

        validate_file_prefix(&store.file_prefix)?;
    }

    Ok(())
}

/// File prefixes end up in file names, so keep them to a safe alphabet
fn validate_file_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file_prefix cannot be empty".to_string(),
        ));
    }

    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "file_prefix must contain only ASCII letters, digits, '_' and '-', got '{}'",
            prefix
        )));
    }

    Ok(())
}
