//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, concurrency > 0)
//! - Check whitelist entries parse as URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: SelectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into a selector

use crate::config::schema::SelectorConfig;
use thiserror::Error;
use url::Url;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("service_name must not be empty")]
    EmptyServiceName,

    #[error("max_concurrent_requests must be greater than zero")]
    ZeroConcurrency,

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("health_check_path must start with '/'")]
    BadHealthCheckPath,

    #[error("whitelist entry is not a valid url: {0}")]
    InvalidWhitelistEntry(String),

    #[error("whitelist must not be empty when present")]
    EmptyWhitelist,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &SelectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service_name.is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    if config.selection.max_concurrent_requests == 0 {
        errors.push(ValidationError::ZeroConcurrency);
    }

    for (field, value) in [
        ("probe.request_timeout_ms", config.probe.request_timeout_ms),
        ("selection.unhealthy_ttl_ms", config.selection.unhealthy_ttl_ms),
        ("selection.backups_ttl_ms", config.selection.backups_ttl_ms),
        ("cache.reselect_timeout_ms", config.cache.reselect_timeout_ms),
        (
            "cache.timestamp_interval_ms",
            config.cache.timestamp_interval_ms,
        ),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    if !config.probe.health_check_path.starts_with('/') {
        errors.push(ValidationError::BadHealthCheckPath);
    }

    if let Some(whitelist) = &config.whitelist {
        if whitelist.is_empty() {
            errors.push(ValidationError::EmptyWhitelist);
        }
        for entry in whitelist {
            if Url::parse(entry).is_err() {
                errors.push(ValidationError::InvalidWhitelistEntry(entry.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
