//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and address formats
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("server.api_prefix `{0}` must start with '/'")]
    ApiPrefix(String),

    #[error("server.body_limit_bytes must be greater than zero")]
    BodyLimit,

    #[error("logging.filter `{0}` is not a valid filter directive")]
    LogFilter(String),
}

/// Check `config` and collect every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }

    if !config.server.api_prefix.starts_with('/') {
        errors.push(ValidationError::ApiPrefix(config.server.api_prefix.clone()));
    }

    if config.server.body_limit_bytes == 0 {
        errors.push(ValidationError::BodyLimit);
    }

    if tracing_subscriber::EnvFilter::try_new(&config.logging.filter).is_err() {
        errors.push(ValidationError::LogFilter(config.logging.filter.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
