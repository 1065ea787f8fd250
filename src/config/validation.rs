//! Configuration validation

use super::*;
use crate::error::{Result, ServiceError};

const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server_config(&config.server)?;
    validate_auth_config(&config.auth)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &ServerConfig) -> Result<()> {
    if config.port == 0 {
        return Err(ServiceError::Config("Server port must be greater than 0".to_string()));
    }

    if config.host.trim().is_empty() {
        return Err(ServiceError::Config("Server host cannot be empty".to_string()));
    }

    if config.max_body_size_kb == 0 {
        return Err(ServiceError::Config("Max body size must be greater than 0".to_string()));
    }

    Ok(())
}

/// Validate authentication configuration
fn validate_auth_config(config: &AuthConfig) -> Result<()> {
    if config.scheme.is_empty() {
        return Err(ServiceError::Config("Auth scheme cannot be empty".to_string()));
    }

    if config.scheme.chars().any(char::is_whitespace) {
        return Err(ServiceError::Config("Auth scheme cannot contain whitespace".to_string()));
    }

    if config.token.expose_secret().is_empty() {
        return Err(ServiceError::Config("Auth token is required".to_string()));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        return Err(ServiceError::Config("Log level cannot be empty".to_string()));
    }

    if !LOG_FORMATS.contains(&config.format.as_str()) {
        return Err(ServiceError::Config(format!(
            "Unknown log format '{}' (expected one of: {})",
            config.format,
            LOG_FORMATS.join(", ")
        )));
    }

    Ok(())
}
