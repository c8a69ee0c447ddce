//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Accepted `output.encoding` values.
pub const ENCODINGS: [&str; 2] = ["hex", "base64"];

/// Accepted `logging.format` values.
pub const LOG_FORMATS: [&str; 4] = ["pretty", "compact", "json", "full"];

/// Accepted `logging.level` values.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Accepted `logging.target` values.
pub const LOG_TARGETS: [&str; 3] = ["stderr", "stdout", "file"];

/// Accepted `logging.rotation` values.
pub const LOG_ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

/// Longest BLAKE2b digest, in bytes.
pub const MAX_HASH_LENGTH: usize = 64;

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_output(config)?;
    validate_hash(config)?;
    validate_keys(config)?;
    Ok(())
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message,
    }
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;

    if !LOG_LEVELS.contains(&logging.level.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unknown level '{}'; expected one of: {}",
                logging.level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if !LOG_FORMATS.contains(&logging.format.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown format '{}'; expected one of: {}",
                logging.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }

    if let Some(empty) = logging.directives.iter().position(|d| d.trim().is_empty()) {
        return Err(invalid(
            "logging.directives",
            format!("directive {empty} is empty"),
        ));
    }

    if !LOG_TARGETS.contains(&logging.target.as_str()) {
        return Err(invalid(
            "logging.target",
            format!(
                "unknown target '{}'; expected one of: {}",
                logging.target,
                LOG_TARGETS.join(", ")
            ),
        ));
    }

    if !LOG_ROTATIONS.contains(&logging.rotation.as_str()) {
        return Err(invalid(
            "logging.rotation",
            format!(
                "unknown rotation '{}'; expected one of: {}",
                logging.rotation,
                LOG_ROTATIONS.join(", ")
            ),
        ));
    }

    let has_directory = logging
        .directory
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if logging.target == "file" && !has_directory {
        return Err(invalid(
            "logging.directory",
            "required when logging.target is \"file\"".to_owned(),
        ));
    }

    Ok(())
}

fn validate_output(config: &Config) -> ConfigResult<()> {
    if !ENCODINGS.contains(&config.output.encoding.as_str()) {
        return Err(invalid(
            "output.encoding",
            format!(
                "unsupported encoding '{}'; expected one of: {}",
                config.output.encoding,
                ENCODINGS.join(", ")
            ),
        ));
    }
    Ok(())
}

fn validate_hash(config: &Config) -> ConfigResult<()> {
    let length = config.hash.length;
    if length == 0 || length > MAX_HASH_LENGTH {
        return Err(invalid(
            "hash.length",
            format!("length {length} is out of range; must be between 1 and {MAX_HASH_LENGTH}"),
        ));
    }
    Ok(())
}

fn validate_keys(config: &Config) -> ConfigResult<()> {
    if config
        .keys
        .key_file
        .as_deref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(invalid("keys.key_file", "path must not be empty".to_owned()));
    }
    Ok(())
}
