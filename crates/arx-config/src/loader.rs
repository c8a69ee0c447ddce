//! Config file discovery and layered loading.
//!
//! `load()` works in this order:
//! 1. Parse the embedded `defaults.toml`
//! 2. Merge `$ARX_HOME/config.toml` (default `~/.arx/config.toml`)
//! 3. Merge the explicit `--config` file, if any
//! 4. Apply `ARX_*` env var fallbacks for fields no file set
//! 5. Deserialize and validate

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::env::{ARX_HOME_VAR, apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, merge_layer, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
pub(crate) const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: usize = 1_048_576;

/// Load the layered configuration.
///
/// `home_override` replaces both `ARX_HOME` and `~/.arx` as the directory
/// holding the user `config.toml`. `explicit` is merged last.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable or malformed, an env
/// var has the wrong type, or the result fails validation. An explicit
/// file that does not exist is an error; a missing user file is not.
pub fn load(home_override: Option<&Path>, explicit: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let env_vars = collect_env_vars();

    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    let home = match home_override {
        Some(dir) => dir.to_path_buf(),
        None => match env_vars.get(ARX_HOME_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => default_arx_home()?,
        },
    };

    let user_path = home.join("config.toml");
    if let Some(overlay) = try_load_file(&user_path)? {
        merge_layer(&mut merged, &overlay, "", &ConfigLayer::User, &mut field_sources);
        trace!(path = %user_path.display(), "loaded user config");
        loaded_files.push(user_path.display().to_string());
    }

    if let Some(path) = explicit {
        let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        merge_layer(&mut merged, &overlay, "", &ConfigLayer::Explicit, &mut field_sources);
        trace!(path = %path.display(), "loaded explicit config");
        loaded_files.push(path.display().to_string());
    }

    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, &env_vars)?;
    if env_count > 0 {
        trace!(count = env_count, "applied environment variable fallbacks");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
        home,
    })
}

/// Load a config from a single file on top of the defaults, without the
/// user layer or env vars.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;

    let config: Config = overlay
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Read and parse a TOML file, returning `None` if it does not exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            trace!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }

    let value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(Some(value))
}

/// `~/.arx`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if the home directory is unknown.
pub fn default_arx_home() -> ConfigResult<PathBuf> {
    Ok(home_directory()?.join(".arx"))
}

/// Expand a leading `~/` against the user's home directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if expansion is needed but the home
/// directory is unknown.
pub fn expand_home(path: &str) -> ConfigResult<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => Ok(home_directory()?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}

fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
