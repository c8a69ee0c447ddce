//! Layered configuration for the `arx` command-line tool.
//!
//! # Usage
//!
//! ```rust,no_run
//! use arx_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("digest length: {}", resolved.config.hash.length);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit** file passed with `--config`
//! 2. **User** (`$ARX_HOME/config.toml`, default `~/.arx/config.toml`)
//! 3. **Environment variables** (`ARX_*`), fallback only
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate depends on no other arx crate; the CLI converts the logging
//! section into a telemetry config at startup.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layer merging with source tracking.
pub mod merge;
/// Resolved configuration display.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use merge::ConfigLayer;
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Load defaults, the user file and env fallbacks, then `explicit` if given.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(None, explicit)
    }

    /// Like [`Config::load`] with an explicit arx home directory.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_with_home(
        home_dir: &std::path::Path,
        explicit: Option<&std::path::Path>,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(Some(home_dir), explicit)
    }

    /// Load a single file over the defaults (no user layer, no env vars).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// The configured key file, with `~/` expanded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if `~/` cannot be expanded.
    pub fn key_file_path(&self) -> ConfigResult<Option<std::path::PathBuf>> {
        self.keys
            .key_file
            .as_deref()
            .map(loader::expand_home)
            .transpose()
    }
}
