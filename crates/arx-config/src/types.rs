//! Configuration types for the Arx tools.
//!
//! Every struct implements [`Default`] with the same values as the
//! embedded `defaults.toml`, so a bare `[section]` header in TOML still
//! yields a working configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration for the `arx` binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
    /// How binary results are printed.
    pub output: OutputSection,
    /// BLAKE2b defaults for `arx hash`.
    pub hash: HashSection,
    /// Key file locations.
    pub keys: KeysSection,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["arx_crypto=debug"]`).
    pub directives: Vec<String>,
    /// Where logs go: `"stderr"`, `"stdout"` or `"file"`.
    pub target: String,
    /// Log directory for the `"file"` target. `~/` is expanded.
    pub directory: Option<String>,
    /// File rotation for the `"file"` target: `"never"`, `"daily"` or `"hourly"`.
    pub rotation: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            target: "stderr".to_owned(),
            directory: None,
            rotation: "never".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputSection
// ---------------------------------------------------------------------------

/// Text encoding for digests, tags and nonces printed to the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// `"hex"` or `"base64"`.
    pub encoding: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            encoding: "hex".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// HashSection
// ---------------------------------------------------------------------------

/// Defaults for BLAKE2b hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashSection {
    /// Digest length in bytes, 1 to 64.
    pub length: usize,
}

impl Default for HashSection {
    fn default() -> Self {
        Self { length: 32 }
    }
}

// ---------------------------------------------------------------------------
// KeysSection
// ---------------------------------------------------------------------------

/// Key file locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysSection {
    /// Key used when a command gets no `--key`. A leading `~/` is
    /// expanded to the home directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
}
