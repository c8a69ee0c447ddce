//! File and stdin/stdout plumbing shared by the commands.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arx_config::Config;
use arx_crypto::Key;
use base64::Engine;

/// Path meaning stdin or stdout.
pub(crate) const STDIO: &str = "-";

/// Text encoding for printed binary values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    Hex,
    Base64,
}

impl Encoding {
    /// Parse the `output.encoding` config value.
    pub(crate) fn from_config(config: &Config) -> Result<Self> {
        match config.output.encoding.as_str() {
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            other => bail!("unsupported output encoding '{other}'"),
        }
    }

    pub(crate) fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode(bytes),
            Self::Base64 => base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// Read a whole file, or stdin for `-`.
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == STDIO {
        let mut buf = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Write a whole file, or stdout for `-`.
pub(crate) fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if path.as_os_str() == STDIO {
        let mut out = std::io::stdout().lock();
        out.write_all(data).context("failed to write stdout")?;
        return out.flush().context("failed to flush stdout");
    }
    std::fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}

/// Key file from `--key`, else `keys.key_file` from config.
pub(crate) fn resolve_key_path(arg: Option<&Path>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = arg {
        return Ok(path.to_path_buf());
    }
    config
        .key_file_path()?
        .context("no key given: pass --key or set keys.key_file / ARX_KEY_FILE")
}

/// Load the key for a command.
pub(crate) fn load_key(arg: Option<&Path>, config: &Config) -> Result<Key> {
    let path = resolve_key_path(arg, config)?;
    Key::load(&path).with_context(|| format!("failed to load key from {}", path.display()))
}
