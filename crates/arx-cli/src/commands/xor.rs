//! Xor command: raw XSalsa20 keystream, no authentication.

use std::path::Path;

use anyhow::{Context, Result};
use arx_config::Config;
use arx_crypto::{XNonce, XSalsa20};

use crate::io::{load_key, read_input, write_output};

/// XOR `input` with the keystream for `nonce_hex`. Applying it twice restores
/// the input.
pub(crate) fn run_xor(
    config: &Config,
    key: Option<&Path>,
    nonce_hex: &str,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let key = load_key(key, config)?;
    let nonce = XNonce::from_hex(nonce_hex).context("--nonce must be 48 hex characters")?;

    let mut data = zeroize::Zeroizing::new(read_input(input)?);
    XSalsa20::new(key.as_bytes(), nonce.as_bytes())?.apply_keystream(&mut data)?;
    write_output(output, &data)
}
