//! Seal command: authenticated encryption of a file.

use std::path::Path;

use anyhow::{Result, bail};
use arx_config::Config;
use arx_crypto::{ChaCha20Poly1305, Key, Nonce, SecretBox, XNonce};
use tracing::debug;

use super::CipherKind;
use crate::io::{load_key, read_input, write_output};

/// Encrypt `input` to `output` under a fresh random nonce.
pub(crate) fn run_seal(
    config: &Config,
    key: Option<&Path>,
    cipher: CipherKind,
    aad: Option<&str>,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let key = load_key(key, config)?;
    let plaintext = zeroize::Zeroizing::new(read_input(input)?);
    let sealed = seal_bytes(&key, cipher, aad.map(str::as_bytes), &plaintext)?;
    debug!(
        cipher = ?cipher,
        plaintext_len = plaintext.len(),
        sealed_len = sealed.len(),
        "sealed input"
    );
    write_output(output, &sealed)
}

/// Frame a sealed message: the nonce, then the cipher's combined output.
pub(crate) fn seal_bytes(
    key: &Key,
    cipher: CipherKind,
    aad: Option<&[u8]>,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let (nonce, body) = match cipher {
        CipherKind::ChaCha20Poly1305 => {
            let nonce = Nonce::generate();
            let body = ChaCha20Poly1305::new(key.as_bytes())?.seal(
                nonce.as_bytes(),
                plaintext,
                aad.unwrap_or_default(),
            )?;
            (nonce.as_bytes().to_vec(), body)
        },
        CipherKind::XSalsa20Poly1305 => {
            if aad.is_some() {
                bail!("xsalsa20-poly1305 does not support associated data");
            }
            let nonce = XNonce::generate();
            let body = SecretBox::new(key.as_bytes())?.seal(nonce.as_bytes(), plaintext)?;
            (nonce.as_bytes().to_vec(), body)
        },
    };

    let mut out = nonce;
    out.extend_from_slice(&body);
    Ok(out)
}
