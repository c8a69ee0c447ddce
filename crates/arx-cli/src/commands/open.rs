//! Open command: verify and decrypt a sealed file.

use std::path::Path;

use anyhow::{Result, bail};
use arx_config::Config;
use arx_crypto::{ChaCha20Poly1305, Key, SecretBox, TAG_SIZE};
use tracing::debug;
use zeroize::Zeroizing;

use super::CipherKind;
use crate::io::{load_key, read_input, write_output};

/// Decrypt `input` to `output`. Nothing is written unless the tag verifies.
pub(crate) fn run_open(
    config: &Config,
    key: Option<&Path>,
    cipher: CipherKind,
    aad: Option<&str>,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let key = load_key(key, config)?;
    let sealed = read_input(input)?;
    let plaintext = open_bytes(&key, cipher, aad.map(str::as_bytes), &sealed)?;
    debug!(cipher = ?cipher, plaintext_len = plaintext.len(), "opened input");
    write_output(output, &plaintext)
}

/// Split the nonce off a framed message and open the rest.
pub(crate) fn open_bytes(
    key: &Key,
    cipher: CipherKind,
    aad: Option<&[u8]>,
    sealed: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let nonce_len = cipher.nonce_len();
    if sealed.len() < nonce_len.saturating_add(TAG_SIZE) {
        bail!(
            "input is {} bytes, too short for a {nonce_len}-byte nonce and {TAG_SIZE}-byte tag",
            sealed.len()
        );
    }
    let (nonce, body) = sealed.split_at(nonce_len);

    let plaintext = match cipher {
        CipherKind::ChaCha20Poly1305 => {
            ChaCha20Poly1305::new(key.as_bytes())?.open(nonce, body, aad.unwrap_or_default())?
        },
        CipherKind::XSalsa20Poly1305 => {
            if aad.is_some() {
                bail!("xsalsa20-poly1305 does not support associated data");
            }
            SecretBox::new(key.as_bytes())?.open(nonce, body)?
        },
    };
    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::seal::seal_bytes;
    use arx_crypto::CryptoError;

    #[test]
    fn test_roundtrip_both_ciphers() {
        let key = Key::generate();
        for cipher in [CipherKind::ChaCha20Poly1305, CipherKind::XSalsa20Poly1305] {
            let sealed = seal_bytes(&key, cipher, None, b"file contents").unwrap();
            let opened = open_bytes(&key, cipher, None, &sealed).unwrap();
            assert_eq!(opened.as_slice(), b"file contents");
        }
    }

    #[test]
    fn test_aad_must_match() {
        let key = Key::generate();
        let sealed = seal_bytes(&key, CipherKind::ChaCha20Poly1305, Some(b"v1"), b"x").unwrap();
        assert!(open_bytes(&key, CipherKind::ChaCha20Poly1305, Some(b"v1"), &sealed).is_ok());

        let err = open_bytes(&key, CipherKind::ChaCha20Poly1305, Some(b"v2"), &sealed).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CryptoError>(),
            Some(&CryptoError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed =
            seal_bytes(&Key::generate(), CipherKind::XSalsa20Poly1305, None, b"x").unwrap();
        assert!(open_bytes(&Key::generate(), CipherKind::XSalsa20Poly1305, None, &sealed).is_err());
    }

    #[test]
    fn test_truncated_input() {
        let key = Key::generate();
        assert!(open_bytes(&key, CipherKind::ChaCha20Poly1305, None, &[0u8; 27]).is_err());
    }

    #[test]
    fn test_failed_open_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("k.key");
        let input = dir.path().join("in.arx");
        let output = dir.path().join("out.txt");

        let key = Key::load_or_generate(&key_path).unwrap();
        let mut sealed = seal_bytes(&key, CipherKind::ChaCha20Poly1305, None, b"data").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 1;
        std::fs::write(&input, &sealed).unwrap();

        let config = Config::default();
        let result = run_open(
            &config,
            Some(&key_path),
            CipherKind::ChaCha20Poly1305,
            None,
            &input,
            &output,
        );
        assert!(result.is_err());
        assert!(!output.exists());
    }
}
