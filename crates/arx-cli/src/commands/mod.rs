//! Subcommand implementations.

pub(crate) mod config;
pub(crate) mod hash;
pub(crate) mod keygen;
pub(crate) mod open;
pub(crate) mod seal;
pub(crate) mod xor;

use clap::ValueEnum;

/// Authenticated cipher used by `seal` and `open`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum CipherKind {
    /// ChaCha20-Poly1305: `nonce(12) || ciphertext || tag(16)`.
    #[default]
    #[value(name = "chacha20-poly1305")]
    ChaCha20Poly1305,
    /// XSalsa20-Poly1305 secretbox: `nonce(24) || tag(16) || ciphertext`.
    #[value(name = "xsalsa20-poly1305")]
    XSalsa20Poly1305,
}

impl CipherKind {
    /// Nonce bytes at the front of a sealed file.
    pub(crate) fn nonce_len(self) -> usize {
        match self {
            Self::ChaCha20Poly1305 => arx_crypto::NONCE_SIZE,
            Self::XSalsa20Poly1305 => arx_crypto::XNONCE_SIZE,
        }
    }
}
