//! Arx Crypto - ARX-family symmetric primitives.
//!
//! This crate provides:
//! - ChaCha20 stream cipher (RFC 8439)
//! - Poly1305 one-time authenticator (RFC 8439)
//! - ChaCha20-Poly1305 authenticated encryption with associated data
//! - XSalsa20 with HSalsa20 subkey derivation, and the XSalsa20-Poly1305 secretbox
//! - BLAKE2b hashing and keyed MACs (RFC 7693)
//!
//! Every length is validated before any keystream, MAC or hash work is
//! done. Secret state is zeroized on drop, and tag comparisons run in
//! constant time.
//!
//! # Example
//!
//! ```
//! use arx_crypto::{Key, Nonce, ChaCha20Poly1305, blake2b_hash};
//!
//! let key = Key::generate();
//! let nonce = Nonce::generate();
//! let aead = ChaCha20Poly1305::new(key.as_bytes())?;
//!
//! let combined = aead.seal(nonce.as_bytes(), b"attack at dawn", b"v1")?;
//! let plaintext = aead.open(nonce.as_bytes(), &combined, b"v1")?;
//! assert_eq!(plaintext, b"attack at dawn");
//!
//! let digest = blake2b_hash(&combined, 32, None)?;
//! println!("digest: {}", digest.to_hex());
//! # Ok::<(), arx_crypto::CryptoError>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod aead;
mod blake2b;
mod chacha20;
mod digest;
mod error;
mod keys;
mod poly1305;
mod salsa20;
mod secretbox;
mod util;

/// Key length for ChaCha20, XSalsa20 and both AEADs, in bytes.
pub const KEY_SIZE: usize = 32;

/// ChaCha20 nonce length in bytes.
pub const NONCE_SIZE: usize = 12;

/// XSalsa20 nonce length in bytes.
pub const XNONCE_SIZE: usize = 24;

/// Poly1305 tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Keystream block length in bytes.
pub const BLOCK_SIZE: usize = 64;

pub use aead::{ChaCha20Poly1305, Sealed, aead_decrypt, aead_encrypt};
pub use blake2b::{BLAKE2B_BLOCK_SIZE, BLAKE2B_MAX_KEY_SIZE, Blake2b, blake2b_hash, blake2b_mac};
pub use chacha20::{ChaCha20, chacha20_block, chacha20_decrypt, chacha20_encrypt};
pub use digest::{Digest, MAX_DIGEST_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use keys::{Key, Nonce, XNonce, random_bytes};
pub use poly1305::{Poly1305, Tag, poly1305_auth, poly1305_verify};
pub use salsa20::{XSalsa20, hsalsa20, xsalsa20_decrypt, xsalsa20_encrypt};
pub use secretbox::{SecretBox, secretbox_open, secretbox_seal};
pub use util::ct_eq;
