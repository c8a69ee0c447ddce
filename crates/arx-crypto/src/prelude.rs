//! Prelude module - commonly used types for convenient import.
//!
//! Use `use arx_crypto::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use arx_crypto::prelude::*;
//!
//! let key = Key::generate();
//! let nonce = XNonce::generate();
//!
//! let sealed = SecretBox::new(key.as_bytes())?.seal(nonce.as_bytes(), b"hello")?;
//! let digest = Blake2b::new(32)?.finalize()?;
//! assert_eq!(digest.len(), 32);
//! # let _ = sealed;
//! # Ok::<(), CryptoError>(())
//! ```

// Errors
pub use crate::{CryptoError, CryptoResult};

// Keys and nonces
pub use crate::{Key, Nonce, XNonce};

// Stream ciphers
pub use crate::{ChaCha20, XSalsa20};

// Authentication
pub use crate::{Poly1305, Tag};

// Authenticated encryption
pub use crate::{ChaCha20Poly1305, SecretBox, Sealed};

// Hashing
pub use crate::{Blake2b, Digest};
