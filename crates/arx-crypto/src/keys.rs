//! Keys, nonces and random material.
//!
//! Key files hold the key as 64 lowercase hex characters plus a newline and
//! are created with owner-only permissions on Unix.

use std::io::Write;
use std::path::Path;

use rand::RngCore;
use rand::rngs::OsRng;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{CryptoError, CryptoResult, check_key_len, check_nonce_len};
use crate::{KEY_SIZE, NONCE_SIZE, XNONCE_SIZE};

/// Fill a fresh buffer of `len` bytes from the operating system RNG.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    OsRng.fill_bytes(&mut out);
    out
}

/// A 256-bit symmetric key, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key([u8; KEY_SIZE]);

impl Key {
    /// Generate a new random key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Try to create from a slice.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if the slice is not exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> CryptoResult<Self> {
        check_key_len(slice.len(), KEY_SIZE)?;
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Encode as hex string. The result holds key material.
    #[must_use]
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.0))
    }

    /// Decode from hex string. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hex or not 32 bytes.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = Zeroizing::new(
            hex::decode(s.trim()).map_err(|_| CryptoError::InvalidHexEncoding)?,
        );
        Self::from_slice(&bytes)
    }

    /// Read a key file.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::IoError`] if the file cannot be read or is a
    /// symlink, or a decoding error if it does not hold a hex key.
    pub fn load(path: impl AsRef<Path>) -> CryptoResult<Self> {
        let path = path.as_ref();

        // Refuse symlinks so a key path cannot be redirected elsewhere.
        let meta =
            std::fs::symlink_metadata(path).map_err(|e| CryptoError::IoError(e.to_string()))?;
        if meta.file_type().is_symlink() {
            return Err(CryptoError::IoError(
                "refusing to read key file: path is a symlink".into(),
            ));
        }

        let contents = Zeroizing::new(
            std::fs::read_to_string(path).map_err(|e| CryptoError::IoError(e.to_string()))?,
        );
        Self::from_hex(&contents)
    }

    /// Write the key to a new file. Fails if the file already exists.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::IoError`] on I/O failures.
    pub fn save(&self, path: impl AsRef<Path>) -> CryptoResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CryptoError::IoError(e.to_string()))?;
        }

        let mut file = create_new_private(path)?;
        let mut line = self.to_hex();
        line.push('\n');
        file.write_all(line.as_bytes())
            .map_err(|e| CryptoError::IoError(e.to_string()))?;

        debug!(path = %path.display(), "wrote key file");
        Ok(())
    }

    /// Load the key at `path`, generating and saving a new one if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::IoError`] on I/O failures or symlink detection,
    /// or a decoding error for a corrupt file.
    pub fn load_or_generate(path: impl AsRef<Path>) -> CryptoResult<Self> {
        let path = path.as_ref();
        let key = Self::generate();
        match key.save(path) {
            Ok(()) => Ok(key),
            Err(_) if path.exists() || path.is_symlink() => Self::load(path),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Key([REDACTED])")
    }
}

#[cfg(unix)]
fn create_new_private(path: &Path) -> CryptoResult<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
        .map_err(|e| CryptoError::IoError(e.to_string()))
}

#[cfg(not(unix))]
fn create_new_private(path: &Path) -> CryptoResult<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| CryptoError::IoError(e.to_string()))
}

macro_rules! nonce_type {
    ($(#[$meta:meta])* $name:ident, $size:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; $size]);

        impl $name {
            /// Generate a random nonce.
            #[must_use]
            pub fn generate() -> Self {
                let mut bytes = [0u8; $size];
                OsRng.fill_bytes(&mut bytes);
                Self(bytes)
            }

            /// Create from raw bytes.
            #[must_use]
            pub const fn from_bytes(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }

            /// Try to create from a slice.
            ///
            /// # Errors
            ///
            /// Returns [`CryptoError::InvalidNonceLength`] for a wrong length.
            pub fn from_slice(slice: &[u8]) -> CryptoResult<Self> {
                check_nonce_len(slice.len(), $size)?;
                let mut bytes = [0u8; $size];
                bytes.copy_from_slice(slice);
                Ok(Self(bytes))
            }

            /// Get the raw bytes.
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }

            /// Encode as hex string.
            #[must_use]
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Decode from hex string.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is not valid hex or has the
            /// wrong length.
            pub fn from_hex(s: &str) -> CryptoResult<Self> {
                let bytes = hex::decode(s.trim()).map_err(|_| CryptoError::InvalidHexEncoding)?;
                Self::from_slice(&bytes)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

nonce_type!(
    /// A 96-bit nonce for ChaCha20 and ChaCha20-Poly1305.
    ///
    /// Never reuse a nonce with the same key.
    Nonce,
    NONCE_SIZE
);

nonce_type!(
    /// A 192-bit nonce for XSalsa20 and secretbox, safe to pick at random.
    XNonce,
    XNONCE_SIZE
);
