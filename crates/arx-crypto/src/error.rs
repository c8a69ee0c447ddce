//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
///
/// Length errors are always reported before any keystream, MAC or hash
/// arithmetic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length in bytes (upper bound for variable-length keys).
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Invalid nonce length.
    #[error("invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Invalid authentication tag length.
    #[error("invalid tag length: expected {expected}, got {actual}")]
    InvalidTagLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Requested digest length is outside `1..=max`.
    #[error("invalid output length: must be between 1 and {max}, got {actual}")]
    InvalidOutputLength {
        /// Largest supported output length in bytes.
        max: usize,
        /// Requested length in bytes.
        actual: usize,
    },

    /// Authentication tag did not match. No plaintext is released.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// A finalized streaming state was used again.
    #[error("state already finalized")]
    StateReuse,

    /// The 32-bit block counter would wrap.
    #[error("keystream block counter exhausted")]
    CounterOverflow,

    /// Invalid hex encoding.
    #[error("invalid hex encoding")]
    InvalidHexEncoding,

    /// Invalid base64 encoding.
    #[error("invalid base64 encoding")]
    InvalidBase64Encoding,

    /// I/O error (e.g. reading/writing key files).
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Check that `actual` equals the fixed key length `expected`.
pub(crate) fn check_key_len(actual: usize, expected: usize) -> CryptoResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(CryptoError::InvalidKeyLength { expected, actual })
    }
}

/// Check that `actual` equals the fixed nonce length `expected`.
pub(crate) fn check_nonce_len(actual: usize, expected: usize) -> CryptoResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(CryptoError::InvalidNonceLength { expected, actual })
    }
}

/// Check that `actual` equals the fixed tag length `expected`.
pub(crate) fn check_tag_len(actual: usize, expected: usize) -> CryptoResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(CryptoError::InvalidTagLength { expected, actual })
    }
}
