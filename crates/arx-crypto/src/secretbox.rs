//! XSalsa20-Poly1305 authenticated encryption (NaCl `secretbox`).
//!
//! The first 32 bytes of the XSalsa20 keystream key Poly1305; the payload
//! is encrypted with the keystream that follows. The tag covers the
//! ciphertext only. Combined output is `tag || ciphertext`.

use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult, check_key_len, check_nonce_len, check_tag_len};
use crate::poly1305::{Poly1305, Tag};
use crate::salsa20::XSalsa20;
use crate::{KEY_SIZE, TAG_SIZE, XNONCE_SIZE};

/// XSalsa20-Poly1305 keyed with a 256-bit key.
///
/// The 24-byte nonce is large enough to pick at random for every message.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBox {
    key: [u8; KEY_SIZE],
}

impl SecretBox {
    /// Create from a 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if the key is not 32 bytes.
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        check_key_len(key.len(), KEY_SIZE)?;
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(key);
        Ok(Self { key: bytes })
    }

    /// Encrypt and authenticate, returning ciphertext and detached tag.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidNonceLength`] unless the nonce is 24 bytes.
    pub fn encrypt(&self, nonce: &[u8], plaintext: &[u8]) -> CryptoResult<(Vec<u8>, Tag)> {
        let (mut cipher, mac) = self.start(nonce)?;

        let mut ciphertext = plaintext.to_vec();
        cipher.apply_keystream(&mut ciphertext)?;
        let tag = authenticate(mac, &ciphertext);

        trace!(plaintext_len = plaintext.len(), "sealed secretbox message");
        Ok((ciphertext, tag))
    }

    /// Verify the tag, then decrypt.
    ///
    /// # Errors
    ///
    /// Length errors for the nonce or tag, or
    /// [`CryptoError::AuthenticationFailed`] if the tag does not match.
    pub fn decrypt(&self, nonce: &[u8], ciphertext: &[u8], tag: &[u8]) -> CryptoResult<Vec<u8>> {
        check_tag_len(tag.len(), TAG_SIZE)?;
        let (mut cipher, mac) = self.start(nonce)?;

        if !authenticate(mac, ciphertext).verify(tag) {
            debug!(ciphertext_len = ciphertext.len(), "secretbox tag mismatch");
            return Err(CryptoError::AuthenticationFailed);
        }

        let mut plaintext = ciphertext.to_vec();
        cipher.apply_keystream(&mut plaintext)?;
        Ok(plaintext)
    }

    /// Encrypt and return `tag || ciphertext`.
    ///
    /// # Errors
    ///
    /// See [`SecretBox::encrypt`].
    pub fn seal(&self, nonce: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let (ciphertext, tag) = self.encrypt(nonce, plaintext)?;
        let mut out = Vec::with_capacity(TAG_SIZE.saturating_add(ciphertext.len()));
        out.extend_from_slice(tag.as_bytes());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Split `tag || ciphertext`, verify and decrypt.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidTagLength`] if `combined` is shorter
    /// than a tag, otherwise see [`SecretBox::decrypt`].
    pub fn open(&self, nonce: &[u8], combined: &[u8]) -> CryptoResult<Vec<u8>> {
        if combined.len() < TAG_SIZE {
            return Err(CryptoError::InvalidTagLength {
                expected: TAG_SIZE,
                actual: combined.len(),
            });
        }
        let (tag, ciphertext) = combined.split_at(TAG_SIZE);
        self.decrypt(nonce, ciphertext, tag)
    }

    /// Cipher positioned after the one-time MAC key, plus the keyed MAC.
    fn start(&self, nonce: &[u8]) -> CryptoResult<(XSalsa20, Poly1305)> {
        check_nonce_len(nonce.len(), XNONCE_SIZE)?;
        let mut cipher = XSalsa20::new(&self.key, nonce)?;

        let mut mac_key = [0u8; KEY_SIZE];
        cipher.apply_keystream(&mut mac_key)?;
        let mac = Poly1305::from_key_bytes(&mac_key);
        mac_key.zeroize();

        Ok((cipher, mac))
    }
}

impl std::fmt::Debug for SecretBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBox").finish_non_exhaustive()
    }
}

fn authenticate(mut mac: Poly1305, ciphertext: &[u8]) -> Tag {
    mac.update(ciphertext);
    mac.finalize()
}

/// One-shot secretbox seal, returning `tag || ciphertext`.
///
/// # Errors
///
/// Length errors for the key or nonce.
pub fn secretbox_seal(plaintext: &[u8], key: &[u8], nonce: &[u8]) -> CryptoResult<Vec<u8>> {
    SecretBox::new(key)?.seal(nonce, plaintext)
}

/// One-shot secretbox open of `tag || ciphertext`.
///
/// # Errors
///
/// Length errors, or [`CryptoError::AuthenticationFailed`].
pub fn secretbox_open(combined: &[u8], key: &[u8], nonce: &[u8]) -> CryptoResult<Vec<u8>> {
    SecretBox::new(key)?.open(nonce, combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRSTKEY: &str = "1b27556473e985d462cd51197a9a46c76009549eac6474f206c4ee0844f68389";
    const NONCE: &str = "69696ee955b62b73cd62bda875fc73d68219e0036b7a0b37";
    const MESSAGE: &str = "be075fc53c81f2d5cf141316ebeb0c7b5228c52a4c62cbd44b66849b64244ffc\
                           e5ecbaaf33bd751a1ac728d45e6c61296cdc3c01233561f41db66cce314adb31\
                           0e3be8250c46f06dceea3a7fa1348057e2f6556ad6b1318a024a838f21af1fde\
                           048977eb48f59ffd4924ca1c60902e52f0a089bc76897040e082f937763848645e0705";
    const CIPHERTEXT: &str = "8e993b9f48681273c29650ba32fc76ce48332ea7164d96a4476fb8c531a1186a\
                              c0dfc17c98dce87b4da7f011ec48c97271d2c20f9b928fe2270d6fb863d51738\
                              b48eeee314a7cc8ab932164548e526ae90224368517acfeabd6bb3732bc0e9da\
                              99832b61ca01b6de56244a9e88d5f9b37973f622a43d14a6599b1f654cb45a74e355a5";

    #[test]
    fn test_nacl_vector() {
        let key = hex::decode(FIRSTKEY).unwrap();
        let nonce = hex::decode(NONCE).unwrap();
        let message = hex::decode(MESSAGE).unwrap();

        let (ciphertext, tag) = SecretBox::new(&key).unwrap().encrypt(&nonce, &message).unwrap();
        assert_eq!(tag.to_hex(), "f3ffc7703f9400e52a7dfb4b3d3305d9");
        assert_eq!(hex::encode(&ciphertext), CIPHERTEXT);

        let combined = secretbox_seal(&message, &key, &nonce).unwrap();
        assert_eq!(&combined[..TAG_SIZE], tag.as_bytes());
        assert_eq!(secretbox_open(&combined, &key, &nonce).unwrap(), message);
    }

    #[test]
    fn test_empty_message() {
        let key: Vec<u8> = (0u8..32).collect();
        let nonce: Vec<u8> = (0u8..24).collect();
        let combined = secretbox_seal(b"", &key, &nonce).unwrap();
        assert_eq!(hex::encode(&combined), "28fd82cd7386c5471a24d8ad2a525b6e");
        assert!(secretbox_open(&combined, &key, &nonce).unwrap().is_empty());
    }

    #[test]
    fn test_short_message() {
        let combined = secretbox_seal(b"Hello, secretbox!", &[7u8; 32], &[9u8; 24]).unwrap();
        assert_eq!(
            hex::encode(&combined),
            "e1b916f2160a4707f7a21bdc558695adc42f7f9a507d129f6117608dde56da2a41"
        );
    }

    #[test]
    fn test_tampering_rejected() {
        let key = [7u8; 32];
        let nonce = [9u8; 24];
        let combined = secretbox_seal(b"payload", &key, &nonce).unwrap();

        for i in 0..combined.len() {
            let mut forged = combined.clone();
            forged[i] ^= 0x80;
            assert_eq!(
                secretbox_open(&forged, &key, &nonce),
                Err(CryptoError::AuthenticationFailed),
                "byte {i}"
            );
        }
    }

    #[test]
    fn test_length_errors() {
        assert!(matches!(
            SecretBox::new(&[0u8; 16]),
            Err(CryptoError::InvalidKeyLength { .. })
        ));
        assert!(matches!(
            secretbox_seal(b"x", &[0u8; 32], &[0u8; 12]),
            Err(CryptoError::InvalidNonceLength { .. })
        ));
        assert_eq!(
            secretbox_open(&[0u8; 15], &[0u8; 32], &[0u8; 24]),
            Err(CryptoError::InvalidTagLength {
                expected: 16,
                actual: 15
            })
        );
    }
}
