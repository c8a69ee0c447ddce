//! ChaCha20-Poly1305 AEAD (RFC 8439 §2.8).
//!
//! The Poly1305 key is the first 32 bytes of ChaCha20 block 0; the payload
//! is encrypted from block 1 on. The MAC covers
//! `aad || pad16 || ciphertext || pad16 || le64(aad_len) || le64(ct_len)`.
//!
//! Decryption recomputes and checks the tag before a single byte of
//! keystream is applied, so a forged message never yields plaintext.

use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::chacha20::{ChaCha20, chacha20_block};
use crate::error::{CryptoError, CryptoResult, check_key_len, check_nonce_len, check_tag_len};
use crate::poly1305::{Poly1305, Tag};
use crate::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};

const ZERO_PAD: [u8; 16] = [0u8; 16];

/// Ciphertext and detached tag produced by [`ChaCha20Poly1305::encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Encrypted payload, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Authentication tag over ciphertext and associated data.
    pub tag: Tag,
}

impl Sealed {
    /// Concatenate ciphertext and tag (`ciphertext || tag`).
    #[must_use]
    pub fn into_combined(self) -> Vec<u8> {
        let mut out = self.ciphertext;
        out.extend_from_slice(self.tag.as_bytes());
        out
    }
}

/// ChaCha20-Poly1305 keyed with a 256-bit key.
///
/// # Example
///
/// ```
/// use arx_crypto::ChaCha20Poly1305;
///
/// let aead = ChaCha20Poly1305::new(&[0x42u8; 32])?;
/// let nonce = [0x01u8; 12];
///
/// let sealed = aead.encrypt(&nonce, b"secret", b"header")?;
/// let opened = aead.decrypt(&nonce, &sealed.ciphertext, sealed.tag.as_bytes(), b"header")?;
/// assert_eq!(opened, b"secret");
/// # Ok::<(), arx_crypto::CryptoError>(())
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ChaCha20Poly1305 {
    key: [u8; KEY_SIZE],
}

impl ChaCha20Poly1305 {
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

    /// Encrypt and authenticate.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidNonceLength`] if the nonce is not 12
    /// bytes, or [`CryptoError::CounterOverflow`] if the plaintext exceeds
    /// the 32-bit block counter.
    pub fn encrypt(&self, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> CryptoResult<Sealed> {
        let nonce = to_nonce(nonce)?;

        let mut ciphertext = plaintext.to_vec();
        ChaCha20::from_parts(&self.key, &nonce, 1).apply_keystream(&mut ciphertext)?;
        let tag = self.compute_tag(&nonce, aad, &ciphertext);

        trace!(
            plaintext_len = plaintext.len(),
            aad_len = aad.len(),
            "sealed chacha20-poly1305 message"
        );
        Ok(Sealed { ciphertext, tag })
    }

    /// Verify the tag, then decrypt.
    ///
    /// # Errors
    ///
    /// Length errors for the nonce or tag, or
    /// [`CryptoError::AuthenticationFailed`] if the tag does not match the
    /// ciphertext, nonce and associated data. No plaintext is produced on
    /// failure.
    pub fn decrypt(
        &self,
        nonce: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        let nonce = to_nonce(nonce)?;
        check_tag_len(tag.len(), TAG_SIZE)?;

        let expected = self.compute_tag(&nonce, aad, ciphertext);
        if !expected.verify(tag) {
            debug!(
                ciphertext_len = ciphertext.len(),
                aad_len = aad.len(),
                "chacha20-poly1305 tag mismatch"
            );
            return Err(CryptoError::AuthenticationFailed);
        }

        let mut plaintext = ciphertext.to_vec();
        ChaCha20::from_parts(&self.key, &nonce, 1).apply_keystream(&mut plaintext)?;
        Ok(plaintext)
    }

    /// Encrypt and return `ciphertext || tag`.
    ///
    /// # Errors
    ///
    /// See [`ChaCha20Poly1305::encrypt`].
    pub fn seal(&self, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        Ok(self.encrypt(nonce, plaintext, aad)?.into_combined())
    }

    /// Split `ciphertext || tag`, verify and decrypt.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidTagLength`] if `combined` is shorter
    /// than a tag, otherwise see [`ChaCha20Poly1305::decrypt`].
    pub fn open(&self, nonce: &[u8], combined: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let Some(split) = combined.len().checked_sub(TAG_SIZE) else {
            return Err(CryptoError::InvalidTagLength {
                expected: TAG_SIZE,
                actual: combined.len(),
            });
        };
        let (ciphertext, tag) = combined.split_at(split);
        self.decrypt(nonce, ciphertext, tag, aad)
    }

    fn compute_tag(&self, nonce: &[u8; NONCE_SIZE], aad: &[u8], ciphertext: &[u8]) -> Tag {
        let mut block0 = chacha20_block(&self.key, 0, nonce);
        let mut mac = Poly1305::from_key_bytes(&block0[..KEY_SIZE]);
        block0.zeroize();

        mac.update(aad);
        mac.update(&ZERO_PAD[..pad16(aad.len())]);
        mac.update(ciphertext);
        mac.update(&ZERO_PAD[..pad16(ciphertext.len())]);
        mac.update(&(aad.len() as u64).to_le_bytes());
        mac.update(&(ciphertext.len() as u64).to_le_bytes());
        mac.finalize()
    }
}

impl std::fmt::Debug for ChaCha20Poly1305 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaCha20Poly1305").finish_non_exhaustive()
    }
}

/// Bytes of zero padding needed to reach a 16-byte boundary.
fn pad16(len: usize) -> usize {
    len.wrapping_neg() % 16
}

fn to_nonce(nonce: &[u8]) -> CryptoResult<[u8; NONCE_SIZE]> {
    check_nonce_len(nonce.len(), NONCE_SIZE)?;
    let mut out = [0u8; NONCE_SIZE];
    out.copy_from_slice(nonce);
    Ok(out)
}

/// One-shot authenticated encryption.
///
/// # Errors
///
/// Length errors for the key or nonce; see [`ChaCha20Poly1305::encrypt`].
pub fn aead_encrypt(
    plaintext: &[u8],
    key: &[u8],
    nonce: &[u8],
    aad: Option<&[u8]>,
) -> CryptoResult<Sealed> {
    ChaCha20Poly1305::new(key)?.encrypt(nonce, plaintext, aad.unwrap_or_default())
}

/// One-shot authenticated decryption.
///
/// # Errors
///
/// Length errors for the key, nonce or tag, or
/// [`CryptoError::AuthenticationFailed`].
pub fn aead_decrypt(
    ciphertext: &[u8],
    tag: &[u8],
    key: &[u8],
    nonce: &[u8],
    aad: Option<&[u8]>,
) -> CryptoResult<Vec<u8>> {
    ChaCha20Poly1305::new(key)?.decrypt(nonce, ciphertext, tag, aad.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUNSCREEN: &[u8] = b"Ladies and Gentlemen of the class of '99: If I could offer you \
only one tip for the future, sunscreen would be it.";

    fn rfc_key() -> Vec<u8> {
        (0x80u8..=0x9f).collect()
    }

    #[test]
    fn test_poly_key_generation_rfc_2_6_2() {
        let key: [u8; 32] = rfc_key().try_into().unwrap();
        let nonce: [u8; 12] = hex::decode("000000000001020304050607")
            .unwrap()
            .try_into()
            .unwrap();
        let block = chacha20_block(&key, 0, &nonce);
        assert_eq!(
            hex::encode(&block[..32]),
            "8ad5a08b905f81cc815040274ab29471a833b637e3fd0da508dbb8e2fdd1a646"
        );
    }

    #[test]
    fn test_rfc_2_8_2() {
        let nonce = hex::decode("070000004041424344454647").unwrap();
        let aad = hex::decode("50515253c0c1c2c3c4c5c6c7").unwrap();

        let sealed = aead_encrypt(SUNSCREEN, &rfc_key(), &nonce, Some(&aad)).unwrap();
        assert_eq!(
            hex::encode(&sealed.ciphertext),
            "d31a8d34648e60db7b86afbc53ef7ec2a4aded51296e08fea9e2b5a736ee62d6\
             3dbea45e8ca9671282fafb69da92728b1a71de0a9e060b2905d6a5b67ecd3b36\
             92ddbd7f2d778b8c9803aee328091b58fab324e4fad675945585808b4831d7bc\
             3ff4def08e4b7a9de576d26586cec64b6116"
        );
        assert_eq!(sealed.tag.to_hex(), "1ae10b594f09e26a7e902ecbd0600691");

        let opened = aead_decrypt(
            &sealed.ciphertext,
            sealed.tag.as_bytes(),
            &rfc_key(),
            &nonce,
            Some(&aad),
        )
        .unwrap();
        assert_eq!(opened, SUNSCREEN);
    }

    #[test]
    fn test_empty_plaintext_and_aad() {
        let sealed = aead_encrypt(b"", &[0x42; 32], &[0x01; 12], None).unwrap();
        assert!(sealed.ciphertext.is_empty());
        assert_eq!(sealed.tag.to_hex(), "aa322123eb72e1baeef50600160f8543");

        let sealed = aead_encrypt(b"", &[0x42; 32], &[0x01; 12], Some(b"header")).unwrap();
        assert_eq!(sealed.tag.to_hex(), "b2d60eb3432dff4485efbb26bf5816e0");
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let aead = ChaCha20Poly1305::new(&[7u8; 32]).unwrap();
        let combined = aead.seal(&[9u8; 12], b"payload", b"aad").unwrap();
        assert_eq!(combined.len(), 7 + TAG_SIZE);
        assert_eq!(aead.open(&[9u8; 12], &combined, b"aad").unwrap(), b"payload");
    }

    #[test]
    fn test_open_too_short() {
        let aead = ChaCha20Poly1305::new(&[7u8; 32]).unwrap();
        assert_eq!(
            aead.open(&[9u8; 12], &[0u8; 10], b""),
            Err(CryptoError::InvalidTagLength {
                expected: 16,
                actual: 10
            })
        );
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let aead = ChaCha20Poly1305::new(&[7u8; 32]).unwrap();
        let sealed = aead.encrypt(&[9u8; 12], b"payload", b"aad").unwrap();

        let mut ct = sealed.ciphertext.clone();
        ct[0] ^= 0x01;
        assert_eq!(
            aead.decrypt(&[9u8; 12], &ct, sealed.tag.as_bytes(), b"aad"),
            Err(CryptoError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_wrong_aad_and_nonce_rejected() {
        let aead = ChaCha20Poly1305::new(&[7u8; 32]).unwrap();
        let sealed = aead.encrypt(&[9u8; 12], b"payload", b"aad").unwrap();
        let tag = sealed.tag.as_bytes();

        assert!(aead.decrypt(&[9u8; 12], &sealed.ciphertext, tag, b"aae").is_err());
        assert!(aead.decrypt(&[8u8; 12], &sealed.ciphertext, tag, b"aad").is_err());
    }

    #[test]
    fn test_length_errors_before_work() {
        assert!(matches!(
            aead_encrypt(b"x", &[0u8; 31], &[0u8; 12], None),
            Err(CryptoError::InvalidKeyLength { .. })
        ));
        assert!(matches!(
            aead_encrypt(b"x", &[0u8; 32], &[0u8; 8], None),
            Err(CryptoError::InvalidNonceLength { .. })
        ));
        assert!(matches!(
            aead_decrypt(b"x", &[0u8; 15], &[0u8; 32], &[0u8; 12], None),
            Err(CryptoError::InvalidTagLength { .. })
        ));
    }

    #[test]
    fn test_pad16() {
        assert_eq!(pad16(0), 0);
        assert_eq!(pad16(1), 15);
        assert_eq!(pad16(12), 4);
        assert_eq!(pad16(16), 0);
        assert_eq!(pad16(17), 15);
    }
}
