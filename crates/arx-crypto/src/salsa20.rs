//! XSalsa20 stream cipher.
//!
//! HSalsa20 turns the key and the first 16 nonce bytes into a subkey; the
//! last 8 nonce bytes and a 64-bit block counter then drive plain Salsa20
//! under that subkey.
//!
//! Salsa20 state layout (word indices):
//!
//! ```text
//!  c0  k0  k1  k2
//!  k3  c1  n0  n1
//!  b0  b1  c2  k4
//!  k5  k6  k7  c3
//! ```

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult, check_key_len, check_nonce_len};
use crate::util::{load_words, store_words, xor_in_place};
use crate::{BLOCK_SIZE, KEY_SIZE, XNONCE_SIZE};

/// `"expand 32-byte k"` as little-endian words.
const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// HSalsa20 output positions: the diagonal, then the nonce/counter words.
const HSALSA_OUTPUT: [usize; 8] = [0, 5, 10, 15, 6, 7, 8, 9];

#[inline(always)]
fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[b] ^= x[a].wrapping_add(x[d]).rotate_left(7);
    x[c] ^= x[b].wrapping_add(x[a]).rotate_left(9);
    x[d] ^= x[c].wrapping_add(x[b]).rotate_left(13);
    x[a] ^= x[d].wrapping_add(x[c]).rotate_left(18);
}

/// 20 rounds without the final feed-forward addition.
fn rounds(x: &mut [u32; 16]) {
    for _ in 0..10 {
        // Column round.
        quarter_round(x, 0, 4, 8, 12);
        quarter_round(x, 5, 9, 13, 1);
        quarter_round(x, 10, 14, 2, 6);
        quarter_round(x, 15, 3, 7, 11);
        // Row round.
        quarter_round(x, 0, 1, 2, 3);
        quarter_round(x, 5, 6, 7, 4);
        quarter_round(x, 10, 11, 8, 9);
        quarter_round(x, 15, 12, 13, 14);
    }
}

/// Constants and key in place; words 6..10 left for the caller.
fn keyed_state(key: &[u8; KEY_SIZE]) -> [u32; 16] {
    let k: [u32; 8] = load_words(key);
    let mut s = [0u32; 16];
    s[0] = CONSTANTS[0];
    s[5] = CONSTANTS[1];
    s[10] = CONSTANTS[2];
    s[15] = CONSTANTS[3];
    s[1..5].copy_from_slice(&k[..4]);
    s[11..15].copy_from_slice(&k[4..]);
    s
}

/// Derive a 256-bit subkey from `key` and a 16-byte input.
#[must_use]
pub fn hsalsa20(key: &[u8; KEY_SIZE], input: &[u8; 16]) -> [u8; KEY_SIZE] {
    let mut x = keyed_state(key);
    x[6..10].copy_from_slice(&load_words::<4>(input));
    rounds(&mut x);

    let mut words = HSALSA_OUTPUT.map(|i| x[i]);
    let mut out = [0u8; KEY_SIZE];
    store_words(&words, &mut out);
    x.zeroize();
    words.zeroize();
    out
}

/// An XSalsa20 keystream generator.
///
/// Same shape as [`ChaCha20`](crate::ChaCha20) but keyed with a 24-byte
/// nonce, which is large enough to be chosen at random.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct XSalsa20 {
    state: [u32; 16],
    keystream: [u8; BLOCK_SIZE],
    offset: usize,
    exhausted: bool,
}

impl XSalsa20 {
    /// Create a cipher from a 32-byte key and 24-byte nonce.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] unless the key is 32 bytes,
    /// or [`CryptoError::InvalidNonceLength`] unless the nonce is 24 bytes.
    pub fn new(key: &[u8], nonce: &[u8]) -> CryptoResult<Self> {
        check_key_len(key.len(), KEY_SIZE)?;
        check_nonce_len(nonce.len(), XNONCE_SIZE)?;

        let mut key_arr = [0u8; KEY_SIZE];
        key_arr.copy_from_slice(key);
        let mut prefix = [0u8; 16];
        prefix.copy_from_slice(&nonce[..16]);

        let mut subkey = hsalsa20(&key_arr, &prefix);
        let mut state = keyed_state(&subkey);
        state[6..8].copy_from_slice(&load_words::<2>(&nonce[16..]));

        key_arr.zeroize();
        subkey.zeroize();

        Ok(Self {
            state,
            keystream: [0u8; BLOCK_SIZE],
            offset: BLOCK_SIZE,
            exhausted: false,
        })
    }

    /// The index of the next block to be generated.
    #[must_use]
    pub fn counter(&self) -> u64 {
        u64::from(self.state[8]) | (u64::from(self.state[9]) << 32)
    }

    /// XOR the keystream into `data` in place.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CounterOverflow`] only if the 64-bit block
    /// counter would wrap; `data` is untouched in that case.
    pub fn apply_keystream(&mut self, data: &mut [u8]) -> CryptoResult<()> {
        self.check_capacity(data.len())?;

        let mut rest = data;
        while !rest.is_empty() {
            if self.offset == BLOCK_SIZE {
                self.refill();
            }
            let available = &self.keystream[self.offset..];
            let n = available.len().min(rest.len());
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(n);
            xor_in_place(head, &available[..n]);
            self.offset = self.offset.saturating_add(n);
            rest = tail;
        }
        Ok(())
    }

    /// Encrypt `plaintext`, returning a new buffer of the same length.
    ///
    /// # Errors
    ///
    /// See [`XSalsa20::apply_keystream`].
    pub fn encrypt(&mut self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut out = plaintext.to_vec();
        self.apply_keystream(&mut out)?;
        Ok(out)
    }

    /// Decrypt `ciphertext`. Identical to [`XSalsa20::encrypt`].
    ///
    /// # Errors
    ///
    /// See [`XSalsa20::apply_keystream`].
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.encrypt(ciphertext)
    }

    #[allow(clippy::arithmetic_side_effects)] // offset <= BLOCK_SIZE, u128 has headroom
    fn check_capacity(&self, len: usize) -> CryptoResult<()> {
        let buffered = BLOCK_SIZE - self.offset;
        let blocks = len.saturating_sub(buffered).div_ceil(BLOCK_SIZE) as u128;
        let remaining = if self.exhausted {
            0
        } else {
            u128::from(u64::MAX - self.counter()) + 1
        };
        if blocks > remaining {
            return Err(CryptoError::CounterOverflow);
        }
        Ok(())
    }

    fn refill(&mut self) {
        let mut x = self.state;
        rounds(&mut x);
        for (out, word) in x.iter_mut().zip(&self.state) {
            *out = out.wrapping_add(*word);
        }
        store_words(&x, &mut self.keystream);
        x.zeroize();
        self.offset = 0;

        match self.counter().checked_add(1) {
            Some(next) => {
                self.state[8] = next as u32;
                self.state[9] = (next >> 32) as u32;
            },
            None => self.exhausted = true,
        }
    }
}

impl std::fmt::Debug for XSalsa20 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XSalsa20")
            .field("counter", &self.counter())
            .finish_non_exhaustive()
    }
}

/// One-shot XSalsa20 encryption.
///
/// # Errors
///
/// Returns a length error for a bad key or nonce.
pub fn xsalsa20_encrypt(plaintext: &[u8], key: &[u8], nonce: &[u8]) -> CryptoResult<Vec<u8>> {
    XSalsa20::new(key, nonce)?.encrypt(plaintext)
}

/// One-shot XSalsa20 decryption. Identical to [`xsalsa20_encrypt`].
///
/// # Errors
///
/// See [`xsalsa20_encrypt`].
pub fn xsalsa20_decrypt(ciphertext: &[u8], key: &[u8], nonce: &[u8]) -> CryptoResult<Vec<u8>> {
    xsalsa20_encrypt(ciphertext, key, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRSTKEY: &str = "1b27556473e985d462cd51197a9a46c76009549eac6474f206c4ee0844f68389";
    const NONCE: &str = "69696ee955b62b73cd62bda875fc73d68219e0036b7a0b37";

    #[test]
    fn test_hsalsa20_nacl_vector() {
        let shared: [u8; 32] =
            hex::decode("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(hex::encode(hsalsa20(&shared, &[0u8; 16])), FIRSTKEY);
    }

    #[test]
    fn test_keystream_first_block() {
        let key = hex::decode(FIRSTKEY).unwrap();
        let nonce = hex::decode(NONCE).unwrap();
        let keystream = xsalsa20_encrypt(&[0u8; 64], &key, &nonce).unwrap();
        assert_eq!(
            hex::encode(keystream),
            "eea6a7251c1e72916d11c2cb214d3c252539121d8e234e652d651fa4c8cff880\
             309e645a74e9e0a60d8243acd9177ab51a1beb8d5a2f5d700c093c5e55855796"
        );
    }

    #[test]
    fn test_zero_key_zero_nonce() {
        let keystream = xsalsa20_encrypt(&[0u8; 32], &[0u8; 32], &[0u8; 24]).unwrap();
        assert_eq!(
            hex::encode(keystream),
            "ba6e26df4b2ea2cf64d2d3636623b5f45c8636d9998d194d605ac3ba3cff1512"
        );
    }

    #[test]
    fn test_encrypt_decrypt() {
        let key: Vec<u8> = (0u8..32).collect();
        let nonce: Vec<u8> = (0u8..24).collect();
        let ciphertext = xsalsa20_encrypt(b"Hello, XSalsa20!", &key, &nonce).unwrap();
        assert_eq!(hex::encode(&ciphertext), "34d30cc3b2b2e61edc36b11e4501c915");
        assert_eq!(
            xsalsa20_decrypt(&ciphertext, &key, &nonce).unwrap(),
            b"Hello, XSalsa20!"
        );
    }

    #[test]
    fn test_split_calls_match_single_call() {
        let key = [3u8; 32];
        let nonce = [4u8; 24];
        let data = vec![0x5au8; 333];
        let whole = xsalsa20_encrypt(&data, &key, &nonce).unwrap();

        let mut cipher = XSalsa20::new(&key, &nonce).unwrap();
        let mut pieces = Vec::new();
        for chunk in data.chunks(63) {
            pieces.extend(cipher.encrypt(chunk).unwrap());
        }
        assert_eq!(pieces, whole);
        assert_eq!(cipher.counter(), 6);
    }

    #[test]
    fn test_invalid_lengths() {
        assert!(matches!(
            XSalsa20::new(&[0u8; 33], &[0u8; 24]),
            Err(CryptoError::InvalidKeyLength { .. })
        ));
        assert_eq!(
            XSalsa20::new(&[0u8; 32], &[0u8; 12]).unwrap_err(),
            CryptoError::InvalidNonceLength {
                expected: 24,
                actual: 12
            }
        );
    }
}
