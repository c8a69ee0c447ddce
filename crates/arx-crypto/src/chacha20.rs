//! ChaCha20 stream cipher (RFC 8439 §2.3–2.4).
//!
//! 256-bit key, 96-bit nonce, 32-bit block counter. Encryption and
//! decryption are the same operation: the keystream is XORed into the
//! input. Unused keystream from a partial block is kept for the next call,
//! so splitting input across calls gives the same bytes as one call.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult, check_key_len, check_nonce_len};
use crate::util::{load_words, store_words, xor_in_place};
use crate::{BLOCK_SIZE, KEY_SIZE, NONCE_SIZE};

/// `"expand 32-byte k"` as little-endian words.
const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Index of the block counter word in the state.
const COUNTER_WORD: usize = 12;

#[inline(always)]
fn quarter_round(s: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    s[a] = s[a].wrapping_add(s[b]);
    s[d] = (s[d] ^ s[a]).rotate_left(16);
    s[c] = s[c].wrapping_add(s[d]);
    s[b] = (s[b] ^ s[c]).rotate_left(12);
    s[a] = s[a].wrapping_add(s[b]);
    s[d] = (s[d] ^ s[a]).rotate_left(8);
    s[c] = s[c].wrapping_add(s[d]);
    s[b] = (s[b] ^ s[c]).rotate_left(7);
}

/// Run the 20-round permutation and add the input state back in.
fn permute(input: &[u32; 16]) -> [u32; 16] {
    let mut x = *input;
    for _ in 0..10 {
        // Column round.
        quarter_round(&mut x, 0, 4, 8, 12);
        quarter_round(&mut x, 1, 5, 9, 13);
        quarter_round(&mut x, 2, 6, 10, 14);
        quarter_round(&mut x, 3, 7, 11, 15);
        // Diagonal round.
        quarter_round(&mut x, 0, 5, 10, 15);
        quarter_round(&mut x, 1, 6, 11, 12);
        quarter_round(&mut x, 2, 7, 8, 13);
        quarter_round(&mut x, 3, 4, 9, 14);
    }
    for (out, word) in x.iter_mut().zip(input) {
        *out = out.wrapping_add(*word);
    }
    x
}

fn initial_state(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], counter: u32) -> [u32; 16] {
    let mut state = [0u32; 16];
    state[..4].copy_from_slice(&CONSTANTS);
    state[4..12].copy_from_slice(&load_words::<8>(key));
    state[COUNTER_WORD] = counter;
    state[13..].copy_from_slice(&load_words::<3>(nonce));
    state
}

/// Compute a single serialized keystream block.
#[must_use]
pub fn chacha20_block(key: &[u8; KEY_SIZE], counter: u32, nonce: &[u8; NONCE_SIZE]) -> [u8; 64] {
    let mut state = initial_state(key, nonce, counter);
    let mut words = permute(&state);
    let mut out = [0u8; BLOCK_SIZE];
    store_words(&words, &mut out);
    state.zeroize();
    words.zeroize();
    out
}

/// A ChaCha20 keystream generator.
///
/// # Example
///
/// ```
/// use arx_crypto::ChaCha20;
///
/// let key = [7u8; 32];
/// let nonce = [1u8; 12];
///
/// let ciphertext = ChaCha20::new(&key, &nonce)?.encrypt(b"attack at dawn")?;
/// let plaintext = ChaCha20::new(&key, &nonce)?.decrypt(&ciphertext)?;
/// assert_eq!(plaintext, b"attack at dawn");
/// # Ok::<(), arx_crypto::CryptoError>(())
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ChaCha20 {
    state: [u32; 16],
    keystream: [u8; BLOCK_SIZE],
    /// Bytes of `keystream` already consumed; `BLOCK_SIZE` means empty.
    offset: usize,
    /// Set once the block for counter `u32::MAX` has been produced.
    exhausted: bool,
}

impl ChaCha20 {
    /// Create a cipher starting at block counter 0.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] unless the key is 32 bytes,
    /// or [`CryptoError::InvalidNonceLength`] unless the nonce is 12 bytes.
    pub fn new(key: &[u8], nonce: &[u8]) -> CryptoResult<Self> {
        Self::with_counter(key, nonce, 0)
    }

    /// Create a cipher starting at the given block counter.
    ///
    /// # Errors
    ///
    /// Same as [`ChaCha20::new`].
    pub fn with_counter(key: &[u8], nonce: &[u8], counter: u32) -> CryptoResult<Self> {
        check_key_len(key.len(), KEY_SIZE)?;
        check_nonce_len(nonce.len(), NONCE_SIZE)?;

        let mut key_arr = [0u8; KEY_SIZE];
        key_arr.copy_from_slice(key);
        let mut nonce_arr = [0u8; NONCE_SIZE];
        nonce_arr.copy_from_slice(nonce);

        let cipher = Self::from_parts(&key_arr, &nonce_arr, counter);
        key_arr.zeroize();
        Ok(cipher)
    }

    pub(crate) fn from_parts(
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        counter: u32,
    ) -> Self {
        Self {
            state: initial_state(key, nonce, counter),
            keystream: [0u8; BLOCK_SIZE],
            offset: BLOCK_SIZE,
            exhausted: false,
        }
    }

    /// The counter of the next block to be generated.
    #[must_use]
    pub fn counter(&self) -> u32 {
        self.state[COUNTER_WORD]
    }

    /// XOR the keystream into `data` in place.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CounterOverflow`] if `data` needs more blocks
    /// than the 32-bit counter has left. `data` is untouched in that case.
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
    /// See [`ChaCha20::apply_keystream`].
    pub fn encrypt(&mut self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut out = plaintext.to_vec();
        self.apply_keystream(&mut out)?;
        Ok(out)
    }

    /// Decrypt `ciphertext`. Identical to [`ChaCha20::encrypt`].
    ///
    /// # Errors
    ///
    /// See [`ChaCha20::apply_keystream`].
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.encrypt(ciphertext)
    }

    #[allow(clippy::arithmetic_side_effects)] // offset <= BLOCK_SIZE, counter <= u32::MAX
    fn check_capacity(&self, len: usize) -> CryptoResult<()> {
        let buffered = BLOCK_SIZE - self.offset;
        let blocks = u64::try_from(len.saturating_sub(buffered).div_ceil(BLOCK_SIZE))
            .unwrap_or(u64::MAX);
        let remaining = if self.exhausted {
            0
        } else {
            u64::from(u32::MAX - self.state[COUNTER_WORD]) + 1
        };
        if blocks > remaining {
            return Err(CryptoError::CounterOverflow);
        }
        Ok(())
    }

    fn refill(&mut self) {
        let mut words = permute(&self.state);
        store_words(&words, &mut self.keystream);
        words.zeroize();
        self.offset = 0;
        match self.state[COUNTER_WORD].checked_add(1) {
            Some(next) => self.state[COUNTER_WORD] = next,
            None => self.exhausted = true,
        }
    }
}

impl std::fmt::Debug for ChaCha20 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaCha20")
            .field("counter", &self.counter())
            .finish_non_exhaustive()
    }
}

/// One-shot ChaCha20 encryption starting at `counter`.
///
/// # Errors
///
/// Returns a length error for a bad key or nonce, or
/// [`CryptoError::CounterOverflow`] if the input is too long for `counter`.
pub fn chacha20_encrypt(
    plaintext: &[u8],
    key: &[u8],
    nonce: &[u8],
    counter: u32,
) -> CryptoResult<Vec<u8>> {
    ChaCha20::with_counter(key, nonce, counter)?.encrypt(plaintext)
}

/// One-shot ChaCha20 decryption. Identical to [`chacha20_encrypt`].
///
/// # Errors
///
/// See [`chacha20_encrypt`].
pub fn chacha20_decrypt(
    ciphertext: &[u8],
    key: &[u8],
    nonce: &[u8],
    counter: u32,
) -> CryptoResult<Vec<u8>> {
    chacha20_encrypt(ciphertext, key, nonce, counter)
}
