//! BLAKE2b hash function (RFC 7693).
//!
//! Supports digests of 1 to 64 bytes and an optional key of up to 64 bytes,
//! which turns the hash into a MAC. The key is padded to a full block and
//! absorbed before any message data.

use tracing::trace;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::digest::{Digest, MAX_DIGEST_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::util::load_u64_le;

/// BLAKE2b block size in bytes.
pub const BLAKE2B_BLOCK_SIZE: usize = 128;

/// Longest key BLAKE2b accepts, in bytes.
pub const BLAKE2B_MAX_KEY_SIZE: usize = 64;

const IV: [u64; 8] = [
    0x6a09_e667_f3bc_c908,
    0xbb67_ae85_84ca_a73b,
    0x3c6e_f372_fe94_f82b,
    0xa54f_f53a_5f1d_36f1,
    0x510e_527f_ade6_82d1,
    0x9b05_688c_2b3e_6c1f,
    0x1f83_d9ab_fb41_bd6b,
    0x5be0_cd19_137e_2179,
];

/// Message word schedule; rounds 10 and 11 reuse rows 0 and 1.
const SIGMA: [[usize; 16]; 12] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
];

#[inline(always)]
#[allow(clippy::many_single_char_names)]
fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

/// Streaming BLAKE2b state.
///
/// # Example
///
/// ```
/// use arx_crypto::{Blake2b, blake2b_hash};
///
/// let mut hasher = Blake2b::new(32)?;
/// hasher.update(b"hello ")?;
/// hasher.update(b"world")?;
/// let digest = hasher.digest()?;
///
/// assert_eq!(digest, blake2b_hash(b"hello world", 32, None)?);
/// # Ok::<(), arx_crypto::CryptoError>(())
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Blake2b {
    h: [u64; 8],
    /// Bytes compressed so far.
    t: u128,
    buffer: [u8; BLAKE2B_BLOCK_SIZE],
    buffered: usize,
    output_len: usize,
    finalized: bool,
}

impl Blake2b {
    /// Create an unkeyed hasher producing `output_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidOutputLength`] unless `1 <= output_len <= 64`.
    pub fn new(output_len: usize) -> CryptoResult<Self> {
        Self::new_keyed(output_len, &[])
    }

    /// Create a keyed hasher (MAC mode). An empty key means unkeyed.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidOutputLength`] for a bad output length,
    /// or [`CryptoError::InvalidKeyLength`] if the key exceeds 64 bytes.
    pub fn new_keyed(output_len: usize, key: &[u8]) -> CryptoResult<Self> {
        if output_len == 0 || output_len > MAX_DIGEST_SIZE {
            return Err(CryptoError::InvalidOutputLength {
                max: MAX_DIGEST_SIZE,
                actual: output_len,
            });
        }
        if key.len() > BLAKE2B_MAX_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: BLAKE2B_MAX_KEY_SIZE,
                actual: key.len(),
            });
        }

        // Parameter block word 0: digest length, key length, fanout 1, depth 1.
        #[allow(clippy::arithmetic_side_effects)] // key.len() <= 64
        let param = 0x0101_0000 ^ ((key.len() as u64) << 8) ^ output_len as u64;
        let mut h = IV;
        h[0] ^= param;

        let mut state = Self {
            h,
            t: 0,
            buffer: [0u8; BLAKE2B_BLOCK_SIZE],
            buffered: 0,
            output_len,
            finalized: false,
        };
        if !key.is_empty() {
            state.buffer[..key.len()].copy_from_slice(key);
            state.buffered = BLAKE2B_BLOCK_SIZE;
        }
        Ok(state)
    }

    /// Requested digest length in bytes.
    #[must_use]
    pub fn output_len(&self) -> usize {
        self.output_len
    }

    /// Absorb more data. May be called any number of times before
    /// [`Blake2b::digest`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::StateReuse`] after the digest was taken.
    #[allow(clippy::arithmetic_side_effects)] // buffered <= block size
    pub fn update(&mut self, data: &[u8]) -> CryptoResult<()> {
        if self.finalized {
            return Err(CryptoError::StateReuse);
        }

        let mut data = data;
        let free = BLAKE2B_BLOCK_SIZE - self.buffered;

        // The last block must stay buffered until digest() so it can carry
        // the finalization flag; only compress when more input follows.
        if data.len() > free {
            self.buffer[self.buffered..].copy_from_slice(&data[..free]);
            data = &data[free..];
            let block = self.buffer;
            self.compress_block(&block, false);
            self.buffered = 0;

            while data.len() > BLAKE2B_BLOCK_SIZE {
                let (block, rest) = data.split_at(BLAKE2B_BLOCK_SIZE);
                self.compress_block(block, false);
                data = rest;
            }
        }

        self.buffer[self.buffered..self.buffered + data.len()].copy_from_slice(data);
        self.buffered += data.len();
        Ok(())
    }

    /// Finish the hash. The state is wiped and cannot be used again.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::StateReuse`] if called a second time.
    pub fn digest(&mut self) -> CryptoResult<Digest> {
        if self.finalized {
            return Err(CryptoError::StateReuse);
        }

        self.buffer[self.buffered..].fill(0);
        let block = self.buffer;
        self.compress_final(&block);

        let mut out = [0u8; MAX_DIGEST_SIZE];
        for (chunk, word) in out.chunks_mut(8).zip(self.h) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        let output_len = self.output_len;
        let digest = Digest::try_from_slice(&out[..output_len]);

        out.zeroize();
        self.zeroize();
        self.finalized = true;

        trace!(output_len, "blake2b digest");
        digest
    }

    /// Consume the hasher and return the digest.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::StateReuse`] if [`Blake2b::digest`] was
    /// already called.
    pub fn finalize(mut self) -> CryptoResult<Digest> {
        self.digest()
    }

    #[allow(clippy::arithmetic_side_effects)] // buffered <= block size
    fn compress_final(&mut self, block: &[u8; BLAKE2B_BLOCK_SIZE]) {
        self.t = self.t.wrapping_add(self.buffered as u128);
        self.compress(block, true);
    }

    fn compress_block(&mut self, block: &[u8], last: bool) {
        self.t = self.t.wrapping_add(BLAKE2B_BLOCK_SIZE as u128);
        self.compress(block, last);
    }

    fn compress(&mut self, block: &[u8], last: bool) {
        let mut m = [0u64; 16];
        for (word, chunk) in m.iter_mut().zip(block.chunks_exact(8)) {
            *word = load_u64_le(chunk);
        }

        let mut v = [0u64; 16];
        v[..8].copy_from_slice(&self.h);
        v[8..].copy_from_slice(&IV);
        v[12] ^= self.t as u64;
        v[13] ^= (self.t >> 64) as u64;
        if last {
            v[14] = !v[14];
        }

        for s in &SIGMA {
            g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
            g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
            g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
            g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
            g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
            g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
            g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
            g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
        }

        for (i, h) in self.h.iter_mut().enumerate() {
            *h ^= v[i] ^ v[i | 8];
        }

        m.zeroize();
        v.zeroize();
    }
}

impl std::fmt::Debug for Blake2b {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blake2b")
            .field("output_len", &self.output_len)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

/// One-shot BLAKE2b, optionally keyed.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidOutputLength`] or
/// [`CryptoError::InvalidKeyLength`] for bad parameters.
pub fn blake2b_hash(data: &[u8], output_len: usize, key: Option<&[u8]>) -> CryptoResult<Digest> {
    let mut hasher = Blake2b::new_keyed(output_len, key.unwrap_or_default())?;
    hasher.update(data)?;
    hasher.finalize()
}

/// Keyed BLAKE2b used as a MAC.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if the key is empty or longer
/// than 64 bytes, or [`CryptoError::InvalidOutputLength`].
pub fn blake2b_mac(data: &[u8], key: &[u8], output_len: usize) -> CryptoResult<Digest> {
    if key.is_empty() {
        return Err(CryptoError::InvalidKeyLength {
            expected: BLAKE2B_MAX_KEY_SIZE,
            actual: 0,
        });
    }
    blake2b_hash(data, output_len, Some(key))
}
