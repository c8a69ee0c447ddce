//! Little-endian word helpers and constant-time comparison.

use subtle::ConstantTimeEq;

/// Read a little-endian `u32` from the first four bytes of `bytes`.
///
/// Callers always pass slices carved from fixed-size arrays, so the
/// conversion cannot fail; a short slice yields zero-padded input.
#[inline]
pub(crate) fn load_u32_le(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    for (dst, src) in word.iter_mut().zip(bytes) {
        *dst = *src;
    }
    u32::from_le_bytes(word)
}

/// Read a little-endian `u64` from the first eight bytes of `bytes`.
#[inline]
pub(crate) fn load_u64_le(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    for (dst, src) in word.iter_mut().zip(bytes) {
        *dst = *src;
    }
    u64::from_le_bytes(word)
}

/// Decode `N` consecutive little-endian `u32` words.
#[inline]
pub(crate) fn load_words<const N: usize>(bytes: &[u8]) -> [u32; N] {
    let mut words = [0u32; N];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks(4)) {
        *word = load_u32_le(chunk);
    }
    words
}

/// Serialize 32-bit words little-endian into `out`.
#[inline]
pub(crate) fn store_words(words: &[u32], out: &mut [u8]) {
    for (chunk, word) in out.chunks_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes()[..chunk.len()]);
    }
}

/// XOR `keystream` into `data` byte for byte.
#[inline]
pub(crate) fn xor_in_place(data: &mut [u8], keystream: &[u8]) {
    for (byte, ks) in data.iter_mut().zip(keystream) {
        *byte ^= *ks;
    }
}

/// Compare two byte strings without early exit.
///
/// Lengths are public; only the contents are compared in constant time.
#[must_use]
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}
