//! Poly1305 one-time authenticator (RFC 8439 §2.5).
//!
//! The accumulator is a 130-bit value held in five 26-bit limbs so that
//! every limb product fits in a `u64`. Reduction modulo 2^130 - 5 folds the
//! overflow above bit 130 back in multiplied by 5.
//!
//! A Poly1305 key must never authenticate more than one message.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult, check_key_len, check_tag_len};
use crate::util::{ct_eq, load_u32_le};
use crate::{KEY_SIZE, TAG_SIZE};

/// Size of one Poly1305 input block.
const BLOCK: usize = 16;

const LIMB_MASK: u32 = 0x03ff_ffff;

/// The 2^128 bit appended to every full block, as it lands in limb 4.
const HIBIT: u32 = 1 << 24;

/// A 16-byte authentication tag.
///
/// Equality is evaluated in constant time.
#[derive(Clone, Copy)]
pub struct Tag([u8; TAG_SIZE]);

impl Tag {
    /// Create from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; TAG_SIZE]) -> Self {
        Self(bytes)
    }

    /// Try to create from a slice.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidTagLength`] if the slice is not exactly 16 bytes.
    pub fn try_from_slice(slice: &[u8]) -> CryptoResult<Self> {
        check_tag_len(slice.len(), TAG_SIZE)?;
        let mut bytes = [0u8; TAG_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; TAG_SIZE] {
        &self.0
    }

    /// Compare against untrusted tag bytes without early exit.
    #[must_use]
    pub fn verify(&self, other: &[u8]) -> bool {
        ct_eq(&self.0, other)
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
    /// Returns an error if the string is not valid hex or not 16 bytes.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidHexEncoding)?;
        Self::try_from_slice(&bytes)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        ct_eq(&self.0, &other.0)
    }
}

impl Eq for Tag {}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.to_hex())
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; TAG_SIZE]> for Tag {
    fn from(bytes: [u8; TAG_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<Tag> for [u8; TAG_SIZE] {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

/// Streaming Poly1305 state.
///
/// `finalize` consumes the state, so a key cannot be reused by accident
/// through the same instance.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Poly1305 {
    r: [u32; 5],
    s: [u32; 4],
    h: [u32; 5],
    buffer: [u8; BLOCK],
    buffered: usize,
}

impl Poly1305 {
    /// Create a new authenticator from a 32-byte one-time key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if the key is not 32 bytes.
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        check_key_len(key.len(), KEY_SIZE)?;
        Ok(Self::from_key_bytes(key))
    }

    /// `key` is known to be 32 bytes.
    pub(crate) fn from_key_bytes(key: &[u8]) -> Self {
        // Clamp r: clear the top four bits of bytes 3, 7, 11, 15 and the
        // bottom two bits of bytes 4, 8, 12, folded into the limb masks.
        let r = [
            load_u32_le(&key[0..]) & 0x03ff_ffff,
            (load_u32_le(&key[3..]) >> 2) & 0x03ff_ff03,
            (load_u32_le(&key[6..]) >> 4) & 0x03ff_c0ff,
            (load_u32_le(&key[9..]) >> 6) & 0x03f0_3fff,
            (load_u32_le(&key[12..]) >> 8) & 0x000f_ffff,
        ];
        let s = [
            load_u32_le(&key[16..]),
            load_u32_le(&key[20..]),
            load_u32_le(&key[24..]),
            load_u32_le(&key[28..]),
        ];
        Self {
            r,
            s,
            h: [0; 5],
            buffer: [0; BLOCK],
            buffered: 0,
        }
    }

    /// Absorb more message bytes.
    #[allow(clippy::arithmetic_side_effects)] // buffered < BLOCK
    pub fn update(&mut self, data: &[u8]) {
        let mut data = data;

        if self.buffered > 0 {
            let take = (BLOCK - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered < BLOCK {
                return;
            }
            let mut block = self.buffer;
            self.process_block(&block, HIBIT);
            block.zeroize();
            self.buffered = 0;
        }

        let mut chunks = data.chunks_exact(BLOCK);
        for chunk in &mut chunks {
            self.process_block(chunk, HIBIT);
        }
        let rest = chunks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Produce the tag. The state is consumed and wiped.
    #[must_use]
    pub fn finalize(mut self) -> Tag {
        if self.buffered > 0 {
            let mut block = [0u8; BLOCK];
            block[..self.buffered].copy_from_slice(&self.buffer[..self.buffered]);
            block[self.buffered] = 1;
            self.process_block(&block, 0);
        }
        self.tag()
    }

    /// h = (h + block) * r mod 2^130 - 5
    #[allow(clippy::arithmetic_side_effects)] // limbs < 2^27, products fit in u64
    fn process_block(&mut self, block: &[u8], hibit: u32) {
        let [r0, r1, r2, r3, r4] = self.r.map(u64::from);
        let (s1, s2, s3, s4) = (r1 * 5, r2 * 5, r3 * 5, r4 * 5);

        let h0 = u64::from(self.h[0] + (load_u32_le(&block[0..]) & LIMB_MASK));
        let h1 = u64::from(self.h[1] + ((load_u32_le(&block[3..]) >> 2) & LIMB_MASK));
        let h2 = u64::from(self.h[2] + ((load_u32_le(&block[6..]) >> 4) & LIMB_MASK));
        let h3 = u64::from(self.h[3] + ((load_u32_le(&block[9..]) >> 6) & LIMB_MASK));
        let h4 = u64::from(self.h[4] + ((load_u32_le(&block[12..]) >> 8) | hibit));

        let d0 = h0 * r0 + h1 * s4 + h2 * s3 + h3 * s2 + h4 * s1;
        let mut d1 = h0 * r1 + h1 * r0 + h2 * s4 + h3 * s3 + h4 * s2;
        let mut d2 = h0 * r2 + h1 * r1 + h2 * r0 + h3 * s4 + h4 * s3;
        let mut d3 = h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * s4;
        let mut d4 = h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;

        // Partial carry; bits above 2^130 wrap around times 5.
        d1 += d0 >> 26;
        d2 += d1 >> 26;
        d3 += d2 >> 26;
        d4 += d3 >> 26;
        let carry = d4 >> 26;

        let mut n0 = (d0 & 0x03ff_ffff) + carry * 5;
        let n1 = (d1 & 0x03ff_ffff) + (n0 >> 26);
        n0 &= 0x03ff_ffff;

        self.h = [
            n0 as u32,
            n1 as u32,
            (d2 & 0x03ff_ffff) as u32,
            (d3 & 0x03ff_ffff) as u32,
            (d4 & 0x03ff_ffff) as u32,
        ];
    }

    /// Fully reduce h, add s mod 2^128 and serialize.
    #[allow(clippy::arithmetic_side_effects)] // limbs < 2^27 after carry
    fn tag(&self) -> Tag {
        let mut h = self.h;

        // Full carry propagation.
        let mut c = h[1] >> 26;
        h[1] &= LIMB_MASK;
        for i in 2..5 {
            h[i] += c;
            c = h[i] >> 26;
            h[i] &= LIMB_MASK;
        }
        h[0] += c * 5;
        c = h[0] >> 26;
        h[0] &= LIMB_MASK;
        h[1] += c;

        // g = h + 5 - 2^130; pick g when it did not go negative.
        let mut g = [0u32; 5];
        g[0] = h[0] + 5;
        c = g[0] >> 26;
        g[0] &= LIMB_MASK;
        for i in 1..4 {
            g[i] = h[i] + c;
            c = g[i] >> 26;
            g[i] &= LIMB_MASK;
        }
        g[4] = h[4].wrapping_add(c).wrapping_sub(1 << 26);

        let select_g = (g[4] >> 31).wrapping_sub(1);
        for (hi, gi) in h.iter_mut().zip(g) {
            *hi = (*hi & !select_g) | (gi & select_g);
        }

        // Pack into four 32-bit words (h mod 2^128).
        let packed = [
            h[0] | (h[1] << 26),
            (h[1] >> 6) | (h[2] << 20),
            (h[2] >> 12) | (h[3] << 14),
            (h[3] >> 18) | (h[4] << 8),
        ];

        let mut out = [0u8; TAG_SIZE];
        let mut carry = 0u64;
        for (i, (word, pad)) in packed.iter().zip(self.s).enumerate() {
            let f = u64::from(*word) + u64::from(pad) + carry;
            out[i * 4..i * 4 + 4].copy_from_slice(&(f as u32).to_le_bytes());
            carry = f >> 32;
        }
        h.zeroize();
        g.zeroize();
        Tag(out)
    }
}

impl fmt::Debug for Poly1305 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poly1305")
            .field("buffered", &self.buffered)
            .finish_non_exhaustive()
    }
}

/// Compute the Poly1305 tag of `message` under a one-time `key`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if the key is not 32 bytes.
pub fn poly1305_auth(message: &[u8], key: &[u8]) -> CryptoResult<Tag> {
    let mut mac = Poly1305::new(key)?;
    mac.update(message);
    Ok(mac.finalize())
}

/// Compare two tags in constant time.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidTagLength`] if either tag is not 16 bytes.
pub fn poly1305_verify(a: &[u8], b: &[u8]) -> CryptoResult<bool> {
    check_tag_len(a.len(), TAG_SIZE)?;
    check_tag_len(b.len(), TAG_SIZE)?;
    Ok(ct_eq(a, b))
}
