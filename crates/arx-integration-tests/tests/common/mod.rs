//! Shared fixtures for integration tests.

/// Decode a hex fixture, ignoring whitespace.
#[allow(dead_code)]
pub fn unhex(s: &str) -> Vec<u8> {
    let compact: String = s.split_whitespace().collect();
    hex::decode(compact).expect("fixture is valid hex")
}

/// Deterministic pseudo-random payload of `len` bytes.
#[allow(dead_code)]
pub fn payload(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| u8::try_from((i * 7 + 3) % 256).unwrap())
        .collect()
}

/// Fixed 32-byte key 0x00..=0x1f.
#[allow(dead_code)]
pub fn counting_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    for (i, b) in key.iter_mut().enumerate() {
        *b = u8::try_from(i).unwrap();
    }
    key
}

/// The RFC 8439 sample plaintext.
#[allow(dead_code)]
pub const SUNSCREEN: &[u8] = b"Ladies and Gentlemen of the class of '99: If I could offer you \
only one tip for the future, sunscreen would be it.";
