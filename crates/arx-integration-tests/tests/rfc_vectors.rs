//! Published test vectors exercised through the public API only.

mod common;

use arx_crypto::{
    aead_decrypt, aead_encrypt, blake2b_hash, blake2b_mac, chacha20_block, chacha20_decrypt,
    chacha20_encrypt, hsalsa20, poly1305_auth, poly1305_verify, secretbox_open, secretbox_seal,
    xsalsa20_encrypt,
};
use common::{SUNSCREEN, counting_key, unhex};

#[test]
fn chacha20_block_function() {
    let nonce: [u8; 12] = unhex("000000090000004a00000000").try_into().unwrap();
    let block = chacha20_block(&counting_key(), 1, &nonce);
    assert_eq!(
        hex::encode(block),
        "10f1e7e4d13b5915500fdd1fa32071c4c7d1f4c733c068030422aa9ac3d46c4e\
         d2826446079faa0914c2d705d98b02a2b5129cd1de164eb9cbd083e8a2503c4e"
    );
}

#[test]
fn chacha20_encryption() {
    let key = counting_key();
    let nonce = unhex("000000000000004a00000000");
    let expected = unhex(
        "6e2e359a2568f98041ba0728dd0d6981e97e7aec1d4360c20a27afccfd9fae0b
         f91b65c5524733ab8f593dabcd62b3571639d624e65152ab8f530c359f0861d8
         07ca0dbf500d6a6156a38e088a22b65e52bc514d16ccf806818ce91ab7793736
         5af90bbf74a35be6b40b8eedf2785e42874d",
    );

    let ciphertext = chacha20_encrypt(SUNSCREEN, &key, &nonce, 1).unwrap();
    assert_eq!(ciphertext, expected);
    assert_eq!(chacha20_decrypt(&ciphertext, &key, &nonce, 1).unwrap(), SUNSCREEN);
}

#[test]
fn poly1305_mac() {
    let key = unhex("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
    let tag = poly1305_auth(b"Cryptographic Forum Research Group", &key).unwrap();
    assert_eq!(tag.to_hex(), "a8061dc1305136c6c22b8baf0c0127a9");

    let expected = unhex("a8061dc1305136c6c22b8baf0c0127a9");
    assert!(poly1305_verify(tag.as_bytes(), &expected).unwrap());
}

#[test]
fn chacha20_poly1305_aead() {
    let key: Vec<u8> = (0x80u8..=0x9f).collect();
    let nonce = unhex("070000004041424344454647");
    let aad = unhex("50515253c0c1c2c3c4c5c6c7");

    let sealed = aead_encrypt(SUNSCREEN, &key, &nonce, Some(&aad)).unwrap();
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
        &key,
        &nonce,
        Some(&aad),
    )
    .unwrap();
    assert_eq!(opened, SUNSCREEN);
}

#[test]
fn blake2b_reference_digests() {
    let abc = blake2b_hash(b"abc", 64, None).unwrap();
    assert_eq!(
        abc.to_hex(),
        "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d1\
         7d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"
    );

    // Keyed vector 255 of the reference KAT: key 0..64, message 0..255.
    let key: Vec<u8> = (0u8..64).collect();
    let message: Vec<u8> = (0u8..255).collect();
    let mac = blake2b_mac(&message, &key, 64).unwrap();
    assert_eq!(
        mac.to_hex(),
        "142709d62e28fcccd0af97fad0f8465b971e82201dc51070faa0372aa43e9248\
         4be1c1e73ba10906d5d1853db6a4106e0a7bf9800d373d6dee2d46d62ef2a461"
    );
}

#[test]
fn hsalsa20_derives_nacl_subkey() {
    let shared: [u8; 32] = unhex("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742")
        .try_into()
        .unwrap();
    assert_eq!(
        hex::encode(hsalsa20(&shared, &[0u8; 16])),
        "1b27556473e985d462cd51197a9a46c76009549eac6474f206c4ee0844f68389"
    );
}

#[test]
fn xsalsa20_keystream() {
    let stream = xsalsa20_encrypt(&[0u8; 80], &[0x11; 32], &[0x22; 24]).unwrap();
    assert_eq!(
        hex::encode(stream),
        "698a0c5d5a5be0b0409795c7c41a9ffea3e6e727c988fa974d59cc472952ed09\
         b51eb724f9c52da3d6db995435ef1024edbe60e9ef2978beb4026dcea9476be5\
         cad10f96f7df0d03c58b82db4eca7911"
    );
}

#[test]
fn secretbox_nacl_box() {
    let key = unhex("1b27556473e985d462cd51197a9a46c76009549eac6474f206c4ee0844f68389");
    let nonce = unhex("69696ee955b62b73cd62bda875fc73d68219e0036b7a0b37");
    let message = unhex(
        "be075fc53c81f2d5cf141316ebeb0c7b5228c52a4c62cbd44b66849b64244ffc
         e5ecbaaf33bd751a1ac728d45e6c61296cdc3c01233561f41db66cce314adb31
         0e3be8250c46f06dceea3a7fa1348057e2f6556ad6b1318a024a838f21af1fde
         048977eb48f59ffd4924ca1c60902e52f0a089bc76897040e082f937763848645e0705",
    );

    let boxed = secretbox_seal(&message, &key, &nonce).unwrap();
    assert_eq!(hex::encode(&boxed[..16]), "f3ffc7703f9400e52a7dfb4b3d3305d9");
    assert_eq!(
        hex::encode(&boxed[16..48]),
        "8e993b9f48681273c29650ba32fc76ce48332ea7164d96a4476fb8c531a1186a"
    );
    assert_eq!(secretbox_open(&boxed, &key, &nonce).unwrap(), message);
}
