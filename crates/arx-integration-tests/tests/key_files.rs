//! Key files written by one handle are usable by another, and the
//! configured key path resolves through the config loader.

use arx_crypto::{Key, SecretBox, XNonce};

#[test]
fn saved_key_opens_sealed_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("box.key");

    let key = Key::generate();
    key.save(&path).unwrap();
    let nonce = XNonce::generate();
    let sealed = SecretBox::new(key.as_bytes())
        .unwrap()
        .seal(nonce.as_bytes(), b"persisted")
        .unwrap();

    let reloaded = Key::load(&path).unwrap();
    let opened = SecretBox::new(reloaded.as_bytes())
        .unwrap()
        .open(nonce.as_bytes(), &sealed)
        .unwrap();
    assert_eq!(opened, b"persisted");
}

#[test]
fn configured_key_file_is_generated_then_reused() {
    let home = tempfile::tempdir().unwrap();
    let key_path = home.path().join("keys").join("default.key");
    std::fs::write(
        home.path().join("config.toml"),
        format!("[keys]\nkey_file = {:?}\n", key_path.display().to_string()),
    )
    .unwrap();

    let resolved = arx_config::Config::load_with_home(home.path(), None).unwrap();
    let path = resolved.config.key_file_path().unwrap().unwrap();
    assert_eq!(path, key_path);

    let key = Key::load_or_generate(&path).unwrap();
    assert_eq!(Key::load(&path).unwrap().as_bytes(), key.as_bytes());
}
