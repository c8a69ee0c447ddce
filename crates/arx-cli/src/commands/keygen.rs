//! Keygen command: create a 256-bit key.

use std::path::Path;

use anyhow::Context;
use arx_crypto::Key;

use crate::theme::Theme;

/// Generate a key. Without `out` the hex key goes to stdout.
pub(crate) fn generate_key(out: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let Some(path) = out else {
        let key = Key::generate();
        println!("{}", key.to_hex().as_str());
        return Ok(());
    };

    if path.exists() && !force {
        println!(
            "{}",
            Theme::warning("A key file already exists at this path. This will replace it.")
        );
        println!(
            "{}",
            Theme::warning("Anything sealed with the old key can no longer be opened.")
        );
        println!();

        let confirm = dialoguer::Confirm::new()
            .with_prompt("Replace existing key?")
            .default(false)
            .interact()?;

        if !confirm {
            println!("{}", Theme::info("Aborted."));
            return Ok(());
        }
    }

    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
    }

    Key::generate()
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("{}", Theme::success("New key generated."));
    println!("{}", Theme::kv("Key file", &path.display().to_string()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_to_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("new.key");

        generate_key(Some(&path), false).unwrap();
        assert!(Key::load(&path).is_ok());
    }

    #[test]
    fn test_force_replaces_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k.key");
        Key::from_bytes([1u8; 32]).save(&path).unwrap();

        generate_key(Some(&path), true).unwrap();
        assert_ne!(Key::load(&path).unwrap().as_bytes(), &[1u8; 32]);
    }
}
