//! Hash command: BLAKE2b digests and keyed MACs.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use arx_config::Config;
use arx_crypto::{Blake2b, Digest};
use tracing::debug;

use crate::io::{Encoding, STDIO, load_key};

const READ_CHUNK: usize = 64 * 1024;

/// Hash `file` (stdin if absent) and print the digest.
pub(crate) fn run_hash(
    config: &Config,
    len: Option<usize>,
    key: Option<&Path>,
    file: Option<&Path>,
) -> Result<()> {
    let output_len = len.unwrap_or(config.hash.length);
    let encoding = Encoding::from_config(config)?;

    let mut hasher = match key {
        Some(path) => {
            let key = load_key(Some(path), config)?;
            Blake2b::new_keyed(output_len, key.as_bytes())?
        },
        None => Blake2b::new(output_len)?,
    };

    let digest = match file {
        Some(path) if path.as_os_str() != STDIO => {
            let reader = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            hash_reader(&mut hasher, reader)?
        },
        _ => hash_reader(&mut hasher, std::io::stdin().lock())?,
    };

    let label = file.map_or_else(|| STDIO.to_owned(), |p| p.display().to_string());
    println!("{}  {label}", encoding.encode(digest.as_bytes()));
    Ok(())
}

/// Feed a reader through `hasher` in fixed-size chunks.
pub(crate) fn hash_reader(hasher: &mut Blake2b, mut reader: impl Read) -> Result<Digest> {
    let mut buf = vec![0u8; READ_CHUNK];
    let mut total: u64 = 0;
    loop {
        let n = reader.read(&mut buf).context("failed to read input")?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n])?;
        total = total.saturating_add(n as u64);
    }
    debug!(bytes = total, output_len = hasher.output_len(), "hashed input");
    Ok(hasher.digest()?)
}
