use sha3::{Digest, Keccak256};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A 32-byte Keccak256 digest: leaves, internal nodes and roots alike.
pub type Hash = [u8; 32];

/// Computes Keccak256 over the concatenation of `parts`.
pub fn keccak256(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Hashes two nodes in the order given, `keccak256(left || right)`.
pub fn keccak256_hash(left: &Hash, right: &Hash) -> Hash {
    Keccak256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize()
        .into()
}

/// Hashes two nodes after ordering them byte-wise, smaller first.
///
/// This is the parent rule shared by the tree builder, the verifier and the
/// on-chain contract, so a parent can be recomputed without knowing which side
/// each child sat on.
pub fn hash_sorted_pair(a: &Hash, b: &Hash) -> Hash {
    if a <= b {
        keccak256_hash(a, b)
    } else {
        keccak256_hash(b, a)
    }
}

/// Formats bytes as a `0x`-prefixed lowercase hex string.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a 32-byte hash from hex, with or without the `0x` prefix.
///
/// # Errors
/// Returns an error if the input is not exactly 64 hex characters.
pub fn parse_hash(hash_str: &str) -> anyhow::Result<Hash> {
    let trimmed = hash_str.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if cleaned.len() != 64 {
        anyhow::bail!(
            "Invalid hash length: expected 64 hex chars, got {}",
            cleaned.len()
        );
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash)
        .map_err(|e| anyhow::anyhow!("Invalid hex encoding: {}", e))?;
    Ok(hash)
}

/// Writes `contents` to a sibling temp file and renames it over `path`, so a
/// crash never leaves a half-written artifact behind.
pub fn write_file_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    use anyhow::Context;

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).context("Failed to create temp file")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write to temp file")?;
    file.flush().context("Failed to flush temp file")?;
    std::fs::rename(&temp_path, path).context("Failed to move temp file to output")?;
    Ok(())
}
