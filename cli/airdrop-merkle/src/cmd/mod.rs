use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use airdrop_merkle::{
    hex_encode, leaf, verify as verify_proof, write_file_atomic, Address, Airdrop, AirdropFile,
    Allocation, MerkleTree,
};

pub mod aggregate;
pub mod build_tree;
pub mod claim;
pub mod sanity_check;
pub mod sum_check;
pub mod verify;

/// Everything a claimant needs to redeem: the served form of one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimOutput {
    pub address: String,
    /// Whole tokens.
    pub tokens: u64,
    /// Base units, `tokens * 10^18`, as a decimal string.
    pub amount: String,
    pub leaf: String,
    pub proof: Vec<String>,
    pub index: u64,
}

pub fn load_airdrop(path: &Path) -> Result<Airdrop> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read airdrop file {:?}", path))?;
    let file: AirdropFile =
        serde_json::from_str(&content).context("Failed to parse airdrop JSON")?;
    if file.airdrop.is_empty() {
        anyhow::bail!("Airdrop file {:?} has no claimants", path);
    }
    Ok(file.airdrop)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    write_file_atomic(path, &json_output)
        .with_context(|| format!("Failed to write {:?}", path))
}

/// Records a derived claim index, failing if another claimant already got it.
pub fn record_index(indices: &mut HashSet<u64>, index: u64, address: &Address) -> Result<()> {
    if !indices.insert(index) {
        anyhow::bail!("Claim index {} derived twice (at {})", index, address);
    }
    Ok(())
}

/// Builds the claim for the claimant at leaf `position`, checking that the
/// proof verifies against the tree's own root.
pub fn claim_output(
    tree: &MerkleTree,
    position: usize,
    address: &Address,
    allocation: &Allocation,
) -> Result<ClaimOutput> {
    let tokens = allocation
        .total()
        .with_context(|| format!("Allocation overflow for {}", address))?;
    let amount = leaf::scale_amount(tokens)
        .with_context(|| format!("Amount overflow for {}", address))?;
    let proof = tree.proof(position)?;
    let leaf = leaf::leaf_hash(address, amount);
    if tree.leaves()[position] != leaf {
        anyhow::bail!("Leaf at position {} does not belong to {}", position, address);
    }

    let index = verify_proof(&leaf, &proof, &tree.root())
        .index()
        .with_context(|| format!("Generated proof for {} does not verify", address))?;

    Ok(ClaimOutput {
        address: address.to_string(),
        tokens,
        amount: amount.to_string(),
        leaf: hex_encode(leaf),
        proof: proof.iter().map(hex_encode).collect(),
        index,
    })
}

#[cfg(test)]
pub(crate) fn sample_airdrop() -> Airdrop {
    [
        ("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC", 100),
        ("0x90f79bf6eb2c4f870365e785982e1f161e6e2f13", 200),
        ("0x15d34AAf54267DB7D7c367839AAf71A00a2C6A65", 300),
    ]
    .into_iter()
    .map(|(address, nft)| {
        (
            Address::parse(address).unwrap(),
            Allocation {
                nft,
                ..Allocation::default()
            },
        )
    })
    .collect()
}
