use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use airdrop_merkle::{hex_encode, Airdrop};

use super::{claim_output, load_airdrop, record_index, write_json, ClaimOutput};

#[derive(Args, Debug)]
pub struct Cli {
    /// Airdrop file produced by `aggregate`
    #[arg(short, long)]
    airdrop: PathBuf,

    /// Output file for the Merkle root and every claimant's proof
    #[arg(short, long)]
    output: PathBuf,
}

/// Root plus the served proofs, in leaf order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleArtifact {
    pub root: String,
    pub leaf_count: usize,
    pub depth: usize,
    pub total_tokens: u64,
    pub claims: Vec<ClaimOutput>,
}

/// Builds the tree over `airdrop` and serves a claim for every claimant.
pub fn build_artifact(airdrop: &Airdrop) -> Result<MerkleArtifact> {
    let tree = airdrop.merkle_tree().context("Failed to build Merkle tree")?;

    let mut indices = HashSet::with_capacity(airdrop.len());
    let mut claims = Vec::with_capacity(airdrop.len());
    for (position, (address, allocation)) in airdrop.iter().enumerate() {
        let claim = claim_output(&tree, position, address, allocation)?;
        record_index(&mut indices, claim.index, address)?;
        claims.push(claim);
    }

    Ok(MerkleArtifact {
        root: hex_encode(tree.root()),
        leaf_count: tree.leaf_count(),
        depth: tree.depth(),
        total_tokens: airdrop.total_tokens().context("Airdrop total overflows")?,
        claims,
    })
}

pub fn run(cli: &Cli) -> Result<()> {
    println!("Reading airdrop from {:?}...", cli.airdrop);
    let airdrop = load_airdrop(&cli.airdrop)?;

    println!("Building Merkle tree over {} claimants...", airdrop.len());
    let artifact = build_artifact(&airdrop)?;
    println!("Merkle root: {}", artifact.root);

    println!("Writing Merkle artifact to {:?}...", cli.output);
    write_json(&cli.output, &artifact)?;

    println!("Done!");
    Ok(())
}
