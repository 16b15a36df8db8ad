use anyhow::{Context, Result};
use clap::Args;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use airdrop_merkle::{hex_encode, parse_hash, Airdrop, ClaimLedger, Hash};

use super::build_tree::MerkleArtifact;
use super::{claim_output, load_airdrop, record_index};

#[derive(Args, Debug)]
pub struct Cli {
    /// Airdrop file the root was built from
    #[arg(short, long)]
    airdrop: PathBuf,

    /// Expected Merkle root, e.g. as read back from the contract
    #[arg(short, long)]
    root: Option<String>,

    /// Merkle artifact produced by `build-tree`, checked claim by claim
    #[arg(short = 'm', long)]
    artifact: Option<PathBuf>,
}

/// Rebuilds the tree over `airdrop` and replays every claim through a fresh
/// contract model. Returns the rebuilt root.
///
/// With `expected_root` the rebuilt root must equal it. With `artifact` its
/// root, its claim count and every served claim must equal the rebuilt ones.
pub fn check(
    airdrop: &Airdrop,
    expected_root: Option<Hash>,
    artifact: Option<&MerkleArtifact>,
) -> Result<Hash> {
    let tree = airdrop.merkle_tree().context("Failed to build Merkle tree")?;
    let root = tree.root();

    if let Some(expected) = expected_root {
        if expected != root {
            anyhow::bail!(
                "Root mismatch: expected {}, rebuilt {}",
                hex_encode(expected),
                hex_encode(root)
            );
        }
    }

    if let Some(artifact) = artifact {
        if artifact.root != hex_encode(root) {
            anyhow::bail!("Artifact root {} differs from rebuilt root", artifact.root);
        }
        if artifact.claims.len() != airdrop.len() {
            anyhow::bail!(
                "Artifact has {} claims, airdrop has {} claimants",
                artifact.claims.len(),
                airdrop.len()
            );
        }
    }

    let mut ledger = ClaimLedger::new(u64::MAX);
    ledger.set_merkle_root(root)?;

    let mut indices = HashSet::with_capacity(airdrop.len());
    for (position, (address, allocation)) in airdrop.iter().enumerate() {
        let claim = claim_output(&tree, position, address, allocation)?;

        let proof = tree.proof(position)?;
        let receipt = ledger
            .claim(*address, claim.tokens, &proof, 0)
            .with_context(|| format!("Contract model rejected claim for {}", address))?;
        if receipt.index != claim.index {
            anyhow::bail!(
                "Index mismatch for {}: local {}, contract {}",
                address,
                claim.index,
                receipt.index
            );
        }
        record_index(&mut indices, claim.index, address)?;
        if let Some(artifact) = artifact {
            if artifact.claims[position] != claim {
                anyhow::bail!("Served claim for {} differs from rebuilt claim", address);
            }
        }
        tracing::debug!(%address, index = claim.index, "sanity checked");
    }

    Ok(root)
}

pub fn run(cli: &Cli) -> Result<()> {
    println!("Reading airdrop from {:?}...", cli.airdrop);
    let airdrop = load_airdrop(&cli.airdrop)?;

    let expected_root = cli
        .root
        .as_deref()
        .map(parse_hash)
        .transpose()
        .context("Invalid expected root")?;

    let artifact: Option<MerkleArtifact> = match &cli.artifact {
        Some(path) => {
            let content = fs::read_to_string(path).context("Failed to read Merkle artifact")?;
            Some(serde_json::from_str(&content).context("Failed to parse Merkle artifact")?)
        }
        None => None,
    };

    let root = check(&airdrop, expected_root, artifact.as_ref())?;
    println!("Generated Merkle root: {}", hex_encode(root));
    if expected_root.is_some() {
        println!("Root matches expected value");
    }
    if artifact.is_some() {
        println!("Artifact matches rebuilt claims");
    }
    println!("Sanity checked {} claims", airdrop.len());
    println!("All claim indices unique");
    Ok(())
}
