use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use airdrop_merkle::{hex_encode, Address};

use super::{claim_output, load_airdrop, write_json};

#[derive(Args, Debug)]
pub struct Cli {
    /// Airdrop file produced by `aggregate`
    #[arg(short, long)]
    airdrop: PathBuf,

    /// Claimant address
    #[arg(short = 'r', long)]
    address: String,

    /// Optional output JSON file for the claim
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(cli: &Cli) -> Result<()> {
    let address = Address::parse(&cli.address).context("Invalid claimant address")?;

    println!("Reading airdrop from {:?}...", cli.airdrop);
    let airdrop = load_airdrop(&cli.airdrop)?;

    println!("Looking up {}...", address);
    let position = airdrop
        .position(&address)
        .with_context(|| format!("Address {} is not eligible", address))?;
    let allocation = airdrop
        .get(&address)
        .with_context(|| format!("Address {} is not eligible", address))?;

    println!("Building Merkle tree...");
    let tree = airdrop.merkle_tree().context("Failed to build Merkle tree")?;

    println!("Generating Merkle proof...");
    let claim = claim_output(&tree, position, &address, allocation)?;

    if let Some(path) = &cli.output {
        println!("Writing claim JSON to {:?}...", path);
        write_json(path, &claim)?;
    }

    println!("\nClaim generated successfully!");
    println!("Merkle root: {}", hex_encode(tree.root()));
    println!("Claimant: {}", claim.address);
    println!("Tokens: {} ({} base units)", claim.tokens, claim.amount);
    println!("Claim index: {}", claim.index);
    println!("Proof length: {} nodes", claim.proof.len());
    for sibling in &claim.proof {
        println!("  {}", sibling);
    }

    Ok(())
}
