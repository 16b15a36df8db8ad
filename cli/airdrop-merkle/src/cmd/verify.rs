use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use airdrop_merkle::{generate_leaf, parse_hash, verify, Address};

use super::ClaimOutput;

#[derive(Args, Debug)]
pub struct Cli {
    /// Merkle root (hex format)
    #[arg(short, long)]
    root: String,

    /// Claim JSON produced by `claim`; replaces --address/--amount/--proof
    #[arg(short, long, conflicts_with_all = ["address", "amount", "proof"])]
    claim: Option<PathBuf>,

    /// Claimant address
    #[arg(short = 'a', long, requires = "amount")]
    address: Option<String>,

    /// Whole-token amount claimed
    #[arg(short = 'n', long, requires = "address")]
    amount: Option<u64>,

    /// Sibling hashes, leaf to root (repeat or comma separate)
    #[arg(short, long, value_delimiter = ',')]
    proof: Vec<String>,
}

fn load_claim(cli: &Cli) -> Result<(String, u64, Vec<String>)> {
    if let Some(path) = &cli.claim {
        let content = fs::read_to_string(path).context("Failed to read claim file")?;
        let claim: ClaimOutput =
            serde_json::from_str(&content).context("Failed to parse claim JSON")?;
        return Ok((claim.address, claim.tokens, claim.proof));
    }
    match (&cli.address, cli.amount) {
        (Some(address), Some(amount)) => Ok((address.clone(), amount, cli.proof.clone())),
        _ => anyhow::bail!("Either --claim or --address with --amount is required"),
    }
}

pub fn run(cli: &Cli) -> Result<()> {
    let root = parse_hash(&cli.root).context("Invalid Merkle root")?;
    let (address, tokens, proof) = load_claim(cli)?;

    let address = Address::parse(&address).context("Invalid claimant address")?;
    let proof = proof
        .iter()
        .map(|sibling| parse_hash(sibling))
        .collect::<Result<Vec<_>>>()
        .context("Invalid proof element")?;
    let leaf = generate_leaf(&address, tokens).context("Amount overflow")?;

    let result = verify(&leaf, &proof, &root);
    println!("Claimant: {}", address);
    println!("Tokens: {}", tokens);
    println!("Matches: {}", result.matches);
    match result.index() {
        Some(index) => println!("Claim index: {}", index),
        None => anyhow::bail!(
            "Proof does not match root; {} is not eligible for {} tokens",
            address,
            tokens
        ),
    }

    Ok(())
}
