use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use airdrop_merkle::config::{EARLY_CONTRIB_CAP, TOKEN_AMOUNT_NFT, TOKEN_AMOUNT_VOTER};
use airdrop_merkle::{AggregationPolicy, Aggregator, AirdropFile, DuplicatePolicy};

use super::write_json;

#[derive(Args, Debug)]
pub struct Cli {
    /// NFT holder list: {"addresses": [...]} or a bare array of addresses
    #[arg(short, long)]
    nft: PathBuf,

    /// Voter / POAP holder list: {"eligible_address": [{"address": ...}]}
    #[arg(short, long)]
    voters: PathBuf,

    /// Early contributor list: [{"address": ..., "tokens": "25,000"}]
    #[arg(short, long)]
    early_contrib: Option<PathBuf>,

    /// Output airdrop file
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    policy: PolicyArgs,
}

#[derive(Args, Debug)]
pub struct PolicyArgs {
    /// Tokens granted to each NFT holder
    #[arg(long, env = "AIRDROP_NFT_AMOUNT", default_value_t = TOKEN_AMOUNT_NFT)]
    nft_amount: u64,

    /// Tokens granted to each voter / POAP holder
    #[arg(long, env = "AIRDROP_VOTER_AMOUNT", default_value_t = TOKEN_AMOUNT_VOTER)]
    voter_amount: u64,

    /// Early contributor entries above this are clamped to it
    #[arg(long, env = "AIRDROP_EARLY_CONTRIB_CAP", default_value_t = EARLY_CONTRIB_CAP)]
    early_contrib_cap: u64,

    #[arg(long, value_enum, env = "AIRDROP_NFT_DUPLICATES", default_value_t = DuplicatePolicy::Reject)]
    nft_duplicates: DuplicatePolicy,

    #[arg(long, value_enum, env = "AIRDROP_VOTER_DUPLICATES", default_value_t = DuplicatePolicy::Reject)]
    voter_duplicates: DuplicatePolicy,

    #[arg(long, value_enum, env = "AIRDROP_EARLY_CONTRIB_DUPLICATES", default_value_t = DuplicatePolicy::Reject)]
    early_contrib_duplicates: DuplicatePolicy,
}

impl From<&PolicyArgs> for AggregationPolicy {
    fn from(args: &PolicyArgs) -> Self {
        AggregationPolicy {
            nft_amount: args.nft_amount,
            voter_amount: args.voter_amount,
            early_contrib_cap: args.early_contrib_cap,
            nft: args.nft_duplicates,
            voter: args.voter_duplicates,
            early_contrib: args.early_contrib_duplicates,
        }
    }
}

pub fn run(cli: &Cli) -> Result<()> {
    let mut aggregator = Aggregator::new(AggregationPolicy::from(&cli.policy));

    println!("Reading NFT holders from {:?}...", cli.nft);
    let nft = fs::read_to_string(&cli.nft).context("Failed to read NFT holder file")?;
    aggregator
        .add_nft_holders_json(&nft)
        .context("Failed to add NFT holders")?;

    println!("Reading voters from {:?}...", cli.voters);
    let voters = fs::read_to_string(&cli.voters).context("Failed to read voter file")?;
    aggregator
        .add_voters_json(&voters)
        .context("Failed to add voters")?;

    if let Some(path) = &cli.early_contrib {
        println!("Reading early contributors from {:?}...", path);
        let contributors =
            fs::read_to_string(path).context("Failed to read early contributor file")?;
        aggregator
            .add_early_contributors_json(&contributors)
            .context("Failed to add early contributors")?;
    }

    let airdrop = aggregator.finish();
    if airdrop.is_empty() {
        anyhow::bail!("No eligible addresses found");
    }
    let total = airdrop
        .total_tokens()
        .context("Airdrop total overflows")?;

    let claimants = airdrop.len();

    println!("Writing airdrop to {:?}...", cli.output);
    write_json(&cli.output, &AirdropFile { airdrop })?;

    println!("\nClaimants: {}", claimants);
    println!("Total tokens: {}", total);

    Ok(())
}
