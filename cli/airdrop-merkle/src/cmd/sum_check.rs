use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use airdrop_merkle::config::EXPECTED_SUM;
use airdrop_merkle::Airdrop;

use super::load_airdrop;

#[derive(Args, Debug)]
pub struct Cli {
    /// Airdrop file produced by `aggregate`
    #[arg(short, long)]
    airdrop: PathBuf,

    /// Token budget the airdrop total must not exceed
    #[arg(short, long, env = "AIRDROP_MAX_TOTAL", default_value_t = EXPECTED_SUM)]
    max_total: u64,
}

/// Total tokens in `airdrop`, failing if it exceeds `max_total`.
pub fn check_budget(airdrop: &Airdrop, max_total: u64) -> Result<u64> {
    let total = airdrop
        .total_tokens()
        .context("Airdrop total overflows")?;
    if total > max_total {
        anyhow::bail!("Airdrop total {} exceeds budget {}", total, max_total);
    }
    Ok(total)
}

pub fn run(cli: &Cli) -> Result<()> {
    let airdrop = load_airdrop(&cli.airdrop)?;
    println!("Claimants: {}", airdrop.len());

    let total = check_budget(&airdrop, cli.max_total)?;
    println!("Total tokens: {}", total);
    println!("Within budget of {}", cli.max_total);
    Ok(())
}
