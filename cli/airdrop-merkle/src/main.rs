#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

mod cmd;

use cmd::{aggregate, build_tree, claim, sanity_check, sum_check, verify};

#[derive(Parser, Debug)]
#[command(name = "airdrop")]
#[command(about = "Merkle airdrop commitment tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge eligibility sources into an airdrop file
    Aggregate(aggregate::Cli),
    /// Build the Merkle tree, root and per-claimant proofs
    BuildTree(build_tree::Cli),
    /// Generate the claim (amount, proof, index) for one address
    Claim(claim::Cli),
    /// Verify a proof against a root
    Verify(verify::Cli),
    /// Check every claim verifies and indices are unique
    SanityCheck(sanity_check::Cli),
    /// Check the airdrop total stays within budget
    SumCheck(sum_check::Cli),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate(args) => aggregate::run(&args)?,
        Commands::BuildTree(args) => build_tree::run(&args)?,
        Commands::Claim(args) => claim::run(&args)?,
        Commands::Verify(args) => verify::run(&args)?,
        Commands::SanityCheck(args) => sanity_check::run(&args)?,
        Commands::SumCheck(args) => sum_check::run(&args)?,
    }

    Ok(())
}
