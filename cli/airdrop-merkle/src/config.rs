/// Flat bonus for holders of the community NFT.
pub const TOKEN_AMOUNT_NFT: u64 = 400;

/// Flat bonus for governance voters and POAP holders.
pub const TOKEN_AMOUNT_VOTER: u64 = 399;

/// Vesting cutoff for early-contributor allocations.
pub const EARLY_CONTRIB_CAP: u64 = 20_000;

/// Upper bound on the sum of every allocation in an airdrop.
pub const EXPECTED_SUM: u64 = 3_500_000;

/// What to do when one source lists the same address twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DuplicatePolicy {
    /// The second entry fails aggregation with `DuplicateEntry`.
    Reject,
    /// Entries are summed, then clamped to the category cap if it has one.
    Additive,
}

/// Amounts and duplicate handling applied while aggregating sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationPolicy {
    pub nft_amount: u64,
    pub voter_amount: u64,
    pub early_contrib_cap: u64,
    pub nft: DuplicatePolicy,
    pub voter: DuplicatePolicy,
    pub early_contrib: DuplicatePolicy,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        AggregationPolicy {
            nft_amount: TOKEN_AMOUNT_NFT,
            voter_amount: TOKEN_AMOUNT_VOTER,
            early_contrib_cap: EARLY_CONTRIB_CAP,
            nft: DuplicatePolicy::Reject,
            voter: DuplicatePolicy::Reject,
            early_contrib: DuplicatePolicy::Reject,
        }
    }
}
