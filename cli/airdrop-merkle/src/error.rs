use crate::address::Address;
use crate::aggregate::Category;

/// Failure to parse an Ethereum address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid address length: expected 40 hex chars, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("bad EIP-55 checksum for {0}")]
    BadChecksum(String),

    #[error("zero address not allowed")]
    ZeroAddress,
}

/// Failure while merging eligibility sources into an airdrop.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("invalid address {input:?} in {category} source: {source}")]
    InvalidAddress {
        category: Category,
        input: String,
        #[source]
        source: AddressError,
    },

    #[error("invalid token amount {input:?} for {address}")]
    InvalidAmount { address: Address, input: String },

    #[error("duplicate {category} entry for {address}")]
    DuplicateEntry { category: Category, address: Address },

    #[error("token amount overflow for {0}")]
    AmountOverflow(Address),

    #[error("malformed {category} source: {source}")]
    Json {
        category: Category,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while building a tree or deriving its leaves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("cannot build a Merkle tree from zero leaves")]
    EmptyTree,

    #[error("leaf position {position} out of bounds (tree has {leaf_count} leaves)")]
    PositionOutOfBounds { position: usize, leaf_count: usize },

    #[error("token amount overflow for {0}")]
    AmountOverflow(Address),
}

/// Rejections raised by the claim ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    #[error("merkle root already initialized")]
    AlreadyInitialized,

    #[error("merkle root must not be zero")]
    ZeroRoot,

    #[error("merkle root has not been set")]
    RootUnset,

    #[error("invalid merkle proof")]
    InvalidProof,

    #[error("claim index {0} already claimed")]
    AlreadyClaimed(u64),

    #[error("claim window closed at {ends}, now {now}")]
    ClaimWindowClosed { ends: u64, now: u64 },

    #[error("claiming is paused")]
    Paused,

    #[error("token amount overflow")]
    AmountOverflow,
}
