#![forbid(unsafe_code)]

pub mod address;
pub mod aggregate;
pub mod allocation;
pub mod common;
pub mod config;
pub mod error;
pub mod leaf;
pub mod ledger;
pub mod tree;
pub mod verify;

pub use address::Address;
pub use aggregate::{Aggregator, Category};
pub use allocation::{Airdrop, AirdropFile, Allocation};
pub use common::{hash_sorted_pair, hex_encode, keccak256, parse_hash, write_file_atomic, Hash};
pub use config::{AggregationPolicy, DuplicatePolicy};
pub use error::{AddressError, AggregateError, ClaimError, TreeError};
pub use leaf::{generate_leaf, TOKEN_DECIMALS};
pub use ledger::{ClaimBitmap, ClaimLedger, ClaimReceipt, RootState};
pub use tree::MerkleTree;
pub use verify::{derive_index, verify, Verification};
