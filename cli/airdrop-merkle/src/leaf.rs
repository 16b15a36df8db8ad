//! Leaf encoding: `keccak256(abi.encodePacked(address, uint256 amount))`.

use crate::address::Address;
use crate::common::{keccak256, Hash};

/// Decimals of the airdropped token; whole-token amounts are scaled by
/// `10^TOKEN_DECIMALS` before hashing.
pub const TOKEN_DECIMALS: u32 = 18;

/// Scales a whole-token amount to base units. `None` on overflow.
pub fn scale_amount(tokens: u64) -> Option<u128> {
    u128::from(tokens).checked_mul(10u128.checked_pow(TOKEN_DECIMALS)?)
}

/// Encodes an amount as a big-endian `uint256` word.
pub fn encode_uint256(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..32].copy_from_slice(&value.to_be_bytes());
    word
}

/// Hashes a claimant and an amount already expressed in base units.
pub fn leaf_hash(address: &Address, base_units: u128) -> Hash {
    keccak256(&[address.as_bytes(), &encode_uint256(base_units)])
}

/// Computes the Merkle leaf for a claimant entitled to `tokens` whole tokens.
///
/// Returns `None` if the scaled amount does not fit in 128 bits.
pub fn generate_leaf(address: &Address, tokens: u64) -> Option<Hash> {
    scale_amount(tokens).map(|units| leaf_hash(address, units))
}
