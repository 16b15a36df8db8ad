use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::address::Address;
use crate::common::Hash;
use crate::error::TreeError;
use crate::leaf::{leaf_hash, scale_amount};
use crate::tree::MerkleTree;

/// Per-category entitlement of one claimant, in whole tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Allocation {
    pub nft: u64,
    pub voter: u64,
    pub early_contrib: u64,
}

impl Allocation {
    /// Sum of all categories, `None` on overflow.
    pub fn total(&self) -> Option<u64> {
        self.nft
            .checked_add(self.voter)?
            .checked_add(self.early_contrib)
    }
}

/// Claimants and their allocations, in the order they were first seen.
///
/// The order is the tree's leaf order, so it is preserved through
/// serialization: the JSON object is written and read back entry by entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Airdrop {
    entries: Vec<(Address, Allocation)>,
    positions: HashMap<Address, usize>,
}

impl Airdrop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, address: &Address) -> Option<&Allocation> {
        self.positions.get(address).map(|&i| &self.entries[i].1)
    }

    /// Position of `address` in leaf order.
    pub fn position(&self, address: &Address) -> Option<usize> {
        self.positions.get(address).copied()
    }

    /// Returns the allocation for `address`, appending an empty one if absent.
    pub fn entry(&mut self, address: Address) -> &mut Allocation {
        let next = self.entries.len();
        let position = *self.positions.entry(address).or_insert(next);
        if position == next {
            self.entries.push((address, Allocation::default()));
        }
        &mut self.entries[position].1
    }

    /// Inserts or replaces an allocation, keeping the existing position.
    pub fn insert(&mut self, address: Address, allocation: Allocation) {
        *self.entry(address) = allocation;
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Address, Allocation)> {
        self.entries.iter()
    }

    /// Total tokens across every claimant, `None` on overflow.
    pub fn total_tokens(&self) -> Option<u64> {
        self.entries
            .iter()
            .try_fold(0u64, |acc, (_, allocation)| acc.checked_add(allocation.total()?))
    }

    /// Merkle leaves in airdrop order.
    ///
    /// # Errors
    /// Returns [`TreeError::AmountOverflow`] if a claimant's total overflows.
    pub fn leaves(&self) -> Result<Vec<Hash>, TreeError> {
        self.entries
            .iter()
            .map(|(address, allocation)| -> Result<Hash, TreeError> {
                let units = allocation
                    .total()
                    .and_then(scale_amount)
                    .ok_or(TreeError::AmountOverflow(*address))?;
                Ok(leaf_hash(address, units))
            })
            .collect()
    }

    /// Builds the Merkle tree committing to this airdrop.
    pub fn merkle_tree(&self) -> Result<MerkleTree, TreeError> {
        MerkleTree::build(self.leaves()?)
    }
}

impl FromIterator<(Address, Allocation)> for Airdrop {
    fn from_iter<I: IntoIterator<Item = (Address, Allocation)>>(iter: I) -> Self {
        let mut airdrop = Airdrop::new();
        for (address, allocation) in iter {
            airdrop.insert(address, allocation);
        }
        airdrop
    }
}

impl Serialize for Airdrop {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (address, allocation) in &self.entries {
            map.serialize_entry(address, allocation)?;
        }
        map.end()
    }
}

struct AirdropVisitor;

impl<'de> Visitor<'de> for AirdropVisitor {
    type Value = Airdrop;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from address to allocation")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Airdrop, A::Error> {
        let mut airdrop = Airdrop::new();
        while let Some((address, allocation)) = access.next_entry::<Address, Allocation>()? {
            if airdrop.get(&address).is_some() {
                return Err(serde::de::Error::custom(format!(
                    "address {address} listed twice"
                )));
            }
            airdrop.insert(address, allocation);
        }
        Ok(airdrop)
    }
}

impl<'de> Deserialize<'de> for Airdrop {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AirdropVisitor)
    }
}

/// The version-controlled airdrop artifact, `{ "airdrop": { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropFile {
    pub airdrop: Airdrop,
}
