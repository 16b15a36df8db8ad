//! In-process model of the claim contract.
//!
//! Mirrors what the contract enforces around the shared verifier: a root that
//! can be set exactly once, a claim window, a pause switch, and a bitmap keyed
//! by the index derived while verifying. Token transfers are out of scope; a
//! successful claim yields a [`ClaimReceipt`] instead.

use std::collections::HashMap;

use crate::address::Address;
use crate::common::{hex_encode, Hash};
use crate::error::ClaimError;
use crate::leaf::{leaf_hash, scale_amount};
use crate::verify::verify;

/// Bits per bitmap word, matching a `uint256` storage slot.
pub const WORD_BITS: u64 = 256;

/// One-time commitment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootState {
    #[default]
    Unset,
    Set(Hash),
}

/// Claimed-index bitmap addressed as `word = index / 256`, `bit = index % 256`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimBitmap {
    words: HashMap<u64, [u64; 4]>,
}

impl ClaimBitmap {
    /// Storage word and bit offset holding `index`.
    pub fn word_position(index: u64) -> (u64, u32) {
        (index / WORD_BITS, (index % WORD_BITS) as u32)
    }

    pub fn is_claimed(&self, index: u64) -> bool {
        let (word, bit) = Self::word_position(index);
        self.words
            .get(&word)
            .is_some_and(|limbs| limbs[(bit / 64) as usize] & (1u64 << (bit % 64)) != 0)
    }

    pub fn set_claimed(&mut self, index: u64) {
        let (word, bit) = Self::word_position(index);
        let limbs = self.words.entry(word).or_insert([0u64; 4]);
        limbs[(bit / 64) as usize] |= 1u64 << (bit % 64);
    }

    /// Number of claimed indices.
    pub fn count(&self) -> u32 {
        self.words
            .values()
            .flat_map(|limbs| limbs.iter())
            .map(|limb| limb.count_ones())
            .sum()
    }
}

/// Result of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub claimant: Address,
    /// Amount in base units (`tokens * 10^18`).
    pub amount: u128,
    pub index: u64,
}

#[derive(Debug, Clone)]
pub struct ClaimLedger {
    root: RootState,
    claim_period_ends: u64,
    paused: bool,
    claimed: ClaimBitmap,
}

impl ClaimLedger {
    /// Creates a ledger accepting claims until `claim_period_ends` (unix
    /// seconds, inclusive).
    pub fn new(claim_period_ends: u64) -> Self {
        ClaimLedger {
            root: RootState::Unset,
            claim_period_ends,
            paused: false,
            claimed: ClaimBitmap::default(),
        }
    }

    pub fn root_state(&self) -> RootState {
        self.root
    }

    pub fn merkle_root(&self) -> Option<Hash> {
        match self.root {
            RootState::Set(root) => Some(root),
            RootState::Unset => None,
        }
    }

    /// Publishes the commitment. Allowed exactly once.
    ///
    /// # Errors
    /// [`ClaimError::AlreadyInitialized`] once a root is set (the existing root
    /// is kept), [`ClaimError::ZeroRoot`] for an all-zero root.
    pub fn set_merkle_root(&mut self, root: Hash) -> Result<(), ClaimError> {
        if let RootState::Set(_) = self.root {
            return Err(ClaimError::AlreadyInitialized);
        }
        if root == [0u8; 32] {
            return Err(ClaimError::ZeroRoot);
        }
        self.root = RootState::Set(root);
        tracing::info!(root = %hex_encode(root), "merkle root set");
        Ok(())
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_claimed(&self, index: u64) -> bool {
        self.claimed.is_claimed(index)
    }

    pub fn claimed(&self) -> &ClaimBitmap {
        &self.claimed
    }

    /// Redeems `tokens` whole tokens for `claimant` at time `now`.
    ///
    /// The leaf is recomputed from the caller and amount, so a proof only
    /// works for the claimant it was issued to.
    pub fn claim(
        &mut self,
        claimant: Address,
        tokens: u64,
        proof: &[Hash],
        now: u64,
    ) -> Result<ClaimReceipt, ClaimError> {
        if now > self.claim_period_ends {
            return Err(ClaimError::ClaimWindowClosed {
                ends: self.claim_period_ends,
                now,
            });
        }
        if self.paused {
            return Err(ClaimError::Paused);
        }
        let root = self.merkle_root().ok_or(ClaimError::RootUnset)?;

        let amount = scale_amount(tokens).ok_or(ClaimError::AmountOverflow)?;
        let leaf = leaf_hash(&claimant, amount);
        let Some(index) = verify(&leaf, proof, &root).index() else {
            tracing::warn!(%claimant, tokens, "rejected claim with invalid proof");
            return Err(ClaimError::InvalidProof);
        };
        if self.claimed.is_claimed(index) {
            tracing::warn!(%claimant, index, "rejected repeated claim");
            return Err(ClaimError::AlreadyClaimed(index));
        }

        self.claimed.set_claimed(index);
        tracing::info!(%claimant, tokens, index, "claim accepted");
        Ok(ClaimReceipt {
            claimant,
            amount,
            index,
        })
    }
}
