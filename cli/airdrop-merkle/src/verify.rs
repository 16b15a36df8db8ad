//! Proof verification and claim-index derivation.
//!
//! The walk below is the one algorithm every consumer shares: the CLI, the
//! claim ledger and the contract all climb the tree the same way. At each step
//! the index is shifted left and gains a 1 bit whenever the running hash was
//! the larger of the pair, so the index is reconstructed purely from the
//! left/right pattern of the path, most significant step first.
//!
//! Whether a proof matches depends only on the recomputed root, with no limit
//! on proof length. The index is held in a `u64`, so for a proof longer than
//! 64 siblings only the low 64 bits of the contract's `uint256` index remain.

use crate::common::{keccak256_hash, Hash};

/// Outcome of walking a proof against a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub matches: bool,
    /// Index produced by the walk. Only meaningful when `matches` is true.
    pub derived_index: u64,
}

impl Verification {
    /// The claim index, available only for a matching proof.
    pub fn index(&self) -> Option<u64> {
        self.matches.then_some(self.derived_index)
    }
}

fn walk(leaf: &Hash, proof: &[Hash]) -> (Hash, u64) {
    let mut computed = *leaf;
    let mut index = 0u64;

    for sibling in proof {
        index = index.wrapping_mul(2);
        if computed <= *sibling {
            computed = keccak256_hash(&computed, sibling);
        } else {
            computed = keccak256_hash(sibling, &computed);
            index += 1;
        }
    }

    (computed, index)
}

/// Recomputes the root from `leaf` and `proof` and compares it to `root`.
///
/// A mismatch is a normal outcome, not an error: this is safe to call with
/// untrusted input such as an ineligible wallet checking its own status.
pub fn verify(leaf: &Hash, proof: &[Hash], root: &Hash) -> Verification {
    let (computed, derived_index) = walk(leaf, proof);
    Verification {
        matches: computed == *root,
        derived_index,
    }
}

/// Derives the claim index a proof would produce, without checking any root.
///
/// Intended for diagnostics; gate anything security-relevant on [`verify`].
pub fn derive_index(leaf: &Hash, proof: &[Hash]) -> u64 {
    walk(leaf, proof).1
}
