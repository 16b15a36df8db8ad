use std::collections::HashSet;

use airdrop_merkle::{verify, Address, Airdrop, Allocation, Hash, MerkleTree};
use proptest::collection::{hash_set, vec};
use proptest::prelude::*;

fn distinct_leaves() -> impl Strategy<Value = Vec<Hash>> {
    hash_set(any::<[u8; 32]>(), 1..80).prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn build_is_deterministic(leaves in vec(any::<[u8; 32]>(), 1..80)) {
        let first = MerkleTree::build(leaves.clone()).unwrap();
        let second = MerkleTree::build(leaves).unwrap();
        prop_assert_eq!(first.root(), second.root());
    }

    #[test]
    fn every_leaf_verifies_with_a_unique_index(leaves in distinct_leaves()) {
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        let mut seen = HashSet::new();
        for (position, leaf) in leaves.iter().enumerate() {
            let proof = tree.proof(position).unwrap();
            prop_assert_eq!(proof.len(), tree.depth());
            let index = verify(leaf, &proof, &tree.root()).index();
            prop_assert!(index.is_some());
            let index = index.unwrap();
            prop_assert!(index < 1u64 << tree.depth());
            prop_assert!(seen.insert(index));
        }
    }

    #[test]
    fn tampered_sibling_is_rejected(
        leaves in distinct_leaves(),
        pick in any::<prop::sample::Index>(),
        byte in 0usize..32,
        flip in 1u8..=255,
    ) {
        prop_assume!(leaves.len() > 1);
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        let position = pick.index(leaves.len());
        let mut proof = tree.proof(position).unwrap();
        let level = pick.index(proof.len());
        proof[level][byte] ^= flip;
        prop_assert!(!verify(&leaves[position], &proof, &tree.root()).matches);
    }

    #[test]
    fn root_commits_to_every_amount(
        seeds in hash_set(any::<[u8; 20]>(), 1..20),
        bump in any::<prop::sample::Index>(),
    ) {
        let addresses: Vec<Address> = seeds
            .into_iter()
            .filter(|bytes| *bytes != [0u8; 20])
            .map(Address)
            .collect();
        prop_assume!(!addresses.is_empty());
        let airdrop: Airdrop = addresses
            .iter()
            .enumerate()
            .map(|(i, address)| (*address, Allocation { nft: 400, voter: i as u64, early_contrib: 0 }))
            .collect();
        let root = airdrop.merkle_tree().unwrap().root();

        let target = addresses[bump.index(addresses.len())];
        let mut changed = airdrop.clone();
        let allocation = *changed.get(&target).unwrap();
        changed.insert(target, Allocation { nft: allocation.nft + 1, ..allocation });
        prop_assert_ne!(changed.merkle_tree().unwrap().root(), root);
    }
}
