use crate::common::{hash_sorted_pair, Hash};
use crate::error::TreeError;

/// A binary Merkle tree over keccak256 leaves with sorted-pair parents.
///
/// `layers[0]` holds the leaves in insertion order and the last layer holds the
/// root. Nodes are paired positionally (0 with 1, 2 with 3, ...). A layer with
/// an odd number of nodes pairs its last node with itself, so every leaf's
/// proof has exactly `depth()` siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    layers: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Builds the tree bottom-up.
    ///
    /// # Errors
    /// Returns [`TreeError::EmptyTree`] for an empty leaf set.
    pub fn build(leaves: Vec<Hash>) -> Result<Self, TreeError> {
        if leaves.is_empty() {
            return Err(TreeError::EmptyTree);
        }

        let mut layers = vec![leaves];
        while let Some(level) = layers.last().filter(|level| level.len() > 1) {
            let next_level: Vec<Hash> = level
                .chunks(2)
                .map(|chunk| {
                    let left = &chunk[0];
                    let right = chunk.get(1).unwrap_or(left);
                    hash_sorted_pair(left, right)
                })
                .collect();
            layers.push(next_level);
        }

        tracing::debug!(
            leaves = layers[0].len(),
            depth = layers.len() - 1,
            "built merkle tree"
        );
        Ok(MerkleTree { layers })
    }

    pub fn root(&self) -> Hash {
        // build() guarantees a non-empty final layer
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaves(&self) -> &[Hash] {
        &self.layers[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of hashing layers above the leaves, `ceil(log2(leaf_count))`.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn layers(&self) -> &[Vec<Hash>] {
        &self.layers
    }

    /// Position of the first leaf equal to `leaf`.
    pub fn position_of(&self, leaf: &Hash) -> Option<usize> {
        self.layers[0].iter().position(|candidate| candidate == leaf)
    }

    /// Sibling path for the leaf at `position`, ordered leaf to root.
    ///
    /// # Errors
    /// Returns [`TreeError::PositionOutOfBounds`] if no leaf sits at `position`.
    pub fn proof(&self, position: usize) -> Result<Vec<Hash>, TreeError> {
        let leaf_count = self.leaf_count();
        if position >= leaf_count {
            return Err(TreeError::PositionOutOfBounds {
                position,
                leaf_count,
            });
        }

        let mut proof = Vec::with_capacity(self.depth());
        let mut current = position;
        for level in &self.layers[..self.layers.len() - 1] {
            let sibling = current ^ 1;
            // the unpaired last node is its own sibling
            proof.push(*level.get(sibling).unwrap_or(&level[current]));
            current /= 2;
        }
        Ok(proof)
    }

    /// Sibling path for `leaf`, or `None` when the leaf is not in the tree.
    pub fn proof_for_leaf(&self, leaf: &Hash) -> Option<Vec<Hash>> {
        self.position_of(leaf)
            .and_then(|position| self.proof(position).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::keccak256;

    fn leaves(n: u8) -> Vec<Hash> {
        (0..n).map(|i| keccak256(&[&[i]])).collect()
    }

    #[test]
    fn test_build_empty_tree_fails() {
        assert_eq!(MerkleTree::build(vec![]), Err(TreeError::EmptyTree));
    }

    #[test]
    fn test_single_leaf_is_root() {
        let leaf = [7u8; 32];
        let tree = MerkleTree::build(vec![leaf]).unwrap();
        assert_eq!(tree.root(), leaf);
        assert_eq!(tree.depth(), 0);
        assert!(tree.proof(0).unwrap().is_empty());
    }

    #[test]
    fn test_two_leaves() {
        let l = leaves(2);
        let tree = MerkleTree::build(l.clone()).unwrap();
        assert_eq!(tree.root(), hash_sorted_pair(&l[0], &l[1]));
        assert_eq!(tree.proof(0).unwrap(), vec![l[1]]);
        assert_eq!(tree.proof(1).unwrap(), vec![l[0]]);
    }

    #[test]
    fn test_odd_layer_duplicates_last_node() {
        let l = leaves(3);
        let tree = MerkleTree::build(l.clone()).unwrap();
        let left = hash_sorted_pair(&l[0], &l[1]);
        let right = hash_sorted_pair(&l[2], &l[2]);
        assert_eq!(tree.root(), hash_sorted_pair(&left, &right));
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.proof(2).unwrap(), vec![l[2], left]);
    }

    #[test]
    fn test_layer_sizes() {
        let tree = MerkleTree::build(leaves(5)).unwrap();
        let sizes: Vec<usize> = tree.layers().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 3, 2, 1]);
        for position in 0..5 {
            assert_eq!(tree.proof(position).unwrap().len(), 3);
        }
    }

    #[test]
    fn test_proof_out_of_bounds() {
        let tree = MerkleTree::build(leaves(2)).unwrap();
        assert_eq!(
            tree.proof(5),
            Err(TreeError::PositionOutOfBounds {
                position: 5,
                leaf_count: 2
            })
        );
    }

    #[test]
    fn test_proof_for_leaf() {
        let l = leaves(4);
        let tree = MerkleTree::build(l.clone()).unwrap();
        assert_eq!(tree.proof_for_leaf(&l[3]), Some(tree.proof(3).unwrap()));
        assert_eq!(tree.proof_for_leaf(&[0xffu8; 32]), None);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = MerkleTree::build(leaves(9)).unwrap();
        let b = MerkleTree::build(leaves(9)).unwrap();
        assert_eq!(a.root(), b.root());
    }
}
