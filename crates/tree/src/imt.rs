//! Append-only commitment Merkle tree.
//!
//! Stores public-key and identity commitments. Parents hash with
//! Poseidon-2; a node without a right sibling is promoted unchanged to the
//! next level, so the tree never pads with synthetic zero leaves. Because
//! zero is a forbidden leaf value, a zero sibling in a proof unambiguously
//! means "promoted at this level".
//!
//! Every successful mutation records the new root in the root history with
//! its timestamp; proofs built against a slightly stale root stay
//! verifiable through [`CommitmentTree::check_root`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;
use veripass_core::constants::COMMITMENT_TREE_DEPTH;
use veripass_core::Field;
use veripass_crypto::poseidon2;

use crate::error::{Result, TreeError};

/// A fixed-depth inclusion proof.
///
/// `siblings` and `path_bits` are zero-padded to the tree depth; a zero
/// sibling is skipped during recomputation (promoted node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf: Field,
    pub index: usize,
    pub siblings: Vec<Field>,
    pub path_bits: Vec<bool>,
}

impl MerkleProof {
    /// Recompute the root this proof commits to.
    pub fn compute_root(&self) -> Result<Field> {
        let mut node = self.leaf;
        for (sibling, bit) in self.siblings.iter().zip(&self.path_bits) {
            if sibling.is_zero() {
                continue;
            }
            node = if *bit {
                poseidon2(*sibling, node)?
            } else {
                poseidon2(node, *sibling)?
            };
        }
        Ok(node)
    }

    /// Check the proof against an expected root.
    pub fn verify(&self, root: Field) -> bool {
        self.compute_root().map(|computed| computed == root).unwrap_or(false)
    }
}

/// Append-only Merkle tree over non-zero field-element leaves.
#[derive(Debug, Clone)]
pub struct CommitmentTree {
    depth: usize,
    leaves: Vec<Field>,
    index: HashMap<Field, usize>,
    current_root: Field,
    root_history: Vec<Field>,
    root_set: HashSet<Field>,
    root_timestamps: HashMap<Field, u64>,
}

impl CommitmentTree {
    /// Create an empty tree of the default depth.
    pub fn new() -> Self {
        Self::with_depth(COMMITMENT_TREE_DEPTH)
    }

    /// Create an empty tree with capacity `2^depth` leaves.
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth,
            leaves: Vec::new(),
            index: HashMap::new(),
            current_root: Field::zero(),
            root_history: Vec::new(),
            root_set: HashSet::new(),
            root_timestamps: HashMap::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of leaf slots, including administratively zeroed ones.
    pub fn size(&self) -> usize {
        self.leaves.len()
    }

    pub fn root(&self) -> Field {
        self.current_root
    }

    pub fn index_of(&self, leaf: &Field) -> Option<usize> {
        self.index.get(leaf).copied()
    }

    pub fn contains(&self, leaf: &Field) -> bool {
        self.index.contains_key(leaf)
    }

    /// Whether `candidate` is the current root or any root the tree ever
    /// produced.
    pub fn check_root(&self, candidate: &Field) -> bool {
        self.root_set.contains(candidate)
    }

    /// The timestamp recorded when `root` was first produced.
    pub fn root_timestamp(&self, root: &Field) -> Option<u64> {
        self.root_timestamps.get(root).copied()
    }

    /// Append a leaf, recompute the root and record `(root, timestamp)`.
    /// Returns the leaf index.
    pub fn insert(&mut self, leaf: Field, timestamp: u64) -> Result<usize> {
        if leaf.is_zero() {
            return Err(TreeError::ZeroLeaf);
        }
        if self.index.contains_key(&leaf) {
            return Err(TreeError::DuplicateLeaf);
        }
        let capacity = 1usize << self.depth;
        if self.leaves.len() >= capacity {
            return Err(TreeError::TreeFull(capacity));
        }

        let index = self.leaves.len();
        self.leaves.push(leaf);
        self.index.insert(leaf, index);
        self.recompute_root(timestamp)?;
        info!(index, root = %self.current_root, "leaf inserted");
        Ok(index)
    }

    /// Inclusion proof for the leaf at `index`, padded to the tree depth.
    pub fn proof(&self, index: usize) -> Result<MerkleProof> {
        if index >= self.leaves.len() {
            return Err(TreeError::LeafNotFound);
        }
        let mut siblings = Vec::with_capacity(self.depth);
        let mut level = self.leaves.clone();
        let mut idx = index;
        while level.len() > 1 {
            let sibling_idx = idx ^ 1;
            if sibling_idx < level.len() {
                siblings.push(level[sibling_idx]);
            } else {
                siblings.push(Field::zero());
            }
            level = Self::next_level(&level)?;
            idx >>= 1;
        }
        siblings.resize(self.depth, Field::zero());
        let path_bits = (0..self.depth).map(|i| (index >> i) & 1 == 1).collect();
        Ok(MerkleProof {
            leaf: self.leaves[index],
            index,
            siblings,
            path_bits,
        })
    }

    /// Administrative: replace `old_leaf` with `new_leaf`, given a sibling
    /// path that reconstructs the current root from `old_leaf`.
    pub fn update(
        &mut self,
        old_leaf: Field,
        new_leaf: Field,
        siblings: &[Field],
        timestamp: u64,
    ) -> Result<()> {
        if new_leaf.is_zero() {
            return Err(TreeError::ZeroLeaf);
        }
        if self.index.contains_key(&new_leaf) {
            return Err(TreeError::DuplicateLeaf);
        }
        let index = self.replace_checked(old_leaf, new_leaf, siblings)?;
        self.index.insert(new_leaf, index);
        self.recompute_root(timestamp)?;
        info!(index, root = %self.current_root, "leaf updated");
        Ok(())
    }

    /// Administrative: zero out `old_leaf`'s slot, given a sibling path
    /// that reconstructs the current root. The slot becomes a tombstone;
    /// the value may be inserted again later.
    pub fn remove(&mut self, old_leaf: Field, siblings: &[Field], timestamp: u64) -> Result<()> {
        let index = self.replace_checked(old_leaf, Field::zero(), siblings)?;
        self.recompute_root(timestamp)?;
        info!(index, root = %self.current_root, "leaf removed");
        Ok(())
    }

    fn replace_checked(
        &mut self,
        old_leaf: Field,
        new_leaf: Field,
        siblings: &[Field],
    ) -> Result<usize> {
        let index = *self.index.get(&old_leaf).ok_or(TreeError::LeafNotFound)?;
        let supplied = MerkleProof {
            leaf: old_leaf,
            index,
            siblings: siblings.to_vec(),
            path_bits: (0..siblings.len()).map(|i| (index >> i) & 1 == 1).collect(),
        };
        if !supplied.verify(self.current_root) {
            return Err(TreeError::WrongSiblings);
        }
        self.leaves[index] = new_leaf;
        self.index.remove(&old_leaf);
        Ok(index)
    }

    fn recompute_root(&mut self, timestamp: u64) -> Result<()> {
        let mut level = self.leaves.clone();
        if level.is_empty() {
            self.current_root = Field::zero();
        } else {
            while level.len() > 1 {
                level = Self::next_level(&level)?;
            }
            self.current_root = level[0];
        }
        self.root_history.push(self.current_root);
        self.root_set.insert(self.current_root);
        self.root_timestamps
            .entry(self.current_root)
            .or_insert(timestamp);
        Ok(())
    }

    fn next_level(level: &[Field]) -> Result<Vec<Field>> {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            if pair.len() == 2 {
                next.push(poseidon2(pair[0], pair[1])?);
            } else {
                // Lone frontier node is promoted unchanged.
                next.push(pair[0]);
            }
        }
        Ok(next)
    }

    pub(crate) fn levels(&self) -> Result<Vec<Vec<Field>>> {
        let mut levels = vec![self.leaves.clone()];
        let mut level = self.leaves.clone();
        while level.len() > 1 {
            level = Self::next_level(&level)?;
            levels.push(level.clone());
        }
        Ok(levels)
    }

    pub(crate) fn restore(leaves: Vec<Field>, depth: usize, timestamp: u64) -> Result<Self> {
        let mut tree = Self::with_depth(depth);
        for leaf in leaves {
            if leaf.is_zero() {
                return Err(TreeError::ZeroLeaf);
            }
            if tree.index.contains_key(&leaf) {
                return Err(TreeError::DuplicateLeaf);
            }
            let index = tree.leaves.len();
            tree.leaves.push(leaf);
            tree.index.insert(leaf, index);
        }
        tree.recompute_root(timestamp)?;
        Ok(tree)
    }
}

impl Default for CommitmentTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: u64) -> Field {
        Field::from_u64(n)
    }

    #[test]
    fn test_new_tree_is_empty() {
        let tree = CommitmentTree::new();
        assert_eq!(tree.size(), 0);
        assert!(tree.root().is_zero());
        assert_eq!(tree.depth(), COMMITMENT_TREE_DEPTH);
    }

    #[test]
    fn test_insert_returns_sequential_indices() {
        let mut tree = CommitmentTree::new();
        for i in 0..5u64 {
            let index = tree.insert(leaf(i + 1), 1000 + i).unwrap();
            assert_eq!(index, i as usize);
        }
        assert_eq!(tree.size(), 5);
    }

    #[test]
    fn test_single_leaf_root_is_leaf() {
        // A lone leaf is promoted to the root unchanged.
        let mut tree = CommitmentTree::new();
        tree.insert(leaf(42), 1).unwrap();
        assert_eq!(tree.root(), leaf(42));
    }

    #[test]
    fn test_insert_rejects_zero_and_duplicate() {
        let mut tree = CommitmentTree::new();
        assert!(matches!(tree.insert(Field::zero(), 1), Err(TreeError::ZeroLeaf)));
        tree.insert(leaf(7), 1).unwrap();
        assert!(matches!(tree.insert(leaf(7), 2), Err(TreeError::DuplicateLeaf)));
    }

    #[test]
    fn test_root_changes_on_every_insert() {
        let mut tree = CommitmentTree::new();
        let mut roots = HashSet::new();
        for i in 1..=8u64 {
            tree.insert(leaf(i), i).unwrap();
            assert!(roots.insert(tree.root()), "root must not revert to a prior value");
        }
    }

    #[test]
    fn test_historical_roots_stay_checkable() {
        let mut tree = CommitmentTree::new();
        tree.insert(leaf(1), 100).unwrap();
        let old_root = tree.root();
        tree.insert(leaf(2), 200).unwrap();

        assert_ne!(tree.root(), old_root);
        assert!(tree.check_root(&old_root));
        assert!(tree.check_root(&tree.root()));
        assert!(!tree.check_root(&leaf(999)));
        assert_eq!(tree.root_timestamp(&old_root), Some(100));
        assert_eq!(tree.root_timestamp(&tree.root()), Some(200));
    }

    #[test]
    fn test_proof_verifies_for_all_indices() {
        let mut tree = CommitmentTree::new();
        for i in 1..=7u64 {
            tree.insert(leaf(i), i).unwrap();
        }
        for index in 0..7 {
            let proof = tree.proof(index).unwrap();
            assert_eq!(proof.siblings.len(), COMMITMENT_TREE_DEPTH);
            assert_eq!(proof.path_bits.len(), COMMITMENT_TREE_DEPTH);
            assert!(proof.verify(tree.root()), "proof for index {index} must verify");
        }
    }

    #[test]
    fn test_proof_fails_against_wrong_root() {
        let mut tree = CommitmentTree::new();
        tree.insert(leaf(1), 1).unwrap();
        tree.insert(leaf(2), 2).unwrap();
        let proof = tree.proof(0).unwrap();
        assert!(!proof.verify(leaf(12345)));
    }

    #[test]
    fn test_proof_out_of_range() {
        let tree = CommitmentTree::new();
        assert!(matches!(tree.proof(0), Err(TreeError::LeafNotFound)));
    }

    #[test]
    fn test_index_of() {
        let mut tree = CommitmentTree::new();
        tree.insert(leaf(10), 1).unwrap();
        tree.insert(leaf(20), 2).unwrap();
        assert_eq!(tree.index_of(&leaf(20)), Some(1));
        assert_eq!(tree.index_of(&leaf(30)), None);
    }

    #[test]
    fn test_update_with_valid_siblings() {
        let mut tree = CommitmentTree::new();
        for i in 1..=4u64 {
            tree.insert(leaf(i), i).unwrap();
        }
        let proof = tree.proof(2).unwrap();
        tree.update(leaf(3), leaf(30), &proof.siblings, 99).unwrap();
        assert_eq!(tree.index_of(&leaf(30)), Some(2));
        assert_eq!(tree.index_of(&leaf(3)), None);

        let new_proof = tree.proof(2).unwrap();
        assert_eq!(new_proof.leaf, leaf(30));
        assert!(new_proof.verify(tree.root()));
    }

    #[test]
    fn test_update_with_wrong_siblings() {
        let mut tree = CommitmentTree::new();
        for i in 1..=4u64 {
            tree.insert(leaf(i), i).unwrap();
        }
        let mut siblings = tree.proof(2).unwrap().siblings;
        siblings[0] = leaf(777);
        let err = tree.update(leaf(3), leaf(30), &siblings, 99).unwrap_err();
        assert!(matches!(err, TreeError::WrongSiblings));
        // State unchanged.
        assert_eq!(tree.index_of(&leaf(3)), Some(2));
    }

    #[test]
    fn test_remove_zeroes_slot_and_frees_value() {
        let mut tree = CommitmentTree::new();
        for i in 1..=4u64 {
            tree.insert(leaf(i), i).unwrap();
        }
        let proof = tree.proof(1).unwrap();
        tree.remove(leaf(2), &proof.siblings, 50).unwrap();
        assert_eq!(tree.index_of(&leaf(2)), None);
        assert_eq!(tree.size(), 4);

        // The removed value may be registered again, at a new index.
        let index = tree.insert(leaf(2), 60).unwrap();
        assert_eq!(index, 4);
    }

    #[test]
    fn test_tree_full() {
        let mut tree = CommitmentTree::with_depth(2);
        for i in 1..=4u64 {
            tree.insert(leaf(i), i).unwrap();
        }
        assert!(matches!(tree.insert(leaf(5), 5), Err(TreeError::TreeFull(4))));
    }
}
