//! Commitment-tree snapshots.
//!
//! The root-authority (CSCA) commitment tree is built by the registry
//! curation pipeline and distributed to consumers as a serialized array of
//! per-level node lists, each node a field-element decimal string.
//! Consumers load the snapshot verbatim, recompute the root to validate it,
//! and can generate proofs without re-deriving the tree from source
//! certificates.

use serde::{Deserialize, Serialize};
use veripass_core::Field;

use crate::error::{Result, TreeError};
use crate::imt::CommitmentTree;

/// A serialized commitment tree: `levels[0]` is the leaf list, the last
/// level is the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub depth: usize,
    pub levels: Vec<Vec<Field>>,
}

impl TreeSnapshot {
    pub fn root(&self) -> Option<Field> {
        self.levels.last().and_then(|level| level.first()).copied()
    }
}

impl CommitmentTree {
    /// Serialize the tree as per-level node lists.
    pub fn to_snapshot(&self) -> Result<TreeSnapshot> {
        Ok(TreeSnapshot {
            depth: self.depth(),
            levels: self.levels()?,
        })
    }

    /// Rebuild a tree from a snapshot, recomputing every level and
    /// rejecting snapshots whose stored nodes do not match.
    ///
    /// `timestamp` is recorded for the restored root.
    pub fn from_snapshot(snapshot: &TreeSnapshot, timestamp: u64) -> Result<Self> {
        let leaves = snapshot
            .levels
            .first()
            .ok_or_else(|| TreeError::SnapshotMismatch("snapshot has no levels".to_string()))?
            .clone();
        let tree = CommitmentTree::restore(leaves, snapshot.depth, timestamp)?;

        let recomputed = tree.levels()?;
        if recomputed != snapshot.levels {
            return Err(TreeError::SnapshotMismatch(
                "recomputed levels do not match the stored levels".to_string(),
            ));
        }
        Ok(tree)
    }
}
