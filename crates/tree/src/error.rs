//! Error types for the commitment and watchlist stores.

use thiserror::Error;
use veripass_crypto::CryptoError;

/// Result type for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors that can occur in tree operations.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Zero is reserved for empty slots and cannot be inserted
    #[error("Zero leaf is forbidden")]
    ZeroLeaf,

    /// The leaf is already present
    #[error("Duplicate leaf")]
    DuplicateLeaf,

    /// The tree has reached its fixed capacity
    #[error("Tree is full: capacity {0}")]
    TreeFull(usize),

    /// The requested leaf or index does not exist
    #[error("Leaf not found")]
    LeafNotFound,

    /// Supplied sibling path does not reconstruct the current root
    #[error("Wrong siblings: path does not reconstruct the current root")]
    WrongSiblings,

    /// The watchlist key is already present
    #[error("Duplicate watchlist key")]
    DuplicateKey,

    /// Two keys share a path prefix longer than the tree depth
    #[error("Key collision beyond depth {0}")]
    KeyCollision(usize),

    /// Requested a membership proof for an absent key, or vice versa
    #[error("Wrong proof kind: {0}")]
    WrongProofKind(String),

    /// A loaded snapshot is internally inconsistent
    #[error("Snapshot mismatch: {0}")]
    SnapshotMismatch(String),

    /// Malformed leaf input
    #[error("Invalid leaf input: {0}")]
    InvalidLeaf(String),

    /// Hash computation error
    #[error("Hash error: {0}")]
    Hash(#[from] CryptoError),
}
