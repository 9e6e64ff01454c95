//! Merkle commitment stores for the VeriPass registry.
//!
//! Two tree shapes back the registry's trust state:
//!
//! - [`CommitmentTree`]: an append-only incremental Merkle tree holding
//!   issuer-key and identity commitments, with timestamped root history
//!   and fixed-depth circuit-shaped proofs
//! - [`WatchlistTree`]: a sparse Merkle tree over watchlist entries
//!   (passport numbers, name+DOB, name+YOB) supporting membership and
//!   non-membership proofs
//!
//! Both hash with the circomlib-compatible Poseidon permutation from
//! `veripass-crypto`, so every proof generated here can be consumed as
//! witness data by the corresponding circuit.

pub mod error;
pub mod imt;
pub mod smt;
pub mod snapshot;

pub use error::{Result, TreeError};
pub use imt::{CommitmentTree, MerkleProof};
pub use smt::{
    dob_leaf, name_dob_leaf, name_leaf, name_yob_leaf, passport_number_leaf, WatchlistProof,
    WatchlistTree,
};
pub use snapshot::TreeSnapshot;
