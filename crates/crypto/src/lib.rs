//! Cryptographic encoding and verification primitives for VeriPass.
//!
//! This crate provides the circuit-facing cryptography the registry is
//! built on:
//!
//! - **Poseidon hashing**: circomlib-compatible Poseidon over BN254, the
//!   hash every commitment tree and watchlist leaf uses
//! - **Word codec**: big integers as fixed-width limb vectors, and byte
//!   buffers length-padded to hash-gadget block boundaries
//! - **Packed layouts**: the revealed-attribute and forbidden-country byte
//!   packings shared with the disclosure circuit
//! - **Proof capability**: the consumed `verify(proof, signals) -> bool`
//!   interface, a Groth16/arkworks adapter, and a test mock
//!
//! Proof *generation* is out of scope; it belongs to the external prover
//! service.

pub mod codec;
pub mod error;
pub mod packing;
pub mod poseidon;
pub mod proof;

pub use codec::{
    from_words, locate_subsequence, pad_message, pad_message_wide, to_words, PaddedMessage,
    WordVector, EC_LIMB_BITS, RSA_LIMB_BITS,
};
pub use error::{CryptoError, Result};
pub use packing::{
    pack_forbidden_countries, pack_reveal_bytes, unpack_forbidden_countries, unpack_reveal_fields,
};
pub use poseidon::{pack_bytes, pack_bytes_and_poseidon, poseidon, poseidon2, poseidon3, poseidon5};
pub use proof::{
    Groth16Proof, Groth16Verifier, HashKind, MockProofVerifier, ProofVerifier, SchemeId,
    SignatureKind, VerifierId, VerifierRegistry,
};
