//! Poseidon hash functions for commitments and Merkle nodes.
//!
//! This module provides circomlib-compatible Poseidon hashing over BN254,
//! matching the permutation the arithmetic circuits use. Tree nodes hash
//! with arity 2, sparse-tree leaves with arity 3, identity commitments with
//! arity 5, and the watchlist leaf builders use arities up to 9.

use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonHasher};
use num_bigint::BigUint;
use veripass_core::constants::MAX_BYTES_IN_FIELD;
use veripass_core::Field;

use crate::error::{CryptoError, Result};

/// Maximum input arity supported by the circom parameter set.
pub const MAX_ARITY: usize = 12;

/// Hash `inputs.len()` field elements with the circom Poseidon parameters
/// for that arity.
pub fn poseidon(inputs: &[Field]) -> Result<Field> {
    if inputs.is_empty() || inputs.len() > MAX_ARITY {
        return Err(CryptoError::Hash(format!(
            "Poseidon arity must be 1..={MAX_ARITY}, got {}",
            inputs.len()
        )));
    }
    let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())
        .map_err(|err| CryptoError::Hash(err.to_string()))?;
    let field_inputs: Vec<Fr> = inputs.iter().map(|input| (*input).into()).collect();
    let hash = hasher
        .hash(&field_inputs)
        .map_err(|err| CryptoError::Hash(err.to_string()))?;
    Ok(hash.into())
}

/// Hash two field elements together (Merkle node hash).
pub fn poseidon2(a: Field, b: Field) -> Result<Field> {
    poseidon(&[a, b])
}

/// Hash three field elements together (sparse-tree leaf hash).
pub fn poseidon3(a: Field, b: Field, c: Field) -> Result<Field> {
    poseidon(&[a, b, c])
}

/// Hash five field elements together (identity commitment hash).
pub fn poseidon5(inputs: &[Field; 5]) -> Result<Field> {
    poseidon(inputs)
}

/// Pack bytes into 31-byte field-element chunks and hash the chunks.
///
/// Chunks are little-endian within the chunk, mirroring the packing the
/// circuits apply before hashing byte buffers (MRZ data, digest outputs).
pub fn pack_bytes_and_poseidon(bytes: &[u8]) -> Result<Field> {
    let chunks = pack_bytes(bytes);
    if chunks.is_empty() {
        return Err(CryptoError::Hash("cannot hash an empty buffer".to_string()));
    }
    poseidon(&chunks)
}

/// Split a byte buffer into 31-byte little-endian field-element chunks.
pub fn pack_bytes(bytes: &[u8]) -> Vec<Field> {
    bytes
        .chunks(MAX_BYTES_IN_FIELD)
        .map(|chunk| Field::from_biguint(&BigUint::from_bytes_le(chunk)))
        .collect()
}
