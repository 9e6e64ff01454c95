//! Circuit-shaped encodings of big integers and byte buffers.
//!
//! Arithmetic circuits consume RSA moduli, signatures and digests as vectors
//! of fixed-width limbs, and hash gadgets consume byte buffers pre-padded to
//! their block size with the length already appended. This module performs
//! those encodings outside the circuit, deterministically, with exact
//! inverses.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, Result};
use veripass_core::Field;

/// Limb width used for RSA moduli and signatures.
pub const RSA_LIMB_BITS: u32 = 120;

/// Limb width used for ECDSA coordinates and scalars.
pub const EC_LIMB_BITS: u32 = 64;

/// A big integer encoded as little-endian fixed-width limbs.
///
/// Invariant: every limb is `< 2^limb_bits` and [`from_words`] reproduces
/// the source integer exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordVector {
    pub limb_bits: u32,
    pub limbs: Vec<BigUint>,
}

impl WordVector {
    /// Render each limb as a field element, the form the circuit witness
    /// expects. Only valid for limb widths below the field size.
    pub fn as_fields(&self) -> Vec<Field> {
        self.limbs.iter().map(Field::from_biguint).collect()
    }

    /// Render each limb as a decimal string.
    pub fn as_dec_strings(&self) -> Vec<String> {
        self.limbs.iter().map(|limb| limb.to_string()).collect()
    }
}

/// Split `value` into `limb_count` little-endian limbs of `limb_bits` bits.
///
/// Fails with [`CryptoError::EncodingOverflow`] if the value does not fit in
/// `limb_bits * limb_count` bits.
pub fn to_words(value: &BigUint, limb_bits: u32, limb_count: usize) -> Result<WordVector> {
    let capacity = limb_bits as u64 * limb_count as u64;
    if value.bits() > capacity {
        return Err(CryptoError::EncodingOverflow {
            needed: value.bits(),
            capacity,
        });
    }
    let mask = (BigUint::from(1u8) << limb_bits) - 1u8;
    let mut rest = value.clone();
    let mut limbs = Vec::with_capacity(limb_count);
    for _ in 0..limb_count {
        limbs.push(&rest & &mask);
        rest >>= limb_bits;
    }
    Ok(WordVector { limb_bits, limbs })
}

/// Reassemble the integer a [`WordVector`] encodes. Exact inverse of
/// [`to_words`].
pub fn from_words(vector: &WordVector) -> BigUint {
    let mut value = BigUint::from(0u8);
    for limb in vector.limbs.iter().rev() {
        value = (value << vector.limb_bits) | limb.clone();
    }
    value
}

/// A message padded to a hash gadget's block boundary and then zero-filled
/// to the gadget's fixed maximum length.
///
/// `padded_len` is the block-aligned length (original bytes + 0x80 marker +
/// zeros + length trailer); bytes beyond it are filler the circuit masks
/// out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddedMessage {
    pub bytes: Vec<u8>,
    pub padded_len: usize,
}

impl PaddedMessage {
    /// Recover the original message given its length.
    pub fn unpad(&self, original_len: usize) -> &[u8] {
        &self.bytes[..original_len]
    }
}

/// Merkle–Damgård padding for the SHA-1/SHA-224/SHA-256 family: 0x80, zeros
/// to 56 mod 64, then the bit length as 8 big-endian bytes, zero-filled to
/// exactly `max_len` bytes.
pub fn pad_message(message: &[u8], max_len: usize) -> Result<PaddedMessage> {
    pad_with_params(message, max_len, 64, 8)
}

/// Padding for the SHA-384/SHA-512 family: 128-byte blocks with a 16-byte
/// length trailer.
pub fn pad_message_wide(message: &[u8], max_len: usize) -> Result<PaddedMessage> {
    pad_with_params(message, max_len, 128, 16)
}

fn pad_with_params(
    message: &[u8],
    max_len: usize,
    block_bytes: usize,
    length_bytes: usize,
) -> Result<PaddedMessage> {
    let mut padded = message.to_vec();
    padded.push(0x80);
    while (padded.len() + length_bytes) % block_bytes != 0 {
        padded.push(0x00);
    }
    let bit_len = (message.len() as u128) * 8;
    let len_be = bit_len.to_be_bytes();
    padded.extend_from_slice(&len_be[len_be.len() - length_bytes..]);
    debug_assert_eq!(padded.len() % block_bytes, 0);

    let padded_len = padded.len();
    if padded_len > max_len {
        return Err(CryptoError::MessageTooLong {
            padded: padded_len,
            max: max_len,
        });
    }
    padded.resize(max_len, 0x00);
    Ok(PaddedMessage {
        bytes: padded,
        padded_len,
    })
}

/// Find the byte offset of `needle` inside `haystack`.
///
/// Used to locate an embedded public key inside a certificate's
/// to-be-signed bytes; absence means the circuit's verbatim-inclusion
/// constraint cannot be satisfied, so this is fatal to input generation.
pub fn locate_subsequence(haystack: &[u8], needle: &[u8]) -> Result<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Err(CryptoError::SubsequenceNotFound);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
        .ok_or(CryptoError::SubsequenceNotFound)
}
