//! BN254 scalar field elements.
//!
//! Every commitment, nullifier, Merkle root and packed attribute in the
//! system is a single element of the BN254 scalar field, the field the
//! arithmetic circuits operate over. This module wraps `ark_bn254::Fr` in a
//! newtype with the conversions the rest of the workspace needs: decimal
//! strings (the persisted/wire representation), big-endian bytes, and
//! arbitrary-precision integers.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField, Zero};
use num_bigint::BigUint;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

use crate::error::CoreError;

/// A BN254 scalar field element.
///
/// Serialized as a decimal string, matching the format the commitment tree
/// snapshots and proof public signals are distributed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field(Fr);

impl Default for Field {
    fn default() -> Self {
        Field::zero()
    }
}

impl Field {
    /// The additive identity. Forbidden as a tree leaf.
    pub fn zero() -> Self {
        Field(Fr::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn from_u64(value: u64) -> Self {
        Field(Fr::from(value))
    }

    /// Parse a canonical decimal representation.
    ///
    /// Rejects values at or above the field modulus rather than silently
    /// reducing them; wire values are required to be canonical.
    pub fn from_dec_str(s: &str) -> Result<Self, CoreError> {
        let value = BigUint::from_str(s.trim())
            .map_err(|_| CoreError::FieldParse(format!("not a decimal integer: {s:?}")))?;
        let modulus: BigUint = Fr::MODULUS.into();
        if value >= modulus {
            return Err(CoreError::FieldParse(format!(
                "value {value} is not a canonical field element"
            )));
        }
        Ok(Field(Fr::from(value)))
    }

    /// Parse a `0x`-prefixed (or bare) big-endian hex representation.
    pub fn from_hex_str(s: &str) -> Result<Self, CoreError> {
        let stripped = s.trim().trim_start_matches("0x");
        let bytes = hex::decode(stripped)
            .map_err(|_| CoreError::FieldParse(format!("not a hex string: {s:?}")))?;
        let value = BigUint::from_bytes_be(&bytes);
        let modulus: BigUint = Fr::MODULUS.into();
        if value >= modulus {
            return Err(CoreError::FieldParse(format!(
                "value 0x{stripped} is not a canonical field element"
            )));
        }
        Ok(Field(Fr::from(value)))
    }

    /// Interpret 32 big-endian bytes, reducing modulo the field order.
    pub fn from_bytes_be_mod_order(bytes: &[u8]) -> Self {
        Field(Fr::from_be_bytes_mod_order(bytes))
    }

    pub fn from_biguint(value: &BigUint) -> Self {
        Field(Fr::from(value.clone()))
    }

    pub fn to_biguint(&self) -> BigUint {
        self.0.into()
    }

    /// Big-endian 32-byte encoding.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let bytes = self.0.into_bigint().to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        out
    }

    pub fn to_dec_string(&self) -> String {
        self.to_biguint().to_string()
    }

    /// `0x`-prefixed hex, zero-padded to 64 digits. Used when rendering
    /// packed field elements for external consumers.
    pub fn to_padded_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes_be()))
    }

    /// Constant-time equality on the canonical byte encoding.
    ///
    /// Glue values link two independently generated proofs; comparing them
    /// must not leak where the encodings diverge.
    pub fn ct_eq(&self, other: &Field) -> bool {
        self.to_bytes_be().ct_eq(&other.to_bytes_be()).into()
    }

    pub(crate) fn into_inner(self) -> Fr {
        self.0
    }
}

impl From<Fr> for Field {
    fn from(value: Fr) -> Self {
        Field(value)
    }
}

impl From<Field> for Fr {
    fn from(value: Field) -> Self {
        value.into_inner()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dec_string())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_dec_string())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Field::from_dec_str(&s).map_err(D::Error::custom)
    }
}
