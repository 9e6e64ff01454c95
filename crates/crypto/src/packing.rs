//! Packed byte layouts shared with the disclosure circuit.
//!
//! The circuit reveals document attributes as three field elements packing
//! 93 bytes (31 per element, little-endian within the element), and policies
//! carry forbidden-country lists packed the same way. Both directions must
//! round-trip exactly.

use num_bigint::BigUint;
use veripass_core::constants::{MAX_BYTES_IN_FIELD, MAX_FORBIDDEN_COUNTRIES, REVEAL_BYTES_LEN};
use veripass_core::Field;

use crate::error::{CryptoError, Result};

/// Pack the 93-byte revealed-data buffer into three field elements.
pub fn pack_reveal_bytes(bytes: &[u8]) -> Result<[Field; 3]> {
    if bytes.len() != REVEAL_BYTES_LEN {
        return Err(CryptoError::InvalidInput(format!(
            "revealed-data buffer must be {REVEAL_BYTES_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    let mut out = [Field::zero(); 3];
    for (i, chunk) in bytes.chunks(MAX_BYTES_IN_FIELD).enumerate() {
        out[i] = Field::from_biguint(&BigUint::from_bytes_le(chunk));
    }
    Ok(out)
}

/// Unpack three revealed-data field elements back into the 93-byte buffer.
pub fn unpack_reveal_fields(fields: &[Field; 3]) -> [u8; REVEAL_BYTES_LEN] {
    let mut out = [0u8; REVEAL_BYTES_LEN];
    for (i, field) in fields.iter().enumerate() {
        let le = field.to_biguint().to_bytes_le();
        let start = i * MAX_BYTES_IN_FIELD;
        for (j, byte) in le.iter().take(MAX_BYTES_IN_FIELD).enumerate() {
            out[start + j] = *byte;
        }
    }
    out
}

/// Pack an ordered list of 3-letter country codes into field elements.
///
/// Each code contributes three ASCII bytes; codes shorter than three
/// characters are space-padded. Within each 3-byte group the bytes are
/// stored reversed, matching the byte order the disclosure circuit's
/// comparator reads. The byte stream is chunked 31 bytes per field element.
pub fn pack_forbidden_countries(codes: &[&str]) -> Result<Vec<Field>> {
    if codes.len() > MAX_FORBIDDEN_COUNTRIES {
        return Err(CryptoError::InvalidInput(format!(
            "forbidden-country list holds at most {MAX_FORBIDDEN_COUNTRIES} codes, got {}",
            codes.len()
        )));
    }
    let mut bytes = Vec::with_capacity(codes.len() * 3);
    for code in codes {
        if !code.is_ascii() {
            return Err(CryptoError::InvalidInput(format!(
                "country code {code:?} is not ASCII"
            )));
        }
        let mut padded = code.as_bytes().to_vec();
        padded.resize(3, b' ');
        padded.truncate(3);
        bytes.extend(padded.iter().rev());
    }
    Ok(bytes
        .chunks(MAX_BYTES_IN_FIELD)
        .map(|chunk| Field::from_biguint(&BigUint::from_bytes_le(chunk)))
        .collect())
}

/// Unpack forbidden-country field elements back into the ordered code list.
///
/// Reading stops at the first all-zero 3-byte group, so the result is the
/// exact inverse of [`pack_forbidden_countries`].
pub fn unpack_forbidden_countries(fields: &[Field]) -> Vec<String> {
    let mut bytes = Vec::with_capacity(fields.len() * MAX_BYTES_IN_FIELD);
    for field in fields {
        let le = field.to_biguint().to_bytes_le();
        let mut chunk = [0u8; MAX_BYTES_IN_FIELD];
        for (i, byte) in le.iter().take(MAX_BYTES_IN_FIELD).enumerate() {
            chunk[i] = *byte;
        }
        bytes.extend_from_slice(&chunk);
    }

    let mut codes = Vec::new();
    for group in bytes.chunks(3) {
        if group.len() < 3 || group.iter().all(|b| *b == 0) {
            break;
        }
        let code: String = group.iter().rev().map(|b| *b as char).collect();
        codes.push(code);
    }
    codes
}
