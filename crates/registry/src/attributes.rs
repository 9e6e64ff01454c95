//! Revealed-attribute decoding.
//!
//! The disclosure circuit reveals selected document attributes as packed
//! field elements; unselected byte ranges come out as zeros. This module
//! unpacks them into typed, human-readable values.

use serde::{Deserialize, Serialize};
use veripass_core::constants::{attribute_ranges, REVEAL_BYTES_LEN};
use veripass_core::Field;
use veripass_crypto::unpack_reveal_fields;

use crate::error::{RegistryError, Result};

/// Human-readable attributes decoded from a disclosure proof.
///
/// Fields the holder chose not to reveal are empty strings (or `false` for
/// the watchlist results).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedAttributes {
    pub issuing_state: String,
    pub first_name: String,
    pub last_name: String,
    pub passport_number: String,
    pub nationality: String,
    /// `DD-MM-YY`, or empty when not revealed.
    pub date_of_birth: String,
    pub gender: String,
    /// `DD-MM-YY`, or empty when not revealed.
    pub expiry_date: String,
    /// Asserted age threshold, e.g. "20", or empty when not asserted.
    pub older_than: String,
    /// True when the proof asserts absence from the passport-number list.
    pub passport_no_ofac: bool,
    /// True when the proof asserts absence from the name+DOB list.
    pub name_dob_ofac: bool,
    /// True when the proof asserts absence from the name+YOB list.
    pub name_yob_ofac: bool,
}

/// Decode the three packed revealed-data field elements.
pub fn decode_revealed_attributes(packed: &[Field; 3]) -> Result<RevealedAttributes> {
    let bytes = unpack_reveal_fields(packed);
    decode_reveal_bytes(&bytes)
}

/// Decode an unpacked 93-byte reveal buffer.
pub fn decode_reveal_bytes(bytes: &[u8; REVEAL_BYTES_LEN]) -> Result<RevealedAttributes> {
    let raw_name = string_range(bytes, attribute_ranges::NAME)?;
    let (first_name, last_name) = split_mrz_name(&raw_name);

    Ok(RevealedAttributes {
        issuing_state: string_range(bytes, attribute_ranges::ISSUING_STATE)?,
        first_name,
        last_name,
        passport_number: string_range(bytes, attribute_ranges::PASSPORT_NUMBER)?,
        nationality: string_range(bytes, attribute_ranges::NATIONALITY)?,
        date_of_birth: date_range(bytes, attribute_ranges::DATE_OF_BIRTH)?,
        gender: string_range(bytes, attribute_ranges::GENDER)?,
        expiry_date: date_range(bytes, attribute_ranges::EXPIRY_DATE)?,
        older_than: older_than_range(bytes)?,
        passport_no_ofac: bytes[attribute_ranges::PASSPORT_NO_OFAC] == 1,
        name_dob_ofac: bytes[attribute_ranges::NAME_DOB_OFAC] == 1,
        name_yob_ofac: bytes[attribute_ranges::NAME_YOB_OFAC] == 1,
    })
}

/// The asserted age threshold as a number, if revealed.
pub fn older_than_value(bytes: &[u8; REVEAL_BYTES_LEN]) -> Option<u8> {
    let (start, _) = attribute_ranges::OLDER_THAN;
    let d1 = bytes[start];
    let d2 = bytes[start + 1];
    if d1.is_ascii_digit() && d2.is_ascii_digit() {
        Some((d1 - b'0') * 10 + (d2 - b'0'))
    } else {
        None
    }
}

fn slice(bytes: &[u8; REVEAL_BYTES_LEN], range: (usize, usize)) -> &[u8] {
    &bytes[range.0..=range.1]
}

fn string_range(bytes: &[u8; REVEAL_BYTES_LEN], range: (usize, usize)) -> Result<String> {
    let mut raw = slice(bytes, range);
    // Unrevealed trailing bytes come out of the circuit as zeros.
    while let [head @ .., 0] = raw {
        raw = head;
    }
    if raw.is_empty() {
        return Ok(String::new());
    }
    if !raw.is_ascii() {
        return Err(RegistryError::MalformedAttribute(format!(
            "non-ASCII bytes in attribute range {range:?}"
        )));
    }
    Ok(String::from_utf8_lossy(raw).into_owned())
}

fn date_range(bytes: &[u8; REVEAL_BYTES_LEN], range: (usize, usize)) -> Result<String> {
    let raw = slice(bytes, range);
    if raw.iter().all(|b| *b == 0) {
        return Ok(String::new());
    }
    format_date(raw)
}

fn older_than_range(bytes: &[u8; REVEAL_BYTES_LEN]) -> Result<String> {
    let raw = slice(bytes, attribute_ranges::OLDER_THAN);
    if raw.iter().all(|b| *b == 0) {
        return Ok(String::new());
    }
    if !raw.iter().all(u8::is_ascii_digit) {
        return Err(RegistryError::MalformedAttribute(
            "older-than bytes are not digits".to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(raw).into_owned())
}

/// Render a YYMMDD byte string as `DD-MM-YY`, validating digit and range
/// constraints.
pub fn format_date(yymmdd: &[u8]) -> Result<String> {
    if yymmdd.len() != 6 {
        return Err(RegistryError::MalformedAttribute(format!(
            "date must be six bytes, got {}",
            yymmdd.len()
        )));
    }
    if !yymmdd.iter().all(u8::is_ascii_digit) {
        return Err(RegistryError::MalformedAttribute(
            "date bytes are not digits".to_string(),
        ));
    }
    let month = (yymmdd[2] - b'0') * 10 + (yymmdd[3] - b'0');
    let day = (yymmdd[4] - b'0') * 10 + (yymmdd[5] - b'0');
    if month > 12 {
        return Err(RegistryError::MalformedAttribute(format!(
            "month out of range: {month}"
        )));
    }
    if day > 31 {
        return Err(RegistryError::MalformedAttribute(format!("day out of range: {day}")));
    }
    let year = &yymmdd[0..2];
    Ok(format!(
        "{}{}-{}{}-{}{}",
        yymmdd[4] as char,
        yymmdd[5] as char,
        yymmdd[2] as char,
        yymmdd[3] as char,
        year[0] as char,
        year[1] as char,
    ))
}

/// Split an MRZ name field (`LAST<<FIRST<MIDDLE<<<...`) into first and last
/// names.
pub fn split_mrz_name(raw: &str) -> (String, String) {
    let chars: Vec<char> = raw.chars().collect();
    let mut last_name = String::new();
    let mut i = 0;
    while i < chars.len() && chars[i] != '<' {
        last_name.push(chars[i]);
        i += 1;
    }
    i += 2;

    let mut first_name = String::new();
    while i < chars.len() {
        if chars[i] == '<' {
            if i + 1 < chars.len() && chars[i + 1] == '<' {
                break;
            }
            first_name.push(' ');
        } else {
            first_name.push(chars[i]);
        }
        i += 1;
    }
    (first_name, last_name)
}
