//! Wire-format constants.
//!
//! Public-signal positions and attribute byte ranges are part of the wire
//! contract with the circuits and must only change together with a circuit
//! release. Everything here is versioned by the crate version.

/// Depth of the identity and issuer-key commitment trees.
pub const COMMITMENT_TREE_DEPTH: usize = 16;

/// Sibling padding depth for watchlist (sparse tree) proofs.
pub const WATCHLIST_TREE_DEPTH: usize = 64;

/// Poseidon("E-PASSPORT"), the attestation id of the e-passport circuit
/// family.
pub const E_PASSPORT_ATTESTATION_ID: &str =
    "8518753152044246090169372947057357973469996808638122125210848696986717482788";

/// Bytes packable into one field element without overflowing BN254.
pub const MAX_BYTES_IN_FIELD: usize = 31;

/// Length of the unpacked revealed-data buffer (three 31-byte chunks).
pub const REVEAL_BYTES_LEN: usize = 93;

/// Maximum number of 3-letter codes in a forbidden-country list.
pub const MAX_FORBIDDEN_COUNTRIES: usize = 40;

/// Public-signal layout of the disclosure circuit.
///
/// The watchlist roots are split three ways (passport number, name+DOB,
/// name+YOB); the combined-root layout from earlier circuit revisions is not
/// supported.
pub mod disclose_signals {
    pub const REVEALED_DATA_PACKED: usize = 0; // .. 2
    pub const FORBIDDEN_COUNTRIES_PACKED: usize = 3;
    pub const NULLIFIER: usize = 4;
    pub const ATTESTATION_ID: usize = 5;
    pub const IDENTITY_ROOT: usize = 6;
    pub const CURRENT_DATE: usize = 7; // .. 12, six YYMMDD digits
    pub const PASSPORT_NO_WATCHLIST_ROOT: usize = 13;
    pub const NAME_DOB_WATCHLIST_ROOT: usize = 14;
    pub const NAME_YOB_WATCHLIST_ROOT: usize = 15;
    pub const SCOPE: usize = 16;
    pub const USER_IDENTIFIER: usize = 17;
    pub const COUNT: usize = 18;
}

/// Public-signal layout of the identity-registration circuit.
pub mod register_signals {
    pub const GLUE: usize = 0;
    pub const NULLIFIER: usize = 1;
    pub const COMMITMENT: usize = 2;
    pub const ATTESTATION_ID: usize = 3;
    pub const COUNT: usize = 4;
}

/// Public-signal layout of the issuer-key-registration circuit.
pub mod issuer_key_signals {
    pub const GLUE: usize = 0;
    pub const ROOT_AUTHORITY_ROOT: usize = 1;
    pub const KEY_COMMITMENT: usize = 2;
    pub const COUNT: usize = 3;
}

/// Inclusive byte ranges of the revealed attributes inside the unpacked
/// 93-byte reveal buffer. Offsets follow the MRZ layout of the underlying
/// document plus the trailing circuit outputs (older-than digits, watchlist
/// results).
pub mod attribute_ranges {
    pub const ISSUING_STATE: (usize, usize) = (2, 4);
    pub const NAME: (usize, usize) = (5, 43);
    pub const PASSPORT_NUMBER: (usize, usize) = (44, 52);
    pub const NATIONALITY: (usize, usize) = (54, 56);
    pub const DATE_OF_BIRTH: (usize, usize) = (57, 62);
    pub const GENDER: (usize, usize) = (64, 64);
    pub const EXPIRY_DATE: (usize, usize) = (65, 70);
    pub const OLDER_THAN: (usize, usize) = (88, 89);
    pub const PASSPORT_NO_OFAC: usize = 90;
    pub const NAME_DOB_OFAC: usize = 91;
    pub const NAME_YOB_OFAC: usize = 92;
}
