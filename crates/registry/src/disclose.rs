//! Selective-disclosure verification.
//!
//! The disclosure path is a query: it never mutates the registry, and
//! failures come back as a structured `(attributes, success, code)` outcome
//! rather than an error, because callers need the specific rejection
//! reason to render a message.
//!
//! The check order (proof, then root/timestamp, then date, age, countries,
//! watchlists) is part of the contract: a given bad input always yields the
//! same code.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use veripass_core::Field;
use veripass_crypto::{unpack_reveal_fields, VerifierId};

use crate::attributes::{decode_reveal_bytes, older_than_value, RevealedAttributes};
use crate::registry::IdentityRegistry;
use crate::signals::DisclosureProof;

/// Rejection reasons for a disclosure verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisclosureCode {
    InvalidProof,
    InvalidTimestamp,
    InvalidCommitmentRoot,
    CurrentDateNotInValidRange,
    InvalidOlderThan,
    InvalidForbiddenCountries,
    InvalidOfacRoot,
    InvalidOfac,
}

impl DisclosureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisclosureCode::InvalidProof => "INVALID_PROOF",
            DisclosureCode::InvalidTimestamp => "INVALID_TIMESTAMP",
            DisclosureCode::InvalidCommitmentRoot => "INVALID_COMMITMENT_ROOT",
            DisclosureCode::CurrentDateNotInValidRange => "CURRENT_DATE_NOT_IN_VALID_RANGE",
            DisclosureCode::InvalidOlderThan => "INVALID_OLDER_THAN",
            DisclosureCode::InvalidForbiddenCountries => "INVALID_FORBIDDEN_COUNTRIES",
            DisclosureCode::InvalidOfacRoot => "INVALID_OFAC_ROOT",
            DisclosureCode::InvalidOfac => "INVALID_OFAC",
        }
    }
}

impl fmt::Display for DisclosureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verifier-side policy a disclosure proof is checked against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosurePolicy {
    pub older_than_enabled: bool,
    /// Minimum asserted age threshold, e.g. 20.
    pub older_than: u8,
    pub forbidden_countries_enabled: bool,
    /// The packed forbidden-country list the proof must match exactly.
    pub forbidden_countries_packed: Field,
    /// Passport-number, name+DOB, name+YOB watchlist checks.
    pub watchlists_enabled: [bool; 3],
}

/// Result of a disclosure verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureOutcome {
    pub attributes: RevealedAttributes,
    pub success: bool,
    pub code: Option<DisclosureCode>,
}

impl DisclosureOutcome {
    fn fail(code: DisclosureCode) -> Self {
        Self {
            attributes: RevealedAttributes::default(),
            success: false,
            code: Some(code),
        }
    }
}

/// Stateless orchestrator for disclosure verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisclosureVerifier;

impl DisclosureVerifier {
    /// Validate a disclosure proof against the registry's current state
    /// and the caller's policy.
    ///
    /// `target_root_timestamp`, when set, pins the proof to the identity
    /// root registered at exactly that time; otherwise any historical
    /// identity root is accepted.
    pub fn verify(
        &self,
        registry: &IdentityRegistry,
        submission: &DisclosureProof,
        policy: &DisclosurePolicy,
        target_root_timestamp: Option<u64>,
    ) -> DisclosureOutcome {
        // 1. Cryptographic proof check. A missing disclosure verifier also
        //    fails closed here.
        let verified = registry
            .verify_proof(
                VerifierId::VcAndDisclose,
                &submission.proof,
                &submission.public_signals,
            )
            .unwrap_or(false);
        if !verified {
            return DisclosureOutcome::fail(DisclosureCode::InvalidProof);
        }
        let signals = match submission.signals() {
            Ok(signals) => signals,
            Err(err) => {
                debug!(%err, "disclosure signals failed to decode");
                return DisclosureOutcome::fail(DisclosureCode::InvalidProof);
            }
        };

        // 2. Root freshness.
        match target_root_timestamp {
            Some(target) => {
                if registry.root_timestamp(&signals.identity_root) != Some(target) {
                    return DisclosureOutcome::fail(DisclosureCode::InvalidTimestamp);
                }
            }
            None => {
                if !registry.check_identity_root(&signals.identity_root) {
                    return DisclosureOutcome::fail(DisclosureCode::InvalidCommitmentRoot);
                }
            }
        }

        // 3. The proof's embedded date must be within a day of now.
        let proof_day = proof_date_to_unix(&signals.current_date);
        let today = start_of_day(registry.now());
        if proof_day + DAY_SECONDS <= today || proof_day >= today + DAY_SECONDS {
            return DisclosureOutcome::fail(DisclosureCode::CurrentDateNotInValidRange);
        }

        let reveal_bytes = unpack_reveal_fields(&signals.revealed_data_packed);

        // 4. Age threshold.
        if policy.older_than_enabled {
            match older_than_value(&reveal_bytes) {
                Some(asserted) if asserted >= policy.older_than => {}
                _ => return DisclosureOutcome::fail(DisclosureCode::InvalidOlderThan),
            }
        }

        // 5. Forbidden-country list: exact packed equality.
        if policy.forbidden_countries_enabled
            && signals.forbidden_countries_packed != policy.forbidden_countries_packed
        {
            return DisclosureOutcome::fail(DisclosureCode::InvalidForbiddenCountries);
        }

        // 6. Watchlists: root equality first, then the asserted
        //    non-membership bits.
        let current_roots = registry.watchlist_roots();
        let proof_roots = [
            signals.passport_no_root,
            signals.name_dob_root,
            signals.name_yob_root,
        ];
        let registry_roots = [
            current_roots.passport_no,
            current_roots.name_dob,
            current_roots.name_yob,
        ];
        for i in 0..3 {
            if policy.watchlists_enabled[i] && proof_roots[i] != registry_roots[i] {
                return DisclosureOutcome::fail(DisclosureCode::InvalidOfacRoot);
            }
        }
        let ofac_bits = [
            reveal_bytes[veripass_core::constants::attribute_ranges::PASSPORT_NO_OFAC],
            reveal_bytes[veripass_core::constants::attribute_ranges::NAME_DOB_OFAC],
            reveal_bytes[veripass_core::constants::attribute_ranges::NAME_YOB_OFAC],
        ];
        for i in 0..3 {
            if policy.watchlists_enabled[i] && ofac_bits[i] != 1 {
                return DisclosureOutcome::fail(DisclosureCode::InvalidOfac);
            }
        }

        // 7. Decode the revealed attributes.
        match decode_reveal_bytes(&reveal_bytes) {
            Ok(attributes) => DisclosureOutcome {
                attributes,
                success: true,
                code: None,
            },
            Err(err) => {
                debug!(%err, "revealed attributes failed to decode");
                DisclosureOutcome::fail(DisclosureCode::InvalidProof)
            }
        }
    }
}

const DAY_SECONDS: u64 = 86_400;

/// Unix timestamp of the start of the day `ts` falls in.
pub fn start_of_day(ts: u64) -> u64 {
    ts - ts % DAY_SECONDS
}

/// Convert six proof-side YYMMDD digits into the unix timestamp of that
/// day's start, century 2000. Out-of-range months or days yield 0, which
/// never lands inside the acceptance window.
pub fn proof_date_to_unix(digits: &[u8; 6]) -> u64 {
    let year = 2000 + (digits[0] as u64) * 10 + digits[1] as u64;
    let month = (digits[2] as u64) * 10 + digits[3] as u64;
    let day = (digits[4] as u64) * 10 + digits[5] as u64;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return 0;
    }

    let mut timestamp = 0u64;
    for y in 1970..year {
        timestamp += if is_leap_year(y) { 366 } else { 365 } * DAY_SECONDS;
    }
    let month_days = [
        31,
        if is_leap_year(year) { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    for m in 1..month {
        timestamp += month_days[(m - 1) as usize] * DAY_SECONDS;
    }
    timestamp + (day - 1) * DAY_SECONDS
}

fn is_leap_year(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Render a unix timestamp's UTC date as the six YYMMDD proof digits.
/// Inverse of [`proof_date_to_unix`] for post-2000 dates.
pub fn unix_to_proof_date(ts: u64) -> [u8; 6] {
    let mut days = ts / DAY_SECONDS;
    let mut year = 1970u64;
    loop {
        let year_days = if is_leap_year(year) { 366 } else { 365 };
        if days < year_days {
            break;
        }
        days -= year_days;
        year += 1;
    }
    let month_days = [
        31,
        if is_leap_year(year) { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut month = 1u64;
    for len in month_days {
        if days < len {
            break;
        }
        days -= len;
        month += 1;
    }
    let day = days + 1;
    let yy = year % 100;
    [
        (yy / 10) as u8,
        (yy % 10) as u8,
        (month / 10) as u8,
        (month % 10) as u8,
        (day / 10) as u8,
        (day % 10) as u8,
    ]
}
