//! Disclosure verification integration tests.
//!
//! Exercises the policy ladder end to end: age thresholds, the proof-date
//! freshness window and selective attribute reveal.

use crate::test_utils::{
    active_registry, attestation_id, forbidden_packed, french_reveal_bytes, init_tracing,
    make_disclosure_proof, nationality_only_reveal_bytes, sample_watchlist_roots, NOW,
};
use veripass_core::Field;
use veripass_registry::{AdminToken, DisclosureCode, DisclosurePolicy, DisclosureVerifier, IdentityRegistry};

const DAY: u64 = 86_400;

fn registry_with_holder() -> (IdentityRegistry, AdminToken, Field) {
    let (mut registry, token) = active_registry();
    registry.initialize(&token, Field::from_u64(5000)).unwrap();
    registry
        .update_watchlist_roots(&token, sample_watchlist_roots())
        .unwrap();

    let nullifier = Field::from_u64(808080);
    registry
        .dev_add_identity_commitment(&token, attestation_id(), nullifier, Field::from_u64(999_999))
        .unwrap();
    (registry, token, nullifier)
}

fn base_policy() -> DisclosurePolicy {
    DisclosurePolicy {
        older_than_enabled: true,
        older_than: 20,
        forbidden_countries_enabled: true,
        forbidden_countries_packed: forbidden_packed(),
        watchlists_enabled: [true, true, true],
    }
}

#[test]
fn test_age_threshold_pass_and_fail() {
    init_tracing();
    let (registry, _token, nullifier) = registry_with_holder();
    let submission = make_disclosure_proof(&registry, &french_reveal_bytes(), nullifier, NOW);

    // Holder asserts 20; policy of 20 passes.
    let outcome = DisclosureVerifier.verify(&registry, &submission, &base_policy(), None);
    assert!(outcome.success, "unexpected failure: {:?}", outcome.code);

    // Policy of 21 rejects the same proof.
    let mut strict = base_policy();
    strict.older_than = 21;
    let outcome = DisclosureVerifier.verify(&registry, &submission, &strict, None);
    assert!(!outcome.success);
    assert_eq!(outcome.code, Some(DisclosureCode::InvalidOlderThan));
    assert_eq!(outcome.code.unwrap().as_str(), "INVALID_OLDER_THAN");
}

#[test]
fn test_date_window_enforcement() {
    init_tracing();
    let (registry, _token, nullifier) = registry_with_holder();
    let reveal = french_reveal_bytes();

    // Proof dated more than a day before now is rejected.
    let stale = make_disclosure_proof(&registry, &reveal, nullifier, NOW - DAY - 1);
    let outcome = DisclosureVerifier.verify(&registry, &stale, &base_policy(), None);
    assert_eq!(outcome.code, Some(DisclosureCode::CurrentDateNotInValidRange));

    // Proof dated inside the window passes the date check.
    let fresh = make_disclosure_proof(&registry, &reveal, nullifier, NOW);
    let outcome = DisclosureVerifier.verify(&registry, &fresh, &base_policy(), None);
    assert!(outcome.success);
}

#[test]
fn test_nationality_only_reveal() {
    init_tracing();
    let (registry, _token, nullifier) = registry_with_holder();
    let submission =
        make_disclosure_proof(&registry, &nationality_only_reveal_bytes(), nullifier, NOW);

    // Only the nationality was revealed, so no other policy gate applies.
    let policy = DisclosurePolicy::default();
    let outcome = DisclosureVerifier.verify(&registry, &submission, &policy, None);
    assert!(outcome.success, "unexpected failure: {:?}", outcome.code);

    let attrs = &outcome.attributes;
    assert_eq!(attrs.nationality, "FRA");
    assert_eq!(attrs.issuing_state, "");
    assert_eq!(attrs.first_name, "");
    assert_eq!(attrs.last_name, "");
    assert_eq!(attrs.passport_number, "");
    assert_eq!(attrs.date_of_birth, "");
    assert_eq!(attrs.gender, "");
    assert_eq!(attrs.expiry_date, "");
    assert_eq!(attrs.older_than, "");
}

#[test]
fn test_full_reveal_decodes_every_attribute() {
    init_tracing();
    let (registry, _token, nullifier) = registry_with_holder();
    let submission = make_disclosure_proof(&registry, &french_reveal_bytes(), nullifier, NOW);

    let outcome = DisclosureVerifier.verify(&registry, &submission, &base_policy(), None);
    assert!(outcome.success);
    let attrs = &outcome.attributes;
    assert_eq!(attrs.issuing_state, "FRA");
    assert_eq!(attrs.last_name, "DUPONT");
    assert_eq!(attrs.first_name, "JEAN");
    assert_eq!(attrs.passport_number, "19HA34828");
    assert_eq!(attrs.date_of_birth, "01-01-05");
    assert_eq!(attrs.gender, "M");
    assert_eq!(attrs.expiry_date, "01-01-33");
    assert!(attrs.passport_no_ofac && attrs.name_dob_ofac && attrs.name_yob_ofac);
}

#[test]
fn test_watchlist_gates() {
    init_tracing();
    let (registry, _token, nullifier) = registry_with_holder();

    // A proof carrying stale watchlist roots is rejected before the bits
    // are even considered.
    let mut submission = make_disclosure_proof(&registry, &french_reveal_bytes(), nullifier, NOW);
    submission.public_signals[veripass_core::constants::disclose_signals::PASSPORT_NO_WATCHLIST_ROOT] =
        Field::from_u64(4);
    let outcome = DisclosureVerifier.verify(&registry, &submission, &base_policy(), None);
    assert_eq!(outcome.code, Some(DisclosureCode::InvalidOfacRoot));

    // A watchlist hit (bit 0) on an enabled list is rejected.
    let mut flagged = french_reveal_bytes();
    flagged[veripass_core::constants::attribute_ranges::PASSPORT_NO_OFAC] = 0;
    let submission = make_disclosure_proof(&registry, &flagged, nullifier, NOW);
    let outcome = DisclosureVerifier.verify(&registry, &submission, &base_policy(), None);
    assert_eq!(outcome.code, Some(DisclosureCode::InvalidOfac));
}
