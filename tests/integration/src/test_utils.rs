//! Shared fixtures for the integration suite.

use veripass_core::constants::{attribute_ranges, E_PASSPORT_ATTESTATION_ID, REVEAL_BYTES_LEN};
use veripass_core::Field;
use veripass_crypto::{
    pack_forbidden_countries, pack_reveal_bytes, Groth16Proof, HashKind, MockProofVerifier,
    SchemeId, SignatureKind, VerifierId, VerifierRegistry,
};
use veripass_registry::{
    unix_to_proof_date, AdminToken, DiscloseSignals, DisclosureProof, FixedClock, IdentityRegistry,
    IssuerKeyProof, RegisterProof, WatchlistRoots,
};

/// 2025-08-08 00:00:00 UTC, the pinned "now" of the suite.
pub const NOW: u64 = 1_754_611_200;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

pub fn rsa_scheme() -> SchemeId {
    SchemeId {
        signature: SignatureKind::Rsa,
        hash: HashKind::Sha256,
        key_bits: 2048,
    }
}

pub fn attestation_id() -> Field {
    Field::from_dec_str(E_PASSPORT_ATTESTATION_ID).expect("constant attestation id")
}

/// A registry with accepting mock verifiers for the three circuits and a
/// clock pinned to [`NOW`].
pub fn active_registry() -> (IdentityRegistry, AdminToken) {
    let mut verifiers = VerifierRegistry::new();
    verifiers.register(
        VerifierId::Register(rsa_scheme()),
        Box::new(MockProofVerifier::accepting()),
    );
    verifiers.register(
        VerifierId::IssuerKey(rsa_scheme()),
        Box::new(MockProofVerifier::accepting()),
    );
    verifiers.register(
        VerifierId::VcAndDisclose,
        Box::new(MockProofVerifier::accepting()),
    );
    let (registry, token) = IdentityRegistry::new(verifiers);
    (registry.with_clock(Box::new(FixedClock::new(NOW))), token)
}

pub fn make_register_proof(glue: Field, nullifier: Field, commitment: Field) -> RegisterProof {
    RegisterProof {
        verifier_id: VerifierId::Register(rsa_scheme()),
        proof: Groth16Proof::placeholder(),
        public_signals: vec![glue, nullifier, commitment, attestation_id()],
    }
}

pub fn make_issuer_key_proof(glue: Field, root_authority_root: Field, key_commitment: Field) -> IssuerKeyProof {
    IssuerKeyProof {
        verifier_id: VerifierId::IssuerKey(rsa_scheme()),
        proof: Groth16Proof::placeholder(),
        public_signals: vec![glue, root_authority_root, key_commitment],
    }
}

/// Reveal buffer for a French mock passport holder asserting age 20 and
/// clean watchlist results.
pub fn french_reveal_bytes() -> [u8; REVEAL_BYTES_LEN] {
    let mut bytes = [0u8; REVEAL_BYTES_LEN];
    write_attr(&mut bytes, attribute_ranges::ISSUING_STATE.0, "FRA");
    write_attr(&mut bytes, attribute_ranges::NAME.0, "DUPONT<<JEAN");
    write_attr(&mut bytes, attribute_ranges::PASSPORT_NUMBER.0, "19HA34828");
    write_attr(&mut bytes, attribute_ranges::NATIONALITY.0, "FRA");
    write_attr(&mut bytes, attribute_ranges::DATE_OF_BIRTH.0, "050101");
    write_attr(&mut bytes, attribute_ranges::GENDER.0, "M");
    write_attr(&mut bytes, attribute_ranges::EXPIRY_DATE.0, "330101");
    write_attr(&mut bytes, attribute_ranges::OLDER_THAN.0, "20");
    bytes[attribute_ranges::PASSPORT_NO_OFAC] = 1;
    bytes[attribute_ranges::NAME_DOB_OFAC] = 1;
    bytes[attribute_ranges::NAME_YOB_OFAC] = 1;
    bytes
}

/// Reveal buffer disclosing nothing but the nationality.
pub fn nationality_only_reveal_bytes() -> [u8; REVEAL_BYTES_LEN] {
    let mut bytes = [0u8; REVEAL_BYTES_LEN];
    write_attr(&mut bytes, attribute_ranges::NATIONALITY.0, "FRA");
    bytes
}

pub fn write_attr(bytes: &mut [u8; REVEAL_BYTES_LEN], start: usize, value: &str) {
    bytes[start..start + value.len()].copy_from_slice(value.as_bytes());
}

pub fn forbidden_packed() -> Field {
    pack_forbidden_countries(&["PRK", "IRN"]).expect("static list")[0]
}

pub fn sample_watchlist_roots() -> WatchlistRoots {
    WatchlistRoots {
        passport_no: Field::from_u64(1100),
        name_dob: Field::from_u64(2200),
        name_yob: Field::from_u64(3300),
    }
}

/// Build a disclosure transcript consistent with the registry's current
/// identity root and the given reveal buffer.
pub fn make_disclosure_proof(
    registry: &IdentityRegistry,
    reveal_bytes: &[u8; REVEAL_BYTES_LEN],
    nullifier: Field,
    date: u64,
) -> DisclosureProof {
    let roots = registry.watchlist_roots();
    let signals = DiscloseSignals {
        revealed_data_packed: pack_reveal_bytes(reveal_bytes).expect("93-byte buffer"),
        forbidden_countries_packed: forbidden_packed(),
        nullifier,
        attestation_id: attestation_id(),
        identity_root: registry.current_identity_root(),
        current_date: unix_to_proof_date(date),
        passport_no_root: roots.passport_no,
        name_dob_root: roots.name_dob,
        name_yob_root: roots.name_yob,
        scope: Field::from_u64(1),
        user_identifier: Field::from_u64(2),
    };
    DisclosureProof {
        proof: Groth16Proof::placeholder(),
        public_signals: signals.encode(),
    }
}
