//! Shared fixtures for registry tests.

use veripass_core::constants::{attribute_ranges, E_PASSPORT_ATTESTATION_ID, REVEAL_BYTES_LEN};
use veripass_core::Field;
use veripass_crypto::{
    pack_forbidden_countries, pack_reveal_bytes, Groth16Proof, HashKind, MockProofVerifier,
    SchemeId, SignatureKind, VerifierId, VerifierRegistry,
};

use crate::disclose::unix_to_proof_date;
use crate::registry::{AdminToken, IdentityRegistry, WatchlistRoots};
use crate::signals::{DiscloseSignals, DisclosureProof, IssuerKeyProof, RegisterProof};

pub fn scheme() -> SchemeId {
    SchemeId {
        signature: SignatureKind::Rsa,
        hash: HashKind::Sha256,
        key_bits: 4096,
    }
}

pub fn attestation_id() -> Field {
    Field::from_dec_str(E_PASSPORT_ATTESTATION_ID).expect("constant attestation id")
}

/// A registry wired with mock verifiers for all three circuits.
pub fn test_registry(accept: bool) -> (IdentityRegistry, AdminToken) {
    let mock = || -> Box<MockProofVerifier> {
        Box::new(if accept {
            MockProofVerifier::accepting()
        } else {
            MockProofVerifier::rejecting()
        })
    };
    let mut verifiers = VerifierRegistry::new();
    verifiers.register(VerifierId::Register(scheme()), mock());
    verifiers.register(VerifierId::IssuerKey(scheme()), mock());
    verifiers.register(VerifierId::VcAndDisclose, mock());
    IdentityRegistry::new(verifiers)
}

pub fn register_proof(glue: u64, nullifier: u64, commitment: u64) -> RegisterProof {
    RegisterProof {
        verifier_id: VerifierId::Register(scheme()),
        proof: Groth16Proof::placeholder(),
        public_signals: vec![
            Field::from_u64(glue),
            Field::from_u64(nullifier),
            Field::from_u64(commitment),
            attestation_id(),
        ],
    }
}

pub fn issuer_key_proof(glue: u64, root_authority_root: u64, key_commitment: u64) -> IssuerKeyProof {
    IssuerKeyProof {
        verifier_id: VerifierId::IssuerKey(scheme()),
        proof: Groth16Proof::placeholder(),
        public_signals: vec![
            Field::from_u64(glue),
            Field::from_u64(root_authority_root),
            Field::from_u64(key_commitment),
        ],
    }
}

/// Everything needed to fabricate a consistent disclosure transcript.
pub struct DisclosureFixture {
    pub attestation_id: Field,
    pub nullifier: Field,
    pub commitment: Field,
    pub watchlist_roots: WatchlistRoots,
    pub reveal_bytes: [u8; REVEAL_BYTES_LEN],
    pub now: u64,
}

impl DisclosureFixture {
    pub fn sample(now: u64) -> Self {
        let mut reveal_bytes = [0u8; REVEAL_BYTES_LEN];
        let write = |bytes: &mut [u8; REVEAL_BYTES_LEN], start: usize, value: &str| {
            bytes[start..start + value.len()].copy_from_slice(value.as_bytes());
        };
        write(&mut reveal_bytes, attribute_ranges::ISSUING_STATE.0, "FRA");
        write(&mut reveal_bytes, attribute_ranges::NAME.0, "DUPONT<<JEAN");
        write(&mut reveal_bytes, attribute_ranges::PASSPORT_NUMBER.0, "19HA34828");
        write(&mut reveal_bytes, attribute_ranges::NATIONALITY.0, "FRA");
        write(&mut reveal_bytes, attribute_ranges::DATE_OF_BIRTH.0, "050101");
        write(&mut reveal_bytes, attribute_ranges::GENDER.0, "M");
        write(&mut reveal_bytes, attribute_ranges::EXPIRY_DATE.0, "330101");
        write(&mut reveal_bytes, attribute_ranges::OLDER_THAN.0, "20");
        reveal_bytes[attribute_ranges::PASSPORT_NO_OFAC] = 1;
        reveal_bytes[attribute_ranges::NAME_DOB_OFAC] = 1;
        reveal_bytes[attribute_ranges::NAME_YOB_OFAC] = 1;

        Self {
            attestation_id: attestation_id(),
            nullifier: Field::from_u64(888),
            commitment: Field::from_u64(777),
            watchlist_roots: WatchlistRoots {
                passport_no: Field::from_u64(11),
                name_dob: Field::from_u64(22),
                name_yob: Field::from_u64(33),
            },
            reveal_bytes,
            now,
        }
    }

    pub fn forbidden_packed() -> Field {
        pack_forbidden_countries(&["PRK", "IRN"]).expect("static list")[0]
    }
}

/// Build a disclosure transcript consistent with the registry's current
/// identity root and the fixture's data.
pub fn disclosure_proof(registry: &IdentityRegistry, fixture: &DisclosureFixture) -> DisclosureProof {
    let signals = DiscloseSignals {
        revealed_data_packed: pack_reveal_bytes(&fixture.reveal_bytes).expect("93-byte buffer"),
        forbidden_countries_packed: DisclosureFixture::forbidden_packed(),
        nullifier: fixture.nullifier,
        attestation_id: fixture.attestation_id,
        identity_root: registry.current_identity_root(),
        current_date: unix_to_proof_date(fixture.now),
        passport_no_root: fixture.watchlist_roots.passport_no,
        name_dob_root: fixture.watchlist_roots.name_dob,
        name_yob_root: fixture.watchlist_roots.name_yob,
        scope: Field::from_u64(1),
        user_identifier: Field::from_u64(2),
    };
    DisclosureProof {
        proof: Groth16Proof::placeholder(),
        public_signals: signals.encode(),
    }
}
