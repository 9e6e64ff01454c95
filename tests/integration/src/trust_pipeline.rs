//! Certificate-to-registry pipeline tests.
//!
//! Walks the registration data flow end to end on real certificates:
//! trust-directory lookup, brute-force scheme resolution, circuit-input
//! generation, root-authority tree construction and issuer-key
//! registration.

use crate::test_utils::{active_registry, init_tracing, make_issuer_key_proof};
use veripass_core::Field;
use veripass_crypto::pack_bytes_and_poseidon;
use veripass_trust::{
    issuer_circuit_inputs, locate_issuer, resolve_against_issuer, Certificate, HashAlgo,
    SignatureScheme, TrustDirectory,
};
use veripass_tree::{CommitmentTree, TreeSnapshot};

const CSCA_RSA: &str = include_str!("../../../crates/trust/testdata/csca_rsa.pem");
const DSC_RSA: &str = include_str!("../../../crates/trust/testdata/dsc_rsa.pem");
const DSC_PSS: &str = include_str!("../../../crates/trust/testdata/dsc_pss.pem");
const CSCA_EC: &str = include_str!("../../../crates/trust/testdata/csca_ec.pem");

/// Commitment leaf for a trusted root key: its embedded key bytes packed
/// and hashed.
fn root_key_leaf(cert: &Certificate) -> Field {
    pack_bytes_and_poseidon(&cert.public_key.embedded_bytes()).expect("key fits the hash")
}

#[test]
fn test_certificate_to_issuer_registration() {
    init_tracing();

    // Step 1: the trust directory knows both country roots.
    let csca_rsa = Certificate::from_pem(CSCA_RSA).unwrap();
    let csca_ec = Certificate::from_pem(CSCA_EC).unwrap();
    let mut directory = TrustDirectory::new();
    directory.insert(csca_rsa.clone()).unwrap();
    directory.insert(csca_ec.clone()).unwrap();

    // Step 2: a signer certificate resolves to its root by key id.
    let signer = Certificate::from_pem(DSC_RSA).unwrap();
    let issuer = locate_issuer(&signer, &directory).unwrap();
    assert!(issuer.subject.contains("CSCA-FRANCE"));

    // Step 3: brute-force resolution identifies the signing scheme.
    let scheme = resolve_against_issuer(&signer, issuer).unwrap();
    assert_eq!(scheme, SignatureScheme::Rsa { hash: HashAlgo::Sha256 });

    // Step 4: circuit inputs come out in the resolved scheme's shape.
    let inputs = issuer_circuit_inputs(&signer, issuer, &scheme).unwrap();
    assert_eq!(inputs.scheme_id.to_string(), "rsa_sha256_2048");
    assert!(!inputs.issuer_key_words.is_empty());

    // Step 5: the root-authority tree commits to both roots, and the
    // registry accepts an issuer-key proof built against its root.
    let mut csca_tree = CommitmentTree::new();
    csca_tree.insert(root_key_leaf(&csca_rsa), 1).unwrap();
    csca_tree.insert(root_key_leaf(&csca_ec), 2).unwrap();

    let (mut registry, token) = active_registry();
    registry.initialize(&token, csca_tree.root()).unwrap();

    let issuer_proof = make_issuer_key_proof(
        Field::from_u64(12),
        csca_tree.root(),
        root_key_leaf(&signer),
    );
    let index = registry.register_issuer_key(&issuer_proof).unwrap();
    assert_eq!(index, 0);
    assert!(registry.check_root_authority_root(&csca_tree.root()));
}

#[test]
fn test_pss_signer_resolves_before_registration() {
    init_tracing();
    let csca = Certificate::from_pem(CSCA_RSA).unwrap();
    let signer = Certificate::from_pem(DSC_PSS).unwrap();

    // The declared algorithm is PSS with unreliable parameters; the
    // resolver pins down the real hash and salt.
    let scheme = resolve_against_issuer(&signer, &csca).unwrap();
    assert_eq!(
        scheme,
        SignatureScheme::RsaPss {
            hash: HashAlgo::Sha256,
            salt_len: 32
        }
    );

    let inputs = issuer_circuit_inputs(&signer, &csca, &scheme).unwrap();
    assert_eq!(inputs.scheme_id.to_string(), "rsapss_sha256_2048");
}

#[test]
fn test_root_authority_tree_snapshot_round_trip() {
    init_tracing();
    let csca_rsa = Certificate::from_pem(CSCA_RSA).unwrap();
    let csca_ec = Certificate::from_pem(CSCA_EC).unwrap();

    let mut tree = CommitmentTree::new();
    tree.insert(root_key_leaf(&csca_rsa), 10).unwrap();
    tree.insert(root_key_leaf(&csca_ec), 20).unwrap();

    // Serialize and reload the distributed form; proofs still verify.
    let json = serde_json::to_string(&tree.to_snapshot().unwrap()).unwrap();
    let snapshot: TreeSnapshot = serde_json::from_str(&json).unwrap();
    let restored = CommitmentTree::from_snapshot(&snapshot, 30).unwrap();
    assert_eq!(restored.root(), tree.root());

    let proof = restored.proof(1).unwrap();
    assert!(proof.verify(tree.root()));
}
