//! Registration ledger integration tests.
//!
//! Covers the two-proof glue flow, nullifier uniqueness and the
//! registry's atomicity guarantees.

use crate::test_utils::{
    active_registry, attestation_id, init_tracing, make_issuer_key_proof, make_register_proof, NOW,
};
use veripass_core::Field;
use veripass_registry::RegistryError;

#[test]
fn test_issuer_key_then_identity_registration() {
    init_tracing();
    let (mut registry, token) = active_registry();
    let csca_root = Field::from_u64(5000);
    registry.initialize(&token, csca_root).unwrap();

    // Issuer key commitment lands at index 0.
    let glue = Field::from_u64(440044);
    let issuer_proof = make_issuer_key_proof(glue, csca_root, Field::from_u64(9001));
    assert_eq!(registry.register_issuer_key(&issuer_proof).unwrap(), 0);

    // Identity commitment with matching glue and a fresh nullifier.
    let nullifier = Field::from_u64(606060);
    let register = make_register_proof(glue, nullifier, Field::from_u64(123_456));
    let record = registry.register_identity(&register, Some(&issuer_proof)).unwrap();

    assert_eq!(registry.tree_size(), 1);
    assert!(registry.is_nullifier_used(&attestation_id(), &nullifier));
    assert_eq!(registry.root_timestamp(&record.root), Some(NOW));
    assert_eq!(registry.current_identity_root(), record.root);
    assert_eq!(registry.index_of(&Field::from_u64(123_456)), Some(0));
}

#[test]
fn test_glue_matrix() {
    init_tracing();
    let (mut registry, token) = active_registry();
    let csca_root = Field::from_u64(5000);
    registry.initialize(&token, csca_root).unwrap();

    // Proof pairs built from different secrets for the same certificate
    // produce different glue values and must be rejected.
    let register = make_register_proof(
        Field::from_u64(111),
        Field::from_u64(1),
        Field::from_u64(10),
    );
    let mismatched_issuer = make_issuer_key_proof(Field::from_u64(222), csca_root, Field::from_u64(20));
    let err = registry
        .register_identity(&register, Some(&mismatched_issuer))
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnequalGlue));
    assert_eq!(registry.tree_size(), 0);

    // Matching secrets pass glue equality.
    let matched_issuer = make_issuer_key_proof(Field::from_u64(111), csca_root, Field::from_u64(20));
    registry
        .register_identity(&register, Some(&matched_issuer))
        .unwrap();
    assert_eq!(registry.tree_size(), 1);
}

#[test]
fn test_nullifier_idempotence_guard() {
    init_tracing();
    let (mut registry, token) = active_registry();
    registry.initialize(&token, Field::from_u64(5000)).unwrap();

    let nullifier = Field::from_u64(777);
    registry
        .register_identity(
            &make_register_proof(Field::from_u64(1), nullifier, Field::from_u64(100)),
            None,
        )
        .unwrap();

    // Snapshot observable state after the first registration.
    let size = registry.tree_size();
    let root = registry.current_identity_root();
    let records = registry.records().len();

    let err = registry
        .register_identity(
            &make_register_proof(Field::from_u64(2), nullifier, Field::from_u64(200)),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::NullifierAlreadyUsed));

    // Registry state is identical to after the first attempt.
    assert_eq!(registry.tree_size(), size);
    assert_eq!(registry.current_identity_root(), root);
    assert_eq!(registry.records().len(), records);
    assert_eq!(registry.index_of(&Field::from_u64(200)), None);
}

#[test]
fn test_stale_root_authority_rejected_for_both_paths() {
    init_tracing();
    let (mut registry, token) = active_registry();
    registry.initialize(&token, Field::from_u64(5000)).unwrap();

    let stale_issuer = make_issuer_key_proof(
        Field::from_u64(1),
        Field::from_u64(4999),
        Field::from_u64(30),
    );
    assert!(matches!(
        registry.register_issuer_key(&stale_issuer).unwrap_err(),
        RegistryError::InvalidRootAuthorityRoot
    ));

    let register = make_register_proof(Field::from_u64(1), Field::from_u64(2), Field::from_u64(40));
    assert!(matches!(
        registry
            .register_identity(&register, Some(&stale_issuer))
            .unwrap_err(),
        RegistryError::InvalidRootAuthorityRoot
    ));
}

#[test]
fn test_roots_remain_queryable_across_registrations() {
    init_tracing();
    let (mut registry, token) = active_registry();
    registry.initialize(&token, Field::from_u64(5000)).unwrap();

    let mut roots = Vec::new();
    for i in 0..4u64 {
        let record = registry
            .register_identity(
                &make_register_proof(
                    Field::from_u64(i + 1),
                    Field::from_u64(1000 + i),
                    Field::from_u64(2000 + i),
                ),
                None,
            )
            .unwrap();
        roots.push(record.root);
    }
    for root in &roots {
        assert!(registry.check_identity_root(root));
        assert_eq!(registry.root_timestamp(root), Some(NOW));
    }
    assert_eq!(registry.tree_size(), 4);
}
