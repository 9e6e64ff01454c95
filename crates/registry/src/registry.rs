//! The identity registry ledger.
//!
//! One logical, append-only ledger: an issuer-key commitment tree, an
//! identity commitment tree, per-attestation nullifier sets, the three
//! watchlist roots, and the root-authority (CSCA) tree root the issuer
//! proofs must chain to. Writes are serialized by the caller; the read
//! path is side-effect free.
//!
//! Every mutator validates completely before touching state, so a rejected
//! registration leaves the ledger byte-identical to before the call.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use veripass_core::Field;
use veripass_crypto::{Groth16Proof, VerifierId, VerifierRegistry};
use veripass_tree::{CommitmentTree, MerkleProof, TreeError};

use crate::clock::{Clock, SystemClock};
use crate::error::{RegistryError, Result};
use crate::signals::{IssuerKeyProof, RegisterProof};

static NEXT_ADMIN_ID: AtomicU64 = AtomicU64::new(1);

/// Owner capability for the administrative path. Obtainable only from
/// [`IdentityRegistry::new`]; orthogonal to the cryptographic checks.
#[derive(Debug)]
pub struct AdminToken {
    id: u64,
}

/// The three watchlist roots tracked by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistRoots {
    pub passport_no: Field,
    pub name_dob: Field,
    pub name_yob: Field,
}

/// The durable record of one successful identity registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub attestation_id: Field,
    pub nullifier: Field,
    pub commitment: Field,
    pub timestamp: u64,
    pub root: Field,
    pub index: usize,
}

/// The registry ledger.
pub struct IdentityRegistry {
    verifiers: VerifierRegistry,
    clock: Box<dyn Clock>,
    admin_id: u64,
    root_authority_root: Option<Field>,
    identity_tree: CommitmentTree,
    issuer_key_tree: CommitmentTree,
    nullifiers: HashSet<(Field, Field)>,
    watchlist_roots: WatchlistRoots,
    records: Vec<RegistrationRecord>,
}

impl IdentityRegistry {
    /// Create an uninitialized registry and its owner capability.
    pub fn new(verifiers: VerifierRegistry) -> (Self, AdminToken) {
        let admin_id = NEXT_ADMIN_ID.fetch_add(1, Ordering::SeqCst);
        (
            Self {
                verifiers,
                clock: Box::new(SystemClock),
                admin_id,
                root_authority_root: None,
                identity_tree: CommitmentTree::new(),
                issuer_key_tree: CommitmentTree::new(),
                nullifiers: HashSet::new(),
                watchlist_roots: WatchlistRoots::default(),
                records: Vec::new(),
            },
            AdminToken { id: admin_id },
        )
    }

    /// Replace the wall clock (tests).
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the root-authority (CSCA) tree root, activating the registry.
    pub fn initialize(&mut self, token: &AdminToken, root_authority_root: Field) -> Result<()> {
        self.check_admin(token)?;
        self.root_authority_root = Some(root_authority_root);
        info!(root = %root_authority_root, "registry initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.root_authority_root.is_some()
    }

    // -----------------------------------------------------------------
    // Registration path
    // -----------------------------------------------------------------

    /// Register an issuer-key commitment. Returns the new leaf index.
    pub fn register_issuer_key(&mut self, submission: &IssuerKeyProof) -> Result<usize> {
        let root_authority_root = self.active_root()?;
        let signals = submission.signals()?;

        match self.verifiers.verify(
            submission.verifier_id,
            &submission.proof,
            &submission.public_signals,
        ) {
            None => {
                return Err(RegistryError::NoVerifierForScheme(
                    submission.verifier_id.to_string(),
                ))
            }
            Some(false) => {
                warn!(circuit = %submission.verifier_id, "issuer proof rejected");
                return Err(RegistryError::InvalidIssuerProof);
            }
            Some(true) => {}
        }

        if signals.root_authority_root != root_authority_root {
            return Err(RegistryError::InvalidRootAuthorityRoot);
        }
        if self.issuer_key_tree.contains(&signals.key_commitment) {
            return Err(RegistryError::DuplicateCommitment);
        }

        let timestamp = self.clock.now();
        let index = insert_mapped(&mut self.issuer_key_tree, signals.key_commitment, timestamp)?;
        info!(
            index,
            commitment = %signals.key_commitment,
            root = %self.issuer_key_tree.root(),
            "issuer key registered"
        );
        Ok(index)
    }

    /// Register an identity commitment.
    ///
    /// The two-proof form cross-checks the glue value and the embedded
    /// root-authority root of the accompanying issuer-key proof. The
    /// legacy single-proof form performs only the register-proof checks.
    pub fn register_identity(
        &mut self,
        register: &RegisterProof,
        issuer_key: Option<&IssuerKeyProof>,
    ) -> Result<RegistrationRecord> {
        let root_authority_root = self.active_root()?;
        let signals = register.signals()?;

        match self
            .verifiers
            .verify(register.verifier_id, &register.proof, &register.public_signals)
        {
            None => {
                return Err(RegistryError::NoVerifierForScheme(
                    register.verifier_id.to_string(),
                ))
            }
            Some(false) => {
                warn!(circuit = %register.verifier_id, "register proof rejected");
                return Err(RegistryError::InvalidRegisterProof);
            }
            Some(true) => {}
        }

        if let Some(issuer_key) = issuer_key {
            let issuer_signals = issuer_key.signals()?;
            match self.verifiers.verify(
                issuer_key.verifier_id,
                &issuer_key.proof,
                &issuer_key.public_signals,
            ) {
                None => {
                    return Err(RegistryError::NoVerifierForScheme(
                        issuer_key.verifier_id.to_string(),
                    ))
                }
                Some(false) => {
                    warn!(circuit = %issuer_key.verifier_id, "issuer-key proof rejected");
                    return Err(RegistryError::InvalidIssuerKeyProof);
                }
                Some(true) => {}
            }
            // Glue equality is the only evidence both proofs came from the
            // same physical certificate. Constant-time comparison.
            if !signals.glue.ct_eq(&issuer_signals.glue) {
                return Err(RegistryError::UnequalGlue);
            }
            if issuer_signals.root_authority_root != root_authority_root {
                return Err(RegistryError::InvalidRootAuthorityRoot);
            }
        }

        let nullifier_key = (signals.attestation_id, signals.nullifier);
        if self.nullifiers.contains(&nullifier_key) {
            return Err(RegistryError::NullifierAlreadyUsed);
        }

        let timestamp = self.clock.now();
        let index = insert_mapped(&mut self.identity_tree, signals.commitment, timestamp)?;
        self.nullifiers.insert(nullifier_key);

        let record = RegistrationRecord {
            attestation_id: signals.attestation_id,
            nullifier: signals.nullifier,
            commitment: signals.commitment,
            timestamp,
            root: self.identity_tree.root(),
            index,
        };
        info!(
            index,
            nullifier = %record.nullifier,
            commitment = %record.commitment,
            root = %record.root,
            "identity registered"
        );
        self.records.push(record.clone());
        Ok(record)
    }

    // -----------------------------------------------------------------
    // Read path (side-effect free, safe under concurrent readers)
    // -----------------------------------------------------------------

    pub fn current_identity_root(&self) -> Field {
        self.identity_tree.root()
    }

    pub fn current_issuer_key_root(&self) -> Field {
        self.issuer_key_tree.root()
    }

    /// Timestamp of an identity-tree root, current or historical.
    pub fn root_timestamp(&self, root: &Field) -> Option<u64> {
        self.identity_tree.root_timestamp(root)
    }

    pub fn is_nullifier_used(&self, attestation_id: &Field, nullifier: &Field) -> bool {
        self.nullifiers.contains(&(*attestation_id, *nullifier))
    }

    pub fn index_of(&self, commitment: &Field) -> Option<usize> {
        self.identity_tree.index_of(commitment)
    }

    pub fn tree_size(&self) -> usize {
        self.identity_tree.size()
    }

    pub fn check_identity_root(&self, root: &Field) -> bool {
        self.identity_tree.check_root(root)
    }

    pub fn check_root_authority_root(&self, root: &Field) -> bool {
        self.root_authority_root.as_ref() == Some(root)
    }

    pub fn watchlist_roots(&self) -> WatchlistRoots {
        self.watchlist_roots
    }

    pub fn check_watchlist_roots(&self, passport_no: &Field, name_dob: &Field, name_yob: &Field) -> bool {
        self.watchlist_roots.passport_no == *passport_no
            && self.watchlist_roots.name_dob == *name_dob
            && self.watchlist_roots.name_yob == *name_yob
    }

    /// Inclusion proof for a registered identity commitment.
    pub fn identity_proof(&self, index: usize) -> Result<MerkleProof> {
        Ok(self.identity_tree.proof(index)?)
    }

    pub fn records(&self) -> &[RegistrationRecord] {
        &self.records
    }

    pub(crate) fn verify_proof(
        &self,
        id: VerifierId,
        proof: &Groth16Proof,
        public_signals: &[Field],
    ) -> Option<bool> {
        self.verifiers.verify(id, proof, public_signals)
    }

    pub(crate) fn now(&self) -> u64 {
        self.clock.now()
    }

    // -----------------------------------------------------------------
    // Administrative path (owner capability, not part of the trust model)
    // -----------------------------------------------------------------

    /// Insert an identity commitment directly, marking its nullifier.
    pub fn dev_add_identity_commitment(
        &mut self,
        token: &AdminToken,
        attestation_id: Field,
        nullifier: Field,
        commitment: Field,
    ) -> Result<RegistrationRecord> {
        self.check_admin(token)?;
        let timestamp = self.clock.now();
        let index = insert_mapped(&mut self.identity_tree, commitment, timestamp)?;
        self.nullifiers.insert((attestation_id, nullifier));
        let record = RegistrationRecord {
            attestation_id,
            nullifier,
            commitment,
            timestamp,
            root: self.identity_tree.root(),
            index,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    /// Replace an identity commitment, given a sibling path for the
    /// current root.
    pub fn dev_update_commitment(
        &mut self,
        token: &AdminToken,
        old_commitment: Field,
        new_commitment: Field,
        siblings: &[Field],
    ) -> Result<()> {
        self.check_admin(token)?;
        let timestamp = self.clock.now();
        self.identity_tree
            .update(old_commitment, new_commitment, siblings, timestamp)?;
        Ok(())
    }

    /// Zero out an identity commitment, given a sibling path for the
    /// current root.
    pub fn dev_remove_commitment(
        &mut self,
        token: &AdminToken,
        commitment: Field,
        siblings: &[Field],
    ) -> Result<()> {
        self.check_admin(token)?;
        let timestamp = self.clock.now();
        self.identity_tree.remove(commitment, siblings, timestamp)?;
        Ok(())
    }

    /// Force a nullifier's state.
    pub fn set_nullifier(
        &mut self,
        token: &AdminToken,
        attestation_id: Field,
        nullifier: Field,
        used: bool,
    ) -> Result<()> {
        self.check_admin(token)?;
        if used {
            self.nullifiers.insert((attestation_id, nullifier));
        } else {
            self.nullifiers.remove(&(attestation_id, nullifier));
        }
        Ok(())
    }

    /// Replace the three watchlist roots.
    pub fn update_watchlist_roots(&mut self, token: &AdminToken, roots: WatchlistRoots) -> Result<()> {
        self.check_admin(token)?;
        self.watchlist_roots = roots;
        info!(
            passport_no = %roots.passport_no,
            name_dob = %roots.name_dob,
            name_yob = %roots.name_yob,
            "watchlist roots updated"
        );
        Ok(())
    }

    /// Replace the root-authority root.
    pub fn update_root_authority_root(&mut self, token: &AdminToken, root: Field) -> Result<()> {
        self.check_admin(token)?;
        self.root_authority_root = Some(root);
        info!(root = %root, "root authority root updated");
        Ok(())
    }

    // -----------------------------------------------------------------

    fn active_root(&self) -> Result<Field> {
        self.root_authority_root.ok_or(RegistryError::NotInitialized)
    }

    fn check_admin(&self, token: &AdminToken) -> Result<()> {
        if token.id != self.admin_id {
            return Err(RegistryError::Unauthorized);
        }
        Ok(())
    }
}

/// Insert into a commitment tree, mapping duplicate leaves to the
/// registry's own error.
fn insert_mapped(tree: &mut CommitmentTree, leaf: Field, timestamp: u64) -> Result<usize> {
    match tree.insert(leaf, timestamp) {
        Ok(index) => Ok(index),
        Err(TreeError::DuplicateLeaf) => Err(RegistryError::DuplicateCommitment),
        Err(err) => Err(RegistryError::Tree(err)),
    }
}
