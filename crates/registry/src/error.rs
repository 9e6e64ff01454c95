//! Error types for registry operations.

use thiserror::Error;
use veripass_tree::TreeError;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Rejection reasons for registry mutations.
///
/// Each variant is a distinct, user-visible rejection; none are retried
/// automatically. A caller may re-submit only after fixing the underlying
/// cause, e.g. regenerating a proof against the current root.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry has no root-authority root yet
    #[error("Registry is not initialized")]
    NotInitialized,

    /// No verifier is installed for the proof's circuit
    #[error("No verifier registered for circuit {0}")]
    NoVerifierForScheme(String),

    /// The issuer-key proof failed verification
    #[error("Invalid issuer proof")]
    InvalidIssuerProof,

    /// The identity-registration proof failed verification
    #[error("Invalid register proof")]
    InvalidRegisterProof,

    /// The accompanying issuer-key proof failed verification
    #[error("Invalid issuer key proof")]
    InvalidIssuerKeyProof,

    /// The two proofs' glue values differ
    #[error("Unequal glue between register and issuer-key proofs")]
    UnequalGlue,

    /// The proof's embedded root-authority root is stale
    #[error("Invalid root authority root")]
    InvalidRootAuthorityRoot,

    /// The (attestation, nullifier) pair was already registered
    #[error("Nullifier already used")]
    NullifierAlreadyUsed,

    /// The commitment leaf already exists
    #[error("Duplicate commitment")]
    DuplicateCommitment,

    /// The public-signal array does not match the circuit layout
    #[error("Malformed public signals: {0}")]
    MalformedSignals(String),

    /// A revealed attribute failed to decode
    #[error("Malformed attribute: {0}")]
    MalformedAttribute(String),

    /// The caller lacks the owner capability
    #[error("Admin capability required")]
    Unauthorized,

    /// Commitment-tree failure
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}
