//! Certificate trust resolution for VeriPass.
//!
//! A holder registers by proving their document was signed by a Document
//! Signer Certificate (DSC) that chains to a trusted country root (CSCA).
//! This crate establishes that chain outside the circuit:
//!
//! - **Certificate**: a minimal parsed view of the signer and root
//!   certificates (names, TBS bytes, signature, key, key identifiers)
//! - **Classification**: best-effort signature-scheme identification from
//!   the declared OID
//! - **Resolution**: ordered trial verification against the issuer key for
//!   the certificates whose declared parameters cannot be trusted
//! - **Directory**: the injected subject-key-identifier → trusted-root map,
//!   with a dev-mode overlay
//! - **Inputs**: witness preparation for the issuer-key registration
//!   circuit
//!
//! All functions are pure given their inputs; nothing here touches global
//! state or performs I/O.

pub mod certificate;
pub mod directory;
pub mod error;
pub mod inputs;
pub mod resolver;
pub mod scheme;

pub use certificate::{extract_rs, Certificate, PublicKey};
pub use directory::{locate_issuer, normalize_key_id, TrustDirectory};
pub use error::{Result, TrustError};
pub use inputs::{issuer_circuit_inputs, IssuerCircuitInputs, MAX_TBS_BYTES};
pub use resolver::{
    candidate_schemes, resolve_against_issuer, verify_with_scheme, HASH_CANDIDATES,
    PSS_SALT_CANDIDATES,
};
pub use scheme::{classify, EcCurve, HashAlgo, SignatureScheme};
