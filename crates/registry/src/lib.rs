//! The VeriPass identity registry and disclosure verifier.
//!
//! This crate holds the stateful heart of the system:
//!
//! - [`IdentityRegistry`]: the append-only ledger of issuer-key and
//!   identity commitments, nullifier sets, watchlist roots and the
//!   root-authority root, mutated only through proof-checked registration
//!   (plus an owner-gated administrative path)
//! - [`DisclosureVerifier`]: the stateless, read-only orchestrator that
//!   checks a holder's selective-disclosure proof against the registry and
//!   a caller policy, returning typed revealed attributes
//! - Typed public-signal decoding for the three circuits, so registry
//!   logic never indexes raw signal arrays
//!
//! Proof verification itself is a consumed capability (see
//! `veripass-crypto`); the registry fails closed when a circuit has no
//! installed verifier.

pub mod attributes;
pub mod clock;
pub mod disclose;
pub mod error;
pub mod registry;
pub mod signals;

#[cfg(test)]
pub(crate) mod test_support;

pub use attributes::{decode_revealed_attributes, RevealedAttributes};
pub use clock::{Clock, FixedClock, SystemClock};
pub use disclose::{
    proof_date_to_unix, start_of_day, unix_to_proof_date, DisclosureCode, DisclosureOutcome,
    DisclosurePolicy, DisclosureVerifier,
};
pub use error::{RegistryError, Result};
pub use registry::{
    AdminToken, IdentityRegistry, RegistrationRecord, WatchlistRoots,
};
pub use signals::{
    DiscloseSignals, DisclosureProof, IssuerKeyProof, IssuerKeySignals, RegisterProof,
    RegisterSignals,
};
