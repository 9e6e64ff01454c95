//! Typed views over circuit public-signal arrays.
//!
//! Proof transcripts arrive as flat field-element arrays indexed by the
//! versioned constant tables. Each circuit gets exactly one decode function
//! here; everything past this boundary operates on named fields only.

use serde::{Deserialize, Serialize};
use veripass_core::constants::{disclose_signals, issuer_key_signals, register_signals};
use veripass_core::Field;
use veripass_crypto::{Groth16Proof, VerifierId};

use crate::error::{RegistryError, Result};

/// An identity-registration proof as submitted: transcript plus raw public
/// signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterProof {
    pub verifier_id: VerifierId,
    pub proof: Groth16Proof,
    pub public_signals: Vec<Field>,
}

impl RegisterProof {
    pub fn signals(&self) -> Result<RegisterSignals> {
        RegisterSignals::decode(&self.public_signals)
    }
}

/// An issuer-key-registration proof as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerKeyProof {
    pub verifier_id: VerifierId,
    pub proof: Groth16Proof,
    pub public_signals: Vec<Field>,
}

impl IssuerKeyProof {
    pub fn signals(&self) -> Result<IssuerKeySignals> {
        IssuerKeySignals::decode(&self.public_signals)
    }
}

/// A selective-disclosure proof as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisclosureProof {
    pub proof: Groth16Proof,
    pub public_signals: Vec<Field>,
}

impl DisclosureProof {
    pub fn signals(&self) -> Result<DiscloseSignals> {
        DiscloseSignals::decode(&self.public_signals)
    }
}

/// Decoded identity-registration signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSignals {
    /// Blinded issuer commitment linking this proof to an issuer-key proof.
    pub glue: Field,
    pub nullifier: Field,
    pub commitment: Field,
    pub attestation_id: Field,
}

impl RegisterSignals {
    pub fn decode(signals: &[Field]) -> Result<Self> {
        expect_len(signals, register_signals::COUNT, "register")?;
        Ok(Self {
            glue: signals[register_signals::GLUE],
            nullifier: signals[register_signals::NULLIFIER],
            commitment: signals[register_signals::COMMITMENT],
            attestation_id: signals[register_signals::ATTESTATION_ID],
        })
    }
}

/// Decoded issuer-key-registration signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerKeySignals {
    /// Blinded issuer commitment linking this proof to a register proof.
    pub glue: Field,
    /// The CSCA commitment-tree root the proof was built against.
    pub root_authority_root: Field,
    pub key_commitment: Field,
}

impl IssuerKeySignals {
    pub fn decode(signals: &[Field]) -> Result<Self> {
        expect_len(signals, issuer_key_signals::COUNT, "issuer-key")?;
        Ok(Self {
            glue: signals[issuer_key_signals::GLUE],
            root_authority_root: signals[issuer_key_signals::ROOT_AUTHORITY_ROOT],
            key_commitment: signals[issuer_key_signals::KEY_COMMITMENT],
        })
    }
}

/// Decoded disclosure signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscloseSignals {
    pub revealed_data_packed: [Field; 3],
    pub forbidden_countries_packed: Field,
    pub nullifier: Field,
    pub attestation_id: Field,
    pub identity_root: Field,
    /// Proof-side current date, six YYMMDD digits.
    pub current_date: [u8; 6],
    pub passport_no_root: Field,
    pub name_dob_root: Field,
    pub name_yob_root: Field,
    pub scope: Field,
    pub user_identifier: Field,
}

impl DiscloseSignals {
    pub fn decode(signals: &[Field]) -> Result<Self> {
        expect_len(signals, disclose_signals::COUNT, "disclose")?;
        let mut current_date = [0u8; 6];
        for (i, digit) in current_date.iter_mut().enumerate() {
            let value = small_value(&signals[disclose_signals::CURRENT_DATE + i]).ok_or_else(|| {
                RegistryError::MalformedSignals("current-date signal is not a digit".to_string())
            })?;
            if value > 9 {
                return Err(RegistryError::MalformedSignals(format!(
                    "current-date digit out of range: {value}"
                )));
            }
            *digit = value as u8;
        }
        Ok(Self {
            revealed_data_packed: [
                signals[disclose_signals::REVEALED_DATA_PACKED],
                signals[disclose_signals::REVEALED_DATA_PACKED + 1],
                signals[disclose_signals::REVEALED_DATA_PACKED + 2],
            ],
            forbidden_countries_packed: signals[disclose_signals::FORBIDDEN_COUNTRIES_PACKED],
            nullifier: signals[disclose_signals::NULLIFIER],
            attestation_id: signals[disclose_signals::ATTESTATION_ID],
            identity_root: signals[disclose_signals::IDENTITY_ROOT],
            current_date,
            passport_no_root: signals[disclose_signals::PASSPORT_NO_WATCHLIST_ROOT],
            name_dob_root: signals[disclose_signals::NAME_DOB_WATCHLIST_ROOT],
            name_yob_root: signals[disclose_signals::NAME_YOB_WATCHLIST_ROOT],
            scope: signals[disclose_signals::SCOPE],
            user_identifier: signals[disclose_signals::USER_IDENTIFIER],
        })
    }

    /// Rebuild the wire array in circuit order.
    pub fn encode(&self) -> Vec<Field> {
        let mut signals = vec![Field::zero(); disclose_signals::COUNT];
        signals[disclose_signals::REVEALED_DATA_PACKED] = self.revealed_data_packed[0];
        signals[disclose_signals::REVEALED_DATA_PACKED + 1] = self.revealed_data_packed[1];
        signals[disclose_signals::REVEALED_DATA_PACKED + 2] = self.revealed_data_packed[2];
        signals[disclose_signals::FORBIDDEN_COUNTRIES_PACKED] = self.forbidden_countries_packed;
        signals[disclose_signals::NULLIFIER] = self.nullifier;
        signals[disclose_signals::ATTESTATION_ID] = self.attestation_id;
        signals[disclose_signals::IDENTITY_ROOT] = self.identity_root;
        for (i, digit) in self.current_date.iter().enumerate() {
            signals[disclose_signals::CURRENT_DATE + i] = Field::from_u64(*digit as u64);
        }
        signals[disclose_signals::PASSPORT_NO_WATCHLIST_ROOT] = self.passport_no_root;
        signals[disclose_signals::NAME_DOB_WATCHLIST_ROOT] = self.name_dob_root;
        signals[disclose_signals::NAME_YOB_WATCHLIST_ROOT] = self.name_yob_root;
        signals[disclose_signals::SCOPE] = self.scope;
        signals[disclose_signals::USER_IDENTIFIER] = self.user_identifier;
        signals
    }
}

fn expect_len(signals: &[Field], expected: usize, circuit: &str) -> Result<()> {
    if signals.len() != expected {
        return Err(RegistryError::MalformedSignals(format!(
            "{circuit} circuit expects {expected} public signals, got {}",
            signals.len()
        )));
    }
    Ok(())
}

fn small_value(field: &Field) -> Option<u64> {
    u64::try_from(field.to_biguint()).ok()
}
