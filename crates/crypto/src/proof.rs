//! The consumed proof-verification capability.
//!
//! Proving and verifying are external to this system: the registry only
//! needs a `verify(proof, public_signals) -> bool` capability per circuit,
//! looked up by a verifier id and failing closed when absent. A Groth16
//! adapter over arkworks is provided for deployments that hold verifying
//! keys locally, plus a deterministic mock for tests.

use std::collections::HashMap;
use std::fmt;

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::PrimeField;
use ark_groth16::{prepare_verifying_key, Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_serialize::CanonicalDeserialize;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use crate::error::{CryptoError, Result};
use veripass_core::Field;

/// A Groth16 proof in wire form: decimal base-field coordinate strings, the
/// layout proof transcripts are exchanged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    pub a: [String; 2],
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
}

/// Signature family of a verifier circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureKind {
    Rsa,
    RsaPss,
    Ecdsa,
}

/// Hash family of a verifier circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashKind {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

/// One (signature, hash, key-size) circuit instantiation.
///
/// `key_bits` is the RSA modulus size or the ECDSA curve size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemeId {
    pub signature: SignatureKind,
    pub hash: HashKind,
    pub key_bits: u16,
}

/// Identifies one deployed verifier circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerifierId {
    /// Identity-registration circuit for a scheme.
    Register(SchemeId),
    /// Issuer-key-registration circuit for a scheme.
    IssuerKey(SchemeId),
    /// The selective-disclosure circuit.
    VcAndDisclose,
}

impl fmt::Display for VerifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifierId::Register(s) => write!(f, "register_{s}"),
            VerifierId::IssuerKey(s) => write!(f, "issuer_key_{s}"),
            VerifierId::VcAndDisclose => write!(f, "vc_and_disclose"),
        }
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = match self.signature {
            SignatureKind::Rsa => "rsa",
            SignatureKind::RsaPss => "rsapss",
            SignatureKind::Ecdsa => "ecdsa",
        };
        let hash = match self.hash {
            HashKind::Sha1 => "sha1",
            HashKind::Sha224 => "sha224",
            HashKind::Sha256 => "sha256",
            HashKind::Sha384 => "sha384",
            HashKind::Sha512 => "sha512",
        };
        write!(f, "{sig}_{hash}_{}", self.key_bits)
    }
}

/// Verification capability for one circuit.
pub trait ProofVerifier: Send + Sync {
    /// Check `proof` against `public_signals`. Malformed proofs verify
    /// false; this call never panics on attacker-controlled input.
    fn verify(&self, proof: &Groth16Proof, public_signals: &[Field]) -> bool;
}

/// Verifier lookup table, keyed by [`VerifierId`].
///
/// Lookup failure is surfaced to callers as `None` so the registry can fail
/// closed with its own error.
#[derive(Default)]
pub struct VerifierRegistry {
    verifiers: HashMap<VerifierId, Box<dyn ProofVerifier>>,
}

impl VerifierRegistry {
    pub fn new() -> Self {
        Self {
            verifiers: HashMap::new(),
        }
    }

    /// Install (or replace) the verifier for a circuit.
    pub fn register(&mut self, id: VerifierId, verifier: Box<dyn ProofVerifier>) {
        self.verifiers.insert(id, verifier);
    }

    pub fn contains(&self, id: VerifierId) -> bool {
        self.verifiers.contains_key(&id)
    }

    /// Verify a proof with the circuit's verifier, or `None` if no verifier
    /// is installed for `id`.
    pub fn verify(&self, id: VerifierId, proof: &Groth16Proof, public_signals: &[Field]) -> Option<bool> {
        self.verifiers
            .get(&id)
            .map(|verifier| verifier.verify(proof, public_signals))
    }
}

impl fmt::Debug for VerifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierRegistry")
            .field("circuits", &self.verifiers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Groth16 verification over BN254 via arkworks.
pub struct Groth16Verifier {
    pvk: PreparedVerifyingKey<Bn254>,
}

impl Groth16Verifier {
    pub fn new(vk: VerifyingKey<Bn254>) -> Self {
        Self {
            pvk: prepare_verifying_key(&vk),
        }
    }

    /// Load a compressed arkworks-serialized verifying key.
    pub fn from_vk_bytes(bytes: &[u8]) -> Result<Self> {
        let vk = VerifyingKey::<Bn254>::deserialize_compressed(bytes)
            .map_err(|err| CryptoError::MalformedProof(format!("verifying key: {err}")))?;
        Ok(Self::new(vk))
    }

    fn decode_proof(proof: &Groth16Proof) -> Result<Proof<Bn254>> {
        let a = decode_g1(&proof.a)?;
        let b = decode_g2(&proof.b)?;
        let c = decode_g1(&proof.c)?;
        Ok(Proof { a, b, c })
    }
}

impl ProofVerifier for Groth16Verifier {
    fn verify(&self, proof: &Groth16Proof, public_signals: &[Field]) -> bool {
        let decoded = match Self::decode_proof(proof) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(%err, "rejecting malformed proof");
                return false;
            }
        };
        let inputs: Vec<Fr> = public_signals.iter().map(|signal| (*signal).into()).collect();
        Groth16::<Bn254>::verify_proof(&self.pvk, &decoded, &inputs).unwrap_or(false)
    }
}

fn parse_fq(s: &str) -> Result<Fq> {
    let value = BigUint::from_str(s.trim())
        .map_err(|_| CryptoError::MalformedProof(format!("not a decimal coordinate: {s:?}")))?;
    let modulus: BigUint = Fq::MODULUS.into();
    if value >= modulus {
        return Err(CryptoError::MalformedProof(format!(
            "coordinate {value} exceeds the base field"
        )));
    }
    Ok(Fq::from(value))
}

fn decode_g1(coords: &[String; 2]) -> Result<G1Affine> {
    let point = G1Affine::new_unchecked(parse_fq(&coords[0])?, parse_fq(&coords[1])?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(CryptoError::MalformedProof("G1 point not on curve".to_string()));
    }
    Ok(point)
}

fn decode_g2(coords: &[[String; 2]; 2]) -> Result<G2Affine> {
    let x = Fq2::new(parse_fq(&coords[0][0])?, parse_fq(&coords[0][1])?);
    let y = Fq2::new(parse_fq(&coords[1][0])?, parse_fq(&coords[1][1])?);
    let point = G2Affine::new_unchecked(x, y);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(CryptoError::MalformedProof("G2 point not on curve".to_string()));
    }
    Ok(point)
}

/// Deterministic verifier double for tests: accepts or rejects everything,
/// optionally pinned to an expected signal count.
pub struct MockProofVerifier {
    accept: bool,
    expected_signals: Option<usize>,
}

impl MockProofVerifier {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            expected_signals: None,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: false,
            expected_signals: None,
        }
    }

    /// Accept only transcripts carrying exactly `count` public signals.
    pub fn accepting_with_signal_count(count: usize) -> Self {
        Self {
            accept: true,
            expected_signals: Some(count),
        }
    }
}

impl ProofVerifier for MockProofVerifier {
    fn verify(&self, _proof: &Groth16Proof, public_signals: &[Field]) -> bool {
        if let Some(expected) = self.expected_signals {
            if public_signals.len() != expected {
                return false;
            }
        }
        self.accept
    }
}

impl Groth16Proof {
    /// A structurally valid placeholder transcript for tests.
    pub fn placeholder() -> Self {
        Self {
            a: ["0".to_string(), "0".to_string()],
            b: [
                ["0".to_string(), "0".to_string()],
                ["0".to_string(), "0".to_string()],
            ],
            c: ["0".to_string(), "0".to_string()],
        }
    }
}
