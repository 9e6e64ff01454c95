//! Signature scheme classification.
//!
//! A certificate declares its signature algorithm as an OID, but issuing
//! authorities routinely omit or misstate the parameters (RSA-PSS in
//! particular), so classification from the OID is best-effort and the
//! resolver falls back to trial verification against the issuer key.

use serde::{Deserialize, Serialize};
use std::fmt;

use veripass_crypto::{HashKind, SchemeId, SignatureKind};

use crate::certificate::{Certificate, PublicKey};
use crate::error::{Result, TrustError};

/// Hash algorithms appearing in the certificate population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgo {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgo::Sha1 => "sha1",
            HashAlgo::Sha224 => "sha224",
            HashAlgo::Sha256 => "sha256",
            HashAlgo::Sha384 => "sha384",
            HashAlgo::Sha512 => "sha512",
        }
    }

    /// Whether the hash pads with the 1024-bit-block rule (SHA-384/512)
    /// instead of the 512-bit-block rule.
    pub fn wide_padding(&self) -> bool {
        matches!(self, HashAlgo::Sha384 | HashAlgo::Sha512)
    }

    pub fn to_kind(self) -> HashKind {
        match self {
            HashAlgo::Sha1 => HashKind::Sha1,
            HashAlgo::Sha224 => HashKind::Sha224,
            HashAlgo::Sha256 => HashKind::Sha256,
            HashAlgo::Sha384 => HashKind::Sha384,
            HashAlgo::Sha512 => HashKind::Sha512,
        }
    }
}

impl fmt::Display for HashAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elliptic curves in the supported certificate population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcCurve {
    P256,
    P384,
}

impl EcCurve {
    pub fn from_oid(oid: &str) -> Result<Self> {
        match oid {
            "1.2.840.10045.3.1.7" => Ok(EcCurve::P256),
            "1.3.132.0.34" => Ok(EcCurve::P384),
            other => Err(TrustError::UnsupportedCurve(other.to_string())),
        }
    }

    pub fn bits(&self) -> u16 {
        match self {
            EcCurve::P256 => 256,
            EcCurve::P384 => 384,
        }
    }
}

/// The exact signing scheme a certificate was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureScheme {
    Rsa { hash: HashAlgo },
    RsaPss { hash: HashAlgo, salt_len: usize },
    Ecdsa { hash: HashAlgo, curve: EcCurve },
}

impl SignatureScheme {
    pub fn hash(&self) -> HashAlgo {
        match self {
            SignatureScheme::Rsa { hash }
            | SignatureScheme::RsaPss { hash, .. }
            | SignatureScheme::Ecdsa { hash, .. } => *hash,
        }
    }

    /// The (signature, hash, key-size) triple identifying the verifier
    /// circuit for this scheme.
    pub fn scheme_id(&self, key_bits: u16) -> SchemeId {
        let signature = match self {
            SignatureScheme::Rsa { .. } => SignatureKind::Rsa,
            SignatureScheme::RsaPss { .. } => SignatureKind::RsaPss,
            SignatureScheme::Ecdsa { .. } => SignatureKind::Ecdsa,
        };
        SchemeId {
            signature,
            hash: self.hash().to_kind(),
            key_bits,
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureScheme::Rsa { hash } => write!(f, "rsa_{hash}"),
            SignatureScheme::RsaPss { hash, salt_len } => write!(f, "rsapss_{hash}_salt{salt_len}"),
            SignatureScheme::Ecdsa { hash, curve } => {
                let curve = match curve {
                    EcCurve::P256 => "p256",
                    EcCurve::P384 => "p384",
                };
                write!(f, "ecdsa_{hash}_{curve}")
            }
        }
    }
}

/// Classify a certificate's signing scheme from its declared OID alone.
///
/// RSA-PSS certificates are reported as [`TrustError::AmbiguousScheme`]
/// even though the OID is recognized: the parameter block is unreliable in
/// the wild and must be confirmed by trial verification. ECDSA OIDs encode
/// only the hash, so the curve is taken from the certificate's own key and
/// is likewise only trustworthy for self-signed roots.
pub fn classify(cert: &Certificate) -> Result<SignatureScheme> {
    let hash = match cert.signature_oid.as_str() {
        "1.2.840.113549.1.1.5" => return Ok(SignatureScheme::Rsa { hash: HashAlgo::Sha1 }),
        "1.2.840.113549.1.1.14" => return Ok(SignatureScheme::Rsa { hash: HashAlgo::Sha224 }),
        "1.2.840.113549.1.1.11" => return Ok(SignatureScheme::Rsa { hash: HashAlgo::Sha256 }),
        "1.2.840.113549.1.1.12" => return Ok(SignatureScheme::Rsa { hash: HashAlgo::Sha384 }),
        "1.2.840.113549.1.1.13" => return Ok(SignatureScheme::Rsa { hash: HashAlgo::Sha512 }),
        "1.2.840.113549.1.1.10" => {
            return Err(TrustError::AmbiguousScheme(
                "RSASSA-PSS parameters are unreliable, resolve against the issuer".to_string(),
            ))
        }
        "1.2.840.10045.4.1" => HashAlgo::Sha1,
        "1.2.840.10045.4.3.1" => HashAlgo::Sha224,
        "1.2.840.10045.4.3.2" => HashAlgo::Sha256,
        "1.2.840.10045.4.3.3" => HashAlgo::Sha384,
        "1.2.840.10045.4.3.4" => HashAlgo::Sha512,
        other => {
            return Err(TrustError::AmbiguousScheme(format!(
                "unrecognized signature algorithm OID {other}"
            )))
        }
    };
    // ECDSA: the OID names the hash; the curve must come from a key.
    match &cert.public_key {
        PublicKey::Ecdsa { curve, .. } => Ok(SignatureScheme::Ecdsa { hash, curve: *curve }),
        PublicKey::Rsa { .. } => Err(TrustError::AmbiguousScheme(
            "ECDSA signature on an RSA-keyed certificate, resolve against the issuer".to_string(),
        )),
    }
}
