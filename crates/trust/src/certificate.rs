//! Parsed certificate values.
//!
//! This is not a general X.509 library: it extracts exactly what trust
//! resolution and circuit-input generation need (names, raw TBS bytes,
//! signature, declared algorithm, public key, key identifiers) and keeps
//! the result immutable.

use num_bigint::BigUint;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

use crate::error::{Result, TrustError};
use crate::scheme::EcCurve;

/// A signer's public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa { modulus: BigUint, exponent: BigUint },
    Ecdsa { curve: EcCurve, point: Vec<u8> },
}

impl PublicKey {
    /// The raw bytes of the key as they appear embedded in DER: the
    /// big-endian modulus for RSA, the SEC1 point for EC. Used for the
    /// circuit's verbatim-inclusion constraint.
    pub fn embedded_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Rsa { modulus, .. } => modulus.to_bytes_be(),
            PublicKey::Ecdsa { point, .. } => point.clone(),
        }
    }

    /// Key size: modulus bits for RSA, curve bits for EC.
    pub fn bits(&self) -> u16 {
        match self {
            PublicKey::Rsa { modulus, .. } => modulus.bits() as u16,
            PublicKey::Ecdsa { curve, .. } => curve.bits(),
        }
    }
}

/// An immutable, parsed certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// Subject distinguished name, rendered.
    pub subject: String,
    /// Issuer distinguished name, rendered.
    pub issuer: String,
    /// Raw DER of the to-be-signed portion.
    pub tbs: Vec<u8>,
    /// Signature bytes (raw for RSA, DER `(r,s)` for ECDSA).
    pub signature: Vec<u8>,
    /// Declared signature algorithm OID, dotted form.
    pub signature_oid: String,
    pub public_key: PublicKey,
    /// Subject key identifier, normalized lowercase hex.
    pub subject_key_id: Option<String>,
    /// Authority key identifier, normalized lowercase hex.
    pub authority_key_id: Option<String>,
}

impl Certificate {
    pub fn from_pem(pem: &str) -> Result<Self> {
        let (_, parsed) = parse_x509_pem(pem.as_bytes())
            .map_err(|err| TrustError::CertificateParse(format!("PEM: {err}")))?;
        Self::from_der(&parsed.contents)
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|err| TrustError::CertificateParse(format!("DER: {err}")))?;

        let public_key = parse_public_key(cert.public_key())?;

        let mut subject_key_id = None;
        let mut authority_key_id = None;
        for ext in cert.extensions() {
            match ext.parsed_extension() {
                ParsedExtension::SubjectKeyIdentifier(KeyIdentifier(bytes)) => {
                    subject_key_id = Some(hex::encode(bytes));
                }
                ParsedExtension::AuthorityKeyIdentifier(aki) => {
                    if let Some(KeyIdentifier(bytes)) = &aki.key_identifier {
                        authority_key_id = Some(hex::encode(bytes));
                    }
                }
                _ => {}
            }
        }

        Ok(Certificate {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            tbs: cert.tbs_certificate.as_ref().to_vec(),
            signature: cert.signature_value.data.to_vec(),
            signature_oid: cert.signature_algorithm.algorithm.to_id_string(),
            public_key,
            subject_key_id,
            authority_key_id,
        })
    }

    pub fn key_bits(&self) -> u16 {
        self.public_key.bits()
    }

    pub fn is_self_signed(&self) -> bool {
        self.subject == self.issuer
    }
}

fn parse_public_key(spki: &SubjectPublicKeyInfo<'_>) -> Result<PublicKey> {
    match spki.parsed() {
        Ok(x509_parser::public_key::PublicKey::RSA(rsa)) => Ok(PublicKey::Rsa {
            modulus: BigUint::from_bytes_be(rsa.modulus),
            exponent: BigUint::from_bytes_be(rsa.exponent),
        }),
        Ok(x509_parser::public_key::PublicKey::EC(ec)) => {
            let params = spki
                .algorithm
                .parameters
                .as_ref()
                .ok_or_else(|| TrustError::UnsupportedCurve("no curve parameters".to_string()))?;
            let curve_oid = params
                .as_oid()
                .map_err(|_| TrustError::UnsupportedCurve("non-OID curve parameters".to_string()))?;
            let curve = EcCurve::from_oid(&curve_oid.to_id_string())?;
            Ok(PublicKey::Ecdsa {
                curve,
                point: ec.data().to_vec(),
            })
        }
        Ok(_) | Err(_) => Err(TrustError::UnsupportedKeyAlgorithm(
            spki.algorithm.algorithm.to_id_string(),
        )),
    }
}

/// Split a DER-encoded ECDSA signature into its `(r, s)` integers.
pub fn extract_rs(der: &[u8]) -> Result<(BigUint, BigUint)> {
    let mut reader = DerReader { bytes: der, pos: 0 };
    reader.expect_tag(0x30)?;
    let _seq_len = reader.read_len()?;
    let r = reader.read_integer()?;
    let s = reader.read_integer()?;
    Ok((r, s))
}

struct DerReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl DerReader<'_> {
    fn next_byte(&mut self) -> Result<u8> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| TrustError::CertificateParse("truncated DER signature".to_string()))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect_tag(&mut self, tag: u8) -> Result<()> {
        let got = self.next_byte()?;
        if got != tag {
            return Err(TrustError::CertificateParse(format!(
                "expected DER tag {tag:#04x}, got {got:#04x}"
            )));
        }
        Ok(())
    }

    fn read_len(&mut self) -> Result<usize> {
        let first = self.next_byte()?;
        if first < 0x80 {
            return Ok(first as usize);
        }
        let count = (first & 0x7f) as usize;
        if count == 0 || count > 4 {
            return Err(TrustError::CertificateParse(
                "unsupported DER length encoding".to_string(),
            ));
        }
        let mut len = 0usize;
        for _ in 0..count {
            len = (len << 8) | self.next_byte()? as usize;
        }
        Ok(len)
    }

    fn read_integer(&mut self) -> Result<BigUint> {
        self.expect_tag(0x02)?;
        let len = self.read_len()?;
        let end = self.pos + len;
        if end > self.bytes.len() {
            return Err(TrustError::CertificateParse("truncated DER integer".to_string()));
        }
        let value = BigUint::from_bytes_be(&self.bytes[self.pos..end]);
        self.pos = end;
        Ok(value)
    }
}
