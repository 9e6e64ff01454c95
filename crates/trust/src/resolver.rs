//! Signature-scheme resolution by ordered trial verification.
//!
//! Some issuing authorities omit or misstate the signature parameters in
//! their certificates (PSS salt lengths especially), so the only reliable
//! classification is to try candidate schemes against the issuer's key
//! until one verifies. The candidate order is fixed: it affects how fast a
//! match is found, never which scheme matches, and tests pin it so results
//! stay reproducible.

use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use signature::hazmat::PrehashVerifier;
use tracing::debug;

use crate::certificate::{Certificate, PublicKey};
use crate::error::{Result, TrustError};
use crate::scheme::{EcCurve, HashAlgo, SignatureScheme};

/// Hash algorithms tried, strongest first.
pub const HASH_CANDIDATES: [HashAlgo; 5] = [
    HashAlgo::Sha512,
    HashAlgo::Sha384,
    HashAlgo::Sha256,
    HashAlgo::Sha224,
    HashAlgo::Sha1,
];

/// PSS salt lengths observed in the certificate population.
pub const PSS_SALT_CANDIDATES: [usize; 3] = [64, 48, 32];

/// The ordered list of schemes to try for an issuer key.
///
/// RSA keys try PKCS#1 v1.5 across every hash before any PSS combination:
/// a PSS signature can ride on a plain RSA key, so both families are
/// candidates for the same key. EC keys try ECDSA across the hash list.
pub fn candidate_schemes(issuer_key: &PublicKey) -> Vec<SignatureScheme> {
    match issuer_key {
        PublicKey::Rsa { .. } => {
            let mut candidates: Vec<SignatureScheme> = HASH_CANDIDATES
                .iter()
                .map(|hash| SignatureScheme::Rsa { hash: *hash })
                .collect();
            for hash in HASH_CANDIDATES {
                for salt_len in PSS_SALT_CANDIDATES {
                    candidates.push(SignatureScheme::RsaPss { hash, salt_len });
                }
            }
            candidates
        }
        PublicKey::Ecdsa { curve, .. } => HASH_CANDIDATES
            .iter()
            .map(|hash| SignatureScheme::Ecdsa {
                hash: *hash,
                curve: *curve,
            })
            .collect(),
    }
}

/// Resolve the scheme that signed `subject` by trying every candidate
/// against `issuer`'s key, returning the first that verifies.
pub fn resolve_against_issuer(
    subject: &Certificate,
    issuer: &Certificate,
) -> Result<SignatureScheme> {
    candidate_schemes(&issuer.public_key)
        .into_iter()
        .find(|scheme| {
            let verified = verify_with_scheme(subject, issuer, scheme);
            debug!(%scheme, verified, subject = %subject.subject, "trial verification");
            verified
        })
        .ok_or(TrustError::SchemeNotFound)
}

/// Run one trial: digest the subject's TBS bytes with the scheme's hash and
/// verify the subject's signature under the issuer's key.
pub fn verify_with_scheme(
    subject: &Certificate,
    issuer: &Certificate,
    scheme: &SignatureScheme,
) -> bool {
    let digest = digest_tbs(&subject.tbs, scheme.hash());
    match (scheme, &issuer.public_key) {
        (SignatureScheme::Rsa { hash }, PublicKey::Rsa { modulus, exponent }) => {
            verify_rsa_pkcs1(modulus, exponent, *hash, &digest, &subject.signature)
        }
        (SignatureScheme::RsaPss { hash, salt_len }, PublicKey::Rsa { modulus, exponent }) => {
            verify_rsa_pss(modulus, exponent, *hash, *salt_len, &digest, &subject.signature)
        }
        (SignatureScheme::Ecdsa { curve, .. }, PublicKey::Ecdsa { point, .. }) => {
            verify_ecdsa(*curve, point, &digest, &subject.signature)
        }
        // Scheme family does not match the key type.
        _ => false,
    }
}

/// Digest TBS bytes with the named hash.
pub fn digest_tbs(tbs: &[u8], hash: HashAlgo) -> Vec<u8> {
    match hash {
        HashAlgo::Sha1 => Sha1::digest(tbs).to_vec(),
        HashAlgo::Sha224 => Sha224::digest(tbs).to_vec(),
        HashAlgo::Sha256 => Sha256::digest(tbs).to_vec(),
        HashAlgo::Sha384 => Sha384::digest(tbs).to_vec(),
        HashAlgo::Sha512 => Sha512::digest(tbs).to_vec(),
    }
}

fn rsa_key(modulus: &num_bigint::BigUint, exponent: &num_bigint::BigUint) -> Option<RsaPublicKey> {
    RsaPublicKey::new(
        rsa::BigUint::from_bytes_be(&modulus.to_bytes_be()),
        rsa::BigUint::from_bytes_be(&exponent.to_bytes_be()),
    )
    .ok()
}

fn verify_rsa_pkcs1(
    modulus: &num_bigint::BigUint,
    exponent: &num_bigint::BigUint,
    hash: HashAlgo,
    digest: &[u8],
    signature: &[u8],
) -> bool {
    let Some(key) = rsa_key(modulus, exponent) else {
        return false;
    };
    let padding = match hash {
        HashAlgo::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        HashAlgo::Sha224 => Pkcs1v15Sign::new::<Sha224>(),
        HashAlgo::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgo::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashAlgo::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    };
    key.verify(padding, digest, signature).is_ok()
}

fn verify_rsa_pss(
    modulus: &num_bigint::BigUint,
    exponent: &num_bigint::BigUint,
    hash: HashAlgo,
    salt_len: usize,
    digest: &[u8],
    signature: &[u8],
) -> bool {
    let Some(key) = rsa_key(modulus, exponent) else {
        return false;
    };
    let padding = match hash {
        HashAlgo::Sha1 => rsa::pss::Pss::new_with_salt::<Sha1>(salt_len),
        HashAlgo::Sha224 => rsa::pss::Pss::new_with_salt::<Sha224>(salt_len),
        HashAlgo::Sha256 => rsa::pss::Pss::new_with_salt::<Sha256>(salt_len),
        HashAlgo::Sha384 => rsa::pss::Pss::new_with_salt::<Sha384>(salt_len),
        HashAlgo::Sha512 => rsa::pss::Pss::new_with_salt::<Sha512>(salt_len),
    };
    key.verify(padding, digest, signature).is_ok()
}

fn verify_ecdsa(curve: EcCurve, point: &[u8], digest: &[u8], signature: &[u8]) -> bool {
    match curve {
        EcCurve::P256 => {
            let Ok(key) = p256::ecdsa::VerifyingKey::from_sec1_bytes(point) else {
                return false;
            };
            let Ok(sig) = p256::ecdsa::Signature::from_der(signature) else {
                return false;
            };
            key.verify_prehash(digest, &sig).is_ok()
        }
        EcCurve::P384 => {
            let Ok(key) = p384::ecdsa::VerifyingKey::from_sec1_bytes(point) else {
                return false;
            };
            let Ok(sig) = p384::ecdsa::Signature::from_der(signature) else {
                return false;
            };
            key.verify_prehash(digest, &sig).is_ok()
        }
    }
}
