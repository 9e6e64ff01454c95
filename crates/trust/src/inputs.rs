//! Circuit-input generation for issuer-key registration.
//!
//! The issuer-key circuit verifies, inside the proof, that the signer
//! certificate's TBS bytes hash and verify under the issuer's key, and that
//! the signer's public key appears verbatim inside those bytes. This module
//! prepares the witness data: block-padded TBS, word-encoded key and
//! signature material, and the embedded-key offset.

use veripass_core::Field;
use veripass_crypto::{
    locate_subsequence, pad_message, pad_message_wide, to_words, PaddedMessage, SchemeId,
    EC_LIMB_BITS, RSA_LIMB_BITS,
};

use crate::certificate::{extract_rs, Certificate, PublicKey};
use crate::error::Result;
use crate::scheme::SignatureScheme;

/// Fixed TBS buffer size of the issuer-key circuits, in bytes.
pub const MAX_TBS_BYTES: usize = 1664;

/// Witness data for one issuer-key registration proof.
#[derive(Debug, Clone)]
pub struct IssuerCircuitInputs {
    /// The resolved (signature, hash, key-size) triple, which selects the
    /// verifier circuit.
    pub scheme_id: SchemeId,
    /// Subject TBS bytes padded to the hash gadget's buffer.
    pub tbs_padded: PaddedMessage,
    /// Issuer public key as circuit limbs (modulus, or `x || y`).
    pub issuer_key_words: Vec<Field>,
    /// Signature as circuit limbs (RSA signature, or `r || s`).
    pub signature_words: Vec<Field>,
    /// Byte offset of the subject's public key inside the subject TBS.
    pub subject_key_offset: usize,
}

/// Build the issuer-key circuit inputs for a resolved certificate pair.
pub fn issuer_circuit_inputs(
    subject: &Certificate,
    issuer: &Certificate,
    scheme: &SignatureScheme,
) -> Result<IssuerCircuitInputs> {
    let tbs_padded = if scheme.hash().wide_padding() {
        pad_message_wide(&subject.tbs, MAX_TBS_BYTES)?
    } else {
        pad_message(&subject.tbs, MAX_TBS_BYTES)?
    };

    let (issuer_key_words, signature_words) = match &issuer.public_key {
        PublicKey::Rsa { modulus, .. } => {
            let limb_count = (modulus.bits() as usize).div_ceil(RSA_LIMB_BITS as usize);
            let key_words = to_words(modulus, RSA_LIMB_BITS, limb_count)?.as_fields();
            let signature = num_bigint::BigUint::from_bytes_be(&subject.signature);
            let sig_words = to_words(&signature, RSA_LIMB_BITS, limb_count)?.as_fields();
            (key_words, sig_words)
        }
        PublicKey::Ecdsa { curve, point } => {
            let limb_count = (curve.bits() as usize).div_ceil(EC_LIMB_BITS as usize);
            // Uncompressed SEC1 point: 0x04 || x || y.
            let coord_len = (curve.bits() as usize) / 8;
            let x = num_bigint::BigUint::from_bytes_be(&point[1..1 + coord_len]);
            let y = num_bigint::BigUint::from_bytes_be(&point[1 + coord_len..]);
            let mut key_words = to_words(&x, EC_LIMB_BITS, limb_count)?.as_fields();
            key_words.extend(to_words(&y, EC_LIMB_BITS, limb_count)?.as_fields());

            let (r, s) = extract_rs(&subject.signature)?;
            let mut sig_words = to_words(&r, EC_LIMB_BITS, limb_count)?.as_fields();
            sig_words.extend(to_words(&s, EC_LIMB_BITS, limb_count)?.as_fields());
            (key_words, sig_words)
        }
    };

    let subject_key_offset =
        locate_subsequence(&subject.tbs, &subject.public_key.embedded_bytes())?;

    Ok(IssuerCircuitInputs {
        scheme_id: scheme.scheme_id(issuer.key_bits()),
        tbs_padded,
        issuer_key_words,
        signature_words,
        subject_key_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_against_issuer;

    const CSCA_RSA: &str = include_str!("../testdata/csca_rsa.pem");
    const DSC_RSA: &str = include_str!("../testdata/dsc_rsa.pem");
    const CSCA_EC: &str = include_str!("../testdata/csca_ec.pem");
    const DSC_EC: &str = include_str!("../testdata/dsc_ec.pem");

    #[test]
    fn test_rsa_inputs_shape() {
        let issuer = Certificate::from_pem(CSCA_RSA).unwrap();
        let subject = Certificate::from_pem(DSC_RSA).unwrap();
        let scheme = resolve_against_issuer(&subject, &issuer).unwrap();
        let inputs = issuer_circuit_inputs(&subject, &issuer, &scheme).unwrap();

        // 2048-bit modulus at 120-bit limbs.
        assert_eq!(inputs.issuer_key_words.len(), 18);
        assert_eq!(inputs.signature_words.len(), 18);
        assert_eq!(inputs.tbs_padded.bytes.len(), MAX_TBS_BYTES);
        assert!(inputs.tbs_padded.padded_len % 64 == 0);
        assert_eq!(inputs.scheme_id.to_string(), "rsa_sha256_2048");
    }

    #[test]
    fn test_ec_inputs_shape() {
        let issuer = Certificate::from_pem(CSCA_EC).unwrap();
        let subject = Certificate::from_pem(DSC_EC).unwrap();
        let scheme = resolve_against_issuer(&subject, &issuer).unwrap();
        let inputs = issuer_circuit_inputs(&subject, &issuer, &scheme).unwrap();

        // P-256: four 64-bit limbs per coordinate, x and y.
        assert_eq!(inputs.issuer_key_words.len(), 8);
        assert_eq!(inputs.signature_words.len(), 8);
        // sha384 pads with the 1024-bit-block rule.
        assert!(inputs.tbs_padded.padded_len % 128 == 0);
        assert_eq!(inputs.scheme_id.to_string(), "ecdsa_sha384_256");
    }

    #[test]
    fn test_subject_key_offset_points_at_key() {
        let issuer = Certificate::from_pem(CSCA_RSA).unwrap();
        let subject = Certificate::from_pem(DSC_RSA).unwrap();
        let scheme = resolve_against_issuer(&subject, &issuer).unwrap();
        let inputs = issuer_circuit_inputs(&subject, &issuer, &scheme).unwrap();

        let key_bytes = subject.public_key.embedded_bytes();
        let offset = inputs.subject_key_offset;
        assert_eq!(&subject.tbs[offset..offset + key_bytes.len()], key_bytes.as_slice());
    }
}
