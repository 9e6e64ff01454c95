//! Error types for certificate trust resolution.

use thiserror::Error;
use veripass_crypto::CryptoError;

/// Result type for trust operations.
pub type Result<T> = std::result::Result<T, TrustError>;

/// Errors that can occur while resolving certificate trust.
#[derive(Debug, Error)]
pub enum TrustError {
    /// The certificate could not be decoded
    #[error("Certificate parse error: {0}")]
    CertificateParse(String),

    /// The certificate's curve is outside the supported population
    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// The certificate's key algorithm is neither RSA nor EC
    #[error("Unsupported public key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),

    /// The declared signature algorithm cannot be trusted as-is
    #[error("Ambiguous signature algorithm: {0}")]
    AmbiguousScheme(String),

    /// Trial verification exhausted every candidate scheme
    #[error("No signature scheme verified for the certificate pair")]
    SchemeNotFound,

    /// The signer's authority key identifier matched no trusted root
    #[error("No trusted issuer for key identifier {0}")]
    IssuerNotFound(String),

    /// The certificate carries no authority key identifier
    #[error("Certificate has no authority key identifier")]
    MissingAuthorityKeyId,

    /// Circuit-input encoding failure
    #[error("Encoding error: {0}")]
    Codec(#[from] CryptoError),
}
