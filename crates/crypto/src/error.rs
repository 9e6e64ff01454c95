//! Error types for cryptographic encoding and verification.

use thiserror::Error;

/// Result type for crypto operations
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Error types for crypto operations
#[derive(Error, Debug, Clone)]
pub enum CryptoError {
    /// Value does not fit the requested limb vector
    #[error("Encoding overflow: value needs {needed} bits but the vector holds {capacity}")]
    EncodingOverflow { needed: u64, capacity: u64 },

    /// Message exceeds the hash gadget's fixed buffer
    #[error("Message too long: padded length {padded} exceeds maximum {max}")]
    MessageTooLong { padded: usize, max: usize },

    /// Needle not present in haystack
    #[error("Subsequence not found")]
    SubsequenceNotFound,

    /// Hash computation error
    #[error("Hash error: {0}")]
    Hash(String),

    /// Proof or verifying-key bytes failed to decode
    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
