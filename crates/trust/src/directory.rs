//! Trusted root directory.
//!
//! Maps subject-key-identifiers to trusted root certificates. The directory
//! is an explicit, immutable value injected into callers; dev mode adds an
//! overlay that is consulted before the production set, so test roots can
//! shadow real ones without touching process-global state.

use std::collections::HashMap;

use crate::certificate::Certificate;
use crate::error::{Result, TrustError};

/// Normalize a key identifier for lookup: lowercase hex with whitespace and
/// separator colons stripped.
pub fn normalize_key_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect::<String>()
        .to_lowercase()
}

/// A directory of trusted root certificates keyed by subject key
/// identifier.
#[derive(Debug, Clone, Default)]
pub struct TrustDirectory {
    production: HashMap<String, Certificate>,
    dev_overlay: HashMap<String, Certificate>,
    dev_mode: bool,
}

impl TrustDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the development overlay for every lookup on this directory.
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Add a production root. The key is taken from the certificate's own
    /// subject key identifier.
    pub fn insert(&mut self, root: Certificate) -> Result<()> {
        let ski = root
            .subject_key_id
            .clone()
            .ok_or_else(|| TrustError::CertificateParse("root has no subject key identifier".to_string()))?;
        self.production.insert(normalize_key_id(&ski), root);
        Ok(())
    }

    /// Add a development-only root to the overlay.
    pub fn insert_dev(&mut self, root: Certificate) -> Result<()> {
        let ski = root
            .subject_key_id
            .clone()
            .ok_or_else(|| TrustError::CertificateParse("root has no subject key identifier".to_string()))?;
        self.dev_overlay.insert(normalize_key_id(&ski), root);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.production.len()
    }

    pub fn is_empty(&self) -> bool {
        self.production.is_empty()
    }

    /// Look up a root by key identifier. In dev mode the overlay is
    /// consulted first, falling back to the production set.
    pub fn get(&self, key_id: &str) -> Option<&Certificate> {
        let key = normalize_key_id(key_id);
        if self.dev_mode {
            if let Some(root) = self.dev_overlay.get(&key) {
                return Some(root);
            }
        }
        self.production.get(&key)
    }
}

/// Find the trusted issuer of `subject` via its authority key identifier.
///
/// This is the sole mechanism binding a signer certificate to a root of
/// trust; a missing or unknown identifier is fatal for the certificate.
pub fn locate_issuer<'d>(
    subject: &Certificate,
    directory: &'d TrustDirectory,
) -> Result<&'d Certificate> {
    let aki = subject
        .authority_key_id
        .as_deref()
        .ok_or(TrustError::MissingAuthorityKeyId)?;
    directory
        .get(aki)
        .ok_or_else(|| TrustError::IssuerNotFound(normalize_key_id(aki)))
}
