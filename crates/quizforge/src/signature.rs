//! Content fingerprints for uploads.
//!
//! A [`Signature`] is the SHA-256 digest of an upload's display name and
//! its exact byte content, hex encoded. It keys the prewarm cache and the
//! generation queue's duplicate check. Signatures are recomputed on demand
//! and never persisted beyond the session.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic fingerprint of an upload's (name, bytes) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Computes the signature of an upload.
    ///
    /// The name and content are hashed with a NUL separator so that
    /// ("ab", b"c") and ("a", b"bc") cannot collide.
    pub fn compute(name: &str, content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(content);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
