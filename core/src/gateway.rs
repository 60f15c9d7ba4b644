//! Encryption capability seam.
//!
//! The provisioner never implements a cryptographic primitive itself; all
//! encryption is delegated to an external service behind this trait.
//! Provider crates (hashivault, awskms) supply the implementations; tests
//! use deterministic doubles.

use crate::error::{Error, Result};
use async_trait::async_trait;

/// Symmetric encrypt-by-key-id against an external encryption service.
#[async_trait]
pub trait EncryptionGateway: Send + Sync {
    /// Encrypt plaintext under the named key.
    /// Returns an opaque printable ciphertext token (for KMS-style services
    /// this is base64 of the ciphertext blob; Vault transit tokens carry a
    /// `vault:v1:` prefix - callers treat both as opaque).
    /// The service is expected to be available; there is no retry or
    /// backoff at this layer and a failure aborts the invocation.
    async fn encrypt(&self, key_id: &str, plaintext: &str) -> Result<String, Error>;
}
