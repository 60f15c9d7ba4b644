//! Hashicorp Vault providers for secret-provisioner.
//!
//! - [`VaultGateway`] implements the encryption gateway over Vault's
//!   `transit` engine: plaintext is sent base64-encoded and the returned
//!   `vault:v1:...` token is the opaque ciphertext.
//! - [`VaultStore`] implements the pool store over Vault's KV v2 engine.
//!   Conditional create uses the engine's check-and-set (`cas: 0`), which
//!   the server rejects when a version already exists, so concurrent pool
//!   creators race safely.
//!
//! Configuration comes from the environment: `VAULT_ADDR` (default
//! `http://127.0.0.1:8200`) and `VAULT_TOKEN` (required).

mod hashivault;
pub mod vault_client;

pub use hashivault::{VaultGateway, VaultStore};
