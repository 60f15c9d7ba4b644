//! Durable key-value store capability for persisted password pools.
//!
//! Values live in a flat (namespace, key) space. Two built-in
//! implementations are provided: [`MemoryStore`] for tests and dry runs,
//! and [`FileStore`] (with the default `fileio` feature) for local
//! persistence. Provider crates supply networked stores.

use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;

#[cfg(feature = "fileio")]
mod file;
mod memory;

#[cfg(feature = "fileio")]
pub use file::FileStore;
pub use memory::MemoryStore;

/// Durable namespaced key-value storage.
///
/// There is deliberately no delete operation: persisted pools outlive the
/// resources that created them, and cleanup is outside this system.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Whether the key exists in the namespace
    async fn exists(&self, namespace: &str, key: &str) -> Result<bool, Error>;

    /// Read the value for the key. Missing key -> [`Error::NotFound`]
    async fn read(&self, namespace: &str, key: &str) -> Result<Bytes, Error>;

    /// Unconditional overwrite (last writer wins)
    async fn write(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Error>;

    /// Conditional create: writes only if the key is absent, otherwise
    /// fails with [`Error::AlreadyExists`]. Implementations must make the
    /// check-and-write atomic so that concurrent creators race safely.
    async fn create(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Error>;
}
