//! In-memory store, used by tests and dry-run invocations

use crate::error::{Error, Result};
use crate::store::SecretStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Process-local [`SecretStore`]. Nothing survives process exit.
/// The map mutex is held across check-and-insert, so `create` is
/// genuinely atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn exists(&self, namespace: &str, key: &str) -> Result<bool, Error> {
        let entries = self.entries.lock().await;
        Ok(entries.contains_key(&(namespace.to_string(), key.to_string())))
    }

    async fn read(&self, namespace: &str, key: &str) -> Result<Bytes, Error> {
        let entries = self.entries.lock().await;
        entries
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    async fn write(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Error> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            (namespace.to_string(), key.to_string()),
            Bytes::copy_from_slice(value),
        );
        Ok(())
    }

    async fn create(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Error> {
        let mut entries = self.entries.lock().await;
        let entry = (namespace.to_string(), key.to_string());
        if entries.contains_key(&entry) {
            return Err(Error::AlreadyExists(key.to_string()));
        }
        entries.insert(entry, Bytes::copy_from_slice(value));
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::MemoryStore;
    use crate::store::contract::check_store_contract;

    #[tokio::test]
    async fn memory_store_contract() {
        let store = MemoryStore::new();
        check_store_contract(&store).await;
    }
}
