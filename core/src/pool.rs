//! Password pool reconciliation.
//!
//! A pool is the fixed-size set of generated-and-encrypted passwords
//! already allocated to one logical resource, persisted as a JSON map of
//! `Password<n>Encrypted` to ciphertext. Reconciliation guarantees that a
//! password handed out once is never regenerated or silently dropped,
//! however many times the orchestrator retries the same logical operation.

use crate::error::{Error, Result};
use crate::gateway::EncryptionGateway;
use crate::password::generate_password;
use crate::store::SecretStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Highest password slot surfaced to callers. The persisted pool holds
/// slots `0..=MAX_POOL_SIZE` (13 entries); slot 0 is reserved and never
/// surfaced.
pub const MAX_POOL_SIZE: usize = 12;

/// Output field name for the pool password at slot `n`
pub fn password_name(n: usize) -> String {
    format!("Password{}Encrypted", n)
}

/// The idempotency engine: decides which passwords are freshly generated,
/// which come from the persisted pool, and how many are surfaced.
pub struct PoolReconciler {
    store: Arc<dyn SecretStore>,
    gateway: Arc<dyn EncryptionGateway>,
}

impl PoolReconciler {
    pub fn new(store: Arc<dyn SecretStore>, gateway: Arc<dyn EncryptionGateway>) -> Self {
        PoolReconciler { store, gateway }
    }

    /// Produce the pool-derived entries for one invocation.
    ///
    /// `namespace` is the store target from the request; `None` means pool
    /// provisioning was not requested and the result is empty. `taken` is
    /// the number of directly-encrypted fields this invocation, which
    /// shortens the surfaced range: slots `1..=MAX_POOL_SIZE - taken`.
    /// Slot identity is stable across calls; only the number of surfaced
    /// trailing slots varies.
    pub async fn reconcile(
        &self,
        namespace: Option<&str>,
        pool_key: &str,
        key_id: &str,
        taken: usize,
    ) -> Result<BTreeMap<String, String>, Error> {
        let namespace = match namespace {
            Some(ns) => ns,
            None => return Ok(BTreeMap::new()),
        };

        let pool = if self.store.exists(namespace, pool_key).await? {
            debug!(pool_key, "loading existing password pool");
            self.load(namespace, pool_key).await?
        } else {
            match self.generate(namespace, pool_key, key_id).await {
                Ok(pool) => pool,
                // a concurrent invocation created the pool between our
                // existence check and create; its passwords are the ones
                // already handed out, so discard ours and read the winner's
                Err(Error::AlreadyExists(_)) => {
                    info!(pool_key, "pool created concurrently, reading winner");
                    self.load(namespace, pool_key).await?
                }
                Err(e) => return Err(e),
            }
        };

        let mut surfaced = BTreeMap::new();
        for n in 1..=MAX_POOL_SIZE.saturating_sub(taken) {
            let name = password_name(n);
            if let Some(ciphertext) = pool.get(&name) {
                surfaced.insert(name, ciphertext.clone());
            }
        }
        Ok(surfaced)
    }

    async fn load(&self, namespace: &str, pool_key: &str) -> Result<BTreeMap<String, String>, Error> {
        let raw = self.store.read(namespace, pool_key).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Generate, encrypt, and persist a full pool with a single conditional
    /// create, so at most one generation wins per logical resource.
    async fn generate(
        &self,
        namespace: &str,
        pool_key: &str,
        key_id: &str,
    ) -> Result<BTreeMap<String, String>, Error> {
        info!(pool_key, "generating password pool");
        let mut pool = BTreeMap::new();
        for n in 0..=MAX_POOL_SIZE {
            let password = generate_password()?;
            let ciphertext = self.gateway.encrypt(key_id, password.as_str()).await?;
            pool.insert(password_name(n), ciphertext);
        }
        let body = serde_json::to_vec(&pool)?;
        self.store.create(namespace, pool_key, &body).await?;
        Ok(pool)
    }
}

#[cfg(test)]
mod test {

    use super::password_name;

    #[test]
    fn slot_names() {
        assert_eq!(password_name(0), "Password0Encrypted");
        assert_eq!(password_name(12), "Password12Encrypted");
    }
}
