//! Reconciliation properties: idempotence, the fill rule, and the
//! create-race fallback.

use async_trait::async_trait;
use bytes::Bytes;
use secret_provisioner::error::{Error, Result};
use secret_provisioner::pool::{password_name, PoolReconciler, MAX_POOL_SIZE};
use secret_provisioner::store::{MemoryStore, SecretStore};
use secret_provisioner_test_util::{EchoGateway, FailingGateway, FailingStore};
use std::collections::BTreeMap;
use std::sync::Arc;

const KEY_ID: &str = "alias/test-key";
const POOL_KEY: &str = "stack-1_AppSecrets";
const NS: &str = "bucket-1";

#[tokio::test]
/// no store target means pool provisioning was not requested: nothing is
/// generated, encrypted, or stored
async fn no_namespace_is_noop() -> Result<(), Error> {
    let reconciler =
        PoolReconciler::new(Arc::new(FailingStore::new()), Arc::new(FailingGateway::new()));
    let result = reconciler.reconcile(None, POOL_KEY, KEY_ID, 0).await?;
    assert!(result.is_empty());
    Ok(())
}

#[tokio::test]
async fn first_call_generates_full_pool() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(EchoGateway::new());
    let reconciler = PoolReconciler::new(store.clone(), gateway.clone());

    let result = reconciler.reconcile(Some(NS), POOL_KEY, KEY_ID, 0).await?;
    // slots 1..=12 surfaced, slot 0 persisted but held back
    assert_eq!(result.len(), MAX_POOL_SIZE);
    for n in 1..=MAX_POOL_SIZE {
        assert!(result.contains_key(&password_name(n)));
    }
    assert!(!result.contains_key(&password_name(0)));
    assert_eq!(gateway.call_count(), MAX_POOL_SIZE + 1);

    // the persisted pool holds all 13 slots
    let raw = store.read(NS, POOL_KEY).await?;
    let persisted: BTreeMap<String, String> =
        serde_json::from_slice(&raw).map_err(|e| Error::SerializationError(e.to_string()))?;
    assert_eq!(persisted.len(), MAX_POOL_SIZE + 1);
    Ok(())
}

#[tokio::test]
/// reconciling twice returns identical ciphertexts with zero additional
/// encryptions
async fn second_call_is_idempotent() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(EchoGateway::new());
    let reconciler = PoolReconciler::new(store, gateway.clone());

    let first = reconciler.reconcile(Some(NS), POOL_KEY, KEY_ID, 0).await?;
    let calls_after_first = gateway.call_count();
    let second = reconciler.reconcile(Some(NS), POOL_KEY, KEY_ID, 0).await?;
    assert_eq!(first, second);
    assert_eq!(gateway.call_count(), calls_after_first);
    Ok(())
}

#[tokio::test]
/// directly-encrypted fields shorten the surfaced range but never change
/// slot identity
async fn fill_rule() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(EchoGateway::new());
    let reconciler = PoolReconciler::new(store, gateway);

    let full = reconciler.reconcile(Some(NS), POOL_KEY, KEY_ID, 0).await?;

    let partial = reconciler.reconcile(Some(NS), POOL_KEY, KEY_ID, 3).await?;
    assert_eq!(partial.len(), MAX_POOL_SIZE - 3);
    for n in 1..=MAX_POOL_SIZE - 3 {
        assert_eq!(partial.get(&password_name(n)), full.get(&password_name(n)));
    }
    assert!(!partial.contains_key(&password_name(MAX_POOL_SIZE - 2)));

    // every slot taken by direct fields -> nothing surfaced
    let none = reconciler.reconcile(Some(NS), POOL_KEY, KEY_ID, MAX_POOL_SIZE).await?;
    assert!(none.is_empty());
    // more taken than slots exist is saturating, not an underflow
    let over = reconciler
        .reconcile(Some(NS), POOL_KEY, KEY_ID, MAX_POOL_SIZE + 5)
        .await?;
    assert!(over.is_empty());
    Ok(())
}

/// Store double simulating a lost create race: the key doesn't exist at
/// check time, but another writer lands before our create.
struct ContestedStore {
    winner_pool: Vec<u8>,
}

#[async_trait]
impl SecretStore for ContestedStore {
    async fn exists(&self, _namespace: &str, _key: &str) -> Result<bool, Error> {
        Ok(false)
    }
    async fn read(&self, _namespace: &str, _key: &str) -> Result<Bytes, Error> {
        Ok(Bytes::copy_from_slice(&self.winner_pool))
    }
    async fn write(&self, _namespace: &str, _key: &str, _value: &[u8]) -> Result<(), Error> {
        Ok(())
    }
    async fn create(&self, _namespace: &str, key: &str, _value: &[u8]) -> Result<(), Error> {
        Err(Error::AlreadyExists(key.to_string()))
    }
}

#[tokio::test]
/// losing the create race discards the freshly generated pool and
/// surfaces the winner's passwords instead
async fn lost_race_reads_winner() -> Result<(), Error> {
    let mut winner = BTreeMap::new();
    for n in 0..=MAX_POOL_SIZE {
        winner.insert(password_name(n), format!("winner-ct-{}", n));
    }
    let store = Arc::new(ContestedStore {
        winner_pool: serde_json::to_vec(&winner)
            .map_err(|e| Error::SerializationError(e.to_string()))?,
    });
    let gateway = Arc::new(EchoGateway::new());
    let reconciler = PoolReconciler::new(store, gateway.clone());

    let result = reconciler.reconcile(Some(NS), POOL_KEY, KEY_ID, 0).await?;
    assert_eq!(
        result.get(&password_name(1)).map(String::as_str),
        Some("winner-ct-1")
    );
    assert_eq!(result.len(), MAX_POOL_SIZE);
    // this side still generated before losing; that work is discarded
    assert_eq!(gateway.call_count(), MAX_POOL_SIZE + 1);
    Ok(())
}

#[tokio::test]
async fn gateway_failure_propagates() {
    let store = Arc::new(MemoryStore::new());
    let reconciler = PoolReconciler::new(store, Arc::new(FailingGateway::new()));
    let result = reconciler.reconcile(Some(NS), POOL_KEY, KEY_ID, 0).await;
    assert!(matches!(result, Err(Error::Encryption(_))));
}
