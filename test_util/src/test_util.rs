//! Test doubles and event builders shared by secret-provisioner and its
//! provider crates. Nothing here is cryptography: the "ciphertexts" are
//! deterministic encodings so tests can predict outputs exactly.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use secret_provisioner::{
    error::{Error, Result},
    event::{Action, LifecycleRequest, ResourceProperties},
    gateway::EncryptionGateway,
    store::SecretStore,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic, reversible stand-in for an encryption service.
/// The ciphertext is base64 of `<key_id>:<plaintext>`, predictable via
/// [`EchoGateway::expected`], and every call is counted so tests can
/// assert how many encryptions an operation performed.
#[derive(Debug, Default)]
pub struct EchoGateway {
    calls: AtomicUsize,
}

impl EchoGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of encrypt calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The ciphertext this gateway produces for the given inputs
    pub fn expected(key_id: &str, plaintext: &str) -> String {
        STANDARD.encode(format!("{}:{}", key_id, plaintext))
    }
}

#[async_trait]
impl EncryptionGateway for EchoGateway {
    async fn encrypt(&self, key_id: &str, plaintext: &str) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::expected(key_id, plaintext))
    }
}

/// Gateway that fails every call, for exercising FAILED response paths
#[derive(Debug, Default)]
pub struct FailingGateway {}

impl FailingGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EncryptionGateway for FailingGateway {
    async fn encrypt(&self, _key_id: &str, _plaintext: &str) -> Result<String, Error> {
        Err(Error::Encryption("test gateway failure".to_string()))
    }
}

/// Store that fails every operation. Also useful to prove a code path
/// never touches the store at all.
#[derive(Debug, Default)]
pub struct FailingStore {}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for FailingStore {
    async fn exists(&self, _namespace: &str, _key: &str) -> Result<bool, Error> {
        Err(Error::Store("test store failure".to_string()))
    }
    async fn read(&self, _namespace: &str, _key: &str) -> Result<Bytes, Error> {
        Err(Error::Store("test store failure".to_string()))
    }
    async fn write(&self, _namespace: &str, _key: &str, _value: &[u8]) -> Result<(), Error> {
        Err(Error::Store("test store failure".to_string()))
    }
    async fn create(&self, _namespace: &str, _key: &str, _value: &[u8]) -> Result<(), Error> {
        Err(Error::Store("test store failure".to_string()))
    }
}

/// Build a lifecycle request with fixed ids and the given properties.
/// `KeyId` and `BucketName` route to their typed fields; everything else
/// (notably `Encrypt_<Name>` entries) lands in the flattened extras.
pub fn lifecycle_event(action: Action, properties: &[(&str, &str)]) -> LifecycleRequest {
    let mut props = ResourceProperties::default();
    let mut extra = BTreeMap::new();
    for (key, value) in properties {
        match *key {
            "KeyId" => props.key_id = Some(value.to_string()),
            "BucketName" => props.bucket_name = Some(value.to_string()),
            _ => {
                extra.insert(key.to_string(), value.to_string());
            }
        }
    }
    props.extra = extra;
    LifecycleRequest {
        action,
        stack_id: "arn:test:stack/demo/1".to_string(),
        request_id: "req-0001".to_string(),
        logical_resource_id: "AppSecrets".to_string(),
        physical_resource_id: None,
        response_url: None,
        resource_properties: props,
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[tokio::test]
    async fn echo_gateway_is_deterministic_and_counts() {
        let gateway = EchoGateway::new();
        let a = gateway.encrypt("k1", "secret").await.expect("encrypt");
        let b = gateway.encrypt("k1", "secret").await.expect("encrypt");
        assert_eq!(a, b);
        assert_eq!(a, EchoGateway::expected("k1", "secret"));
        assert_eq!(gateway.call_count(), 2);
    }

    #[test]
    fn event_builder_routes_properties() {
        let event = lifecycle_event(
            Action::Create,
            &[("KeyId", "k1"), ("BucketName", "b1"), ("Encrypt_Foo", "v")],
        );
        assert_eq!(event.resource_properties.key_id.as_deref(), Some("k1"));
        assert_eq!(event.resource_properties.bucket_name.as_deref(), Some("b1"));
        assert_eq!(
            event.resource_properties.extra.get("Encrypt_Foo").map(String::as_str),
            Some("v")
        );
        assert!(event.response_url.is_none());
    }
}
