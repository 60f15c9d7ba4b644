//! Gateway and store implementations backed by a Hashicorp Vault server.

use crate::vault_client::{
    get_raw, new_client, post_json, post_raw, CipherResp, ClientSpec, KvOptions, KvReadResp,
    KvValue, KvWriteReq, PlainData,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::StatusCode;
use secret_provisioner::{
    error::{Error, Result},
    gateway::EncryptionGateway,
    store::SecretStore,
};
use tracing::debug;

/// Encryption gateway over Vault's transit engine. The `key_id` passed to
/// [`EncryptionGateway::encrypt`] names the transit key.
#[derive(Clone, Debug)]
pub struct VaultGateway {
    spec: ClientSpec,
    client: reqwest::Client,
}

impl VaultGateway {
    pub fn new(spec: ClientSpec) -> Result<Self, Error> {
        let client = new_client(&spec.token)?;
        Ok(VaultGateway { spec, client })
    }

    /// Construct from VAULT_ADDR / VAULT_TOKEN
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientSpec::from_env()?)
    }
}

#[async_trait]
impl EncryptionGateway for VaultGateway {
    /// Encrypt plaintext with the named transit key. The plaintext never
    /// leaves this process unencoded; the key never leaves the vault.
    /// Returns the transit ciphertext token ("vault:v1:...").
    async fn encrypt(&self, key_id: &str, plaintext: &str) -> Result<String, Error> {
        debug!(key_id, "vault transit encrypt");
        let res: CipherResp = post_json(
            &self.client,
            &self.spec.transit_encrypt_url(key_id),
            &PlainData {
                plaintext: STANDARD.encode(plaintext),
            },
        )
        .await?;
        Ok(res.data.ciphertext)
    }
}

/// Pool store over Vault's KV v2 engine. Values are kept base64-encoded
/// under `secret/data/<namespace>/<key>`.
#[derive(Clone, Debug)]
pub struct VaultStore {
    spec: ClientSpec,
    client: reqwest::Client,
}

impl VaultStore {
    pub fn new(spec: ClientSpec) -> Result<Self, Error> {
        let client = new_client(&spec.token)?;
        Ok(VaultStore { spec, client })
    }

    /// Construct from VAULT_ADDR / VAULT_TOKEN
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientSpec::from_env()?)
    }

    async fn put(
        &self,
        namespace: &str,
        key: &str,
        value: &[u8],
        options: Option<KvOptions>,
    ) -> Result<reqwest::Response, Error> {
        let body = KvWriteReq {
            data: KvValue {
                value: STANDARD.encode(value),
            },
            options,
        };
        post_raw(&self.client, &self.spec.kv_data_url(namespace, key), &body).await
    }
}

#[async_trait]
impl SecretStore for VaultStore {
    async fn exists(&self, namespace: &str, key: &str) -> Result<bool, Error> {
        let res = get_raw(&self.client, &self.spec.kv_data_url(namespace, key)).await?;
        match res.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(Error::Store(format!(
                "vault kv read failed with status {}",
                status
            ))),
        }
    }

    async fn read(&self, namespace: &str, key: &str) -> Result<Bytes, Error> {
        let res = get_raw(&self.client, &self.spec.kv_data_url(namespace, key)).await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(key.to_string()));
        }
        if !res.status().is_success() {
            return Err(Error::Store(format!(
                "vault kv read failed with status {}",
                res.status()
            )));
        }
        let body: KvReadResp = res
            .json()
            .await
            .map_err(|e| Error::Store(format!("invalid kv response: {:?}", e)))?;
        let raw = STANDARD
            .decode(body.data.data.value)
            .map_err(|_| Error::Store("kv value had invalid base64".to_string()))?;
        Ok(Bytes::from(raw))
    }

    async fn write(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Error> {
        let res = self.put(namespace, key, value, None).await?;
        if !res.status().is_success() {
            return Err(Error::Store(format!(
                "vault kv write failed with status {}",
                res.status()
            )));
        }
        Ok(())
    }

    async fn create(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Error> {
        // cas 0 = write only if no version exists; the server answers 400
        // when a concurrent writer already created the key
        let res = self.put(namespace, key, value, Some(KvOptions { cas: 0 })).await?;
        match res.status() {
            StatusCode::BAD_REQUEST => Err(Error::AlreadyExists(key.to_string())),
            status if status.is_success() => Ok(()),
            status => Err(Error::Store(format!(
                "vault kv create failed with status {}",
                status
            ))),
        }
    }
}
