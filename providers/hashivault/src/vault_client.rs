// src/vault_client.rs
// async http api client for hashicorp vault

use http;
use reqwest;
use secret_provisioner::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// environment variable holding the vault api token
pub(crate) const VAULT_TOKEN: &str = "VAULT_TOKEN";
/// environment variable holding the vault address
pub(crate) const VAULT_ADDR: &str = "VAULT_ADDR";
/// fallback for VAULT_ADDR if not defined (without trailing slash)
pub(crate) const DEFAULT_VAULT_ADDR: &str = "http://127.0.0.1:8200";

/// url paths used in this api
pub(crate) const TRANSIT_ENCRYPT_URL: &str = "/v1/transit/encrypt/";
pub(crate) const KV_DATA_URL: &str = "/v1/secret/data/";

/// Connection settings for one vault server: base address plus api token
#[derive(Clone, Debug)]
pub struct ClientSpec {
    pub base_url: String,
    pub token: String,
}

impl ClientSpec {
    pub fn new(base_url: &str, token: &str) -> ClientSpec {
        ClientSpec {
            base_url: String::from(remove_trailing_slash(base_url)),
            token: String::from(token),
        }
    }

    /// Resolve connection settings from the environment:
    /// address from VAULT_ADDR (default http://127.0.0.1:8200),
    /// token from VAULT_TOKEN (required, must be non-empty).
    pub fn from_env() -> Result<ClientSpec, Error> {
        let base_url = env::var(VAULT_ADDR)
            .map(|s| String::from(remove_trailing_slash(&s)))
            .unwrap_or_else(|_| String::from(DEFAULT_VAULT_ADDR));
        let token = env::var(VAULT_TOKEN).unwrap_or_default();
        if token.is_empty() {
            return Err(Error::MissingEnv(String::from(VAULT_TOKEN)));
        }
        Ok(ClientSpec { base_url, token })
    }

    /// full url for the transit encrypt endpoint of the named key
    pub fn transit_encrypt_url(&self, key_name: &str) -> String {
        format!("{}{}{}", self.base_url, TRANSIT_ENCRYPT_URL, key_name)
    }

    /// full url for the kv v2 data endpoint of (namespace, key)
    pub fn kv_data_url(&self, namespace: &str, key: &str) -> String {
        format!("{}{}{}/{}", self.base_url, KV_DATA_URL, namespace, key)
    }
}

/// Structure used for Encrypt-Request
#[derive(Debug, Deserialize, Serialize)]
pub struct PlainData {
    pub plaintext: String,
}

/// Structure used for Encrypt-Response
#[derive(Debug, Deserialize, Serialize)]
pub struct CipherResp {
    pub data: CipherData,
}

/// Structure used for Encrypt-Response
#[derive(Debug, Deserialize, Serialize)]
pub struct CipherData {
    pub ciphertext: String,
}

/// kv v2 write request body
#[derive(Debug, Serialize)]
pub struct KvWriteReq {
    pub data: KvValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<KvOptions>,
}

/// kv v2 write options. `cas: 0` makes the write a conditional create:
/// the server rejects it when any version of the key already exists.
#[derive(Debug, Serialize)]
pub struct KvOptions {
    pub cas: u32,
}

/// stored value wrapper; bytes are carried base64-encoded
#[derive(Debug, Deserialize, Serialize)]
pub struct KvValue {
    pub value: String,
}

/// kv v2 read response body
#[derive(Debug, Deserialize)]
pub struct KvReadResp {
    pub data: KvReadData,
}

/// kv v2 read response inner data
#[derive(Debug, Deserialize)]
pub struct KvReadData {
    pub data: KvValue,
}

/// Create new vault http client for api requests with the given api token
pub fn new_client(token: &str) -> Result<reqwest::Client, Error> {
    let mut headers = reqwest::header::HeaderMap::new();
    let _ = headers.insert(
        "X-Vault-Token",
        http::HeaderValue::from_str(token)
            .map_err(|_| Error::InvalidParameter("invalid token string".to_string()))?,
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::OtherError(format!("vault client build error: {:?}", e)))
}

/// Send POST request to vault server, returning http response.
/// Returns error only on IO failure; the caller inspects the status
/// (kv conditional creates signal conflicts via status codes).
pub async fn post_raw<REQ>(
    client: &reqwest::Client,
    url: &str,
    body: &REQ,
) -> Result<reqwest::Response, Error>
where
    REQ: Serialize + std::fmt::Debug,
{
    client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| Error::Store(format!("Vault server IO error: {:?}", e)))
}

/// Send POST request to vault server and parse json response
/// Returns error if there are any IO errors OR if http status is not 2xx
pub async fn post_json<REQ, RESP>(
    client: &reqwest::Client,
    url: &str,
    body: &REQ,
) -> Result<RESP, Error>
where
    REQ: Serialize + std::fmt::Debug,
    RESP: for<'de> serde::de::Deserialize<'de>,
{
    let res = post_raw(client, url, body).await?;
    if !res.status().is_success() {
        return Err(Error::Encryption(format!(
            "Vault server api error: status {} url {}",
            res.status(),
            url
        )));
    }
    res.json::<RESP>().await.map_err(|e| {
        Error::Encryption(format!("Invalid json response from vault server: {:?}", e))
    })
}

/// Send GET request to vault server, returning http response.
/// Returns error only on IO failure; the caller inspects the status
/// (404 distinguishes absent keys).
pub async fn get_raw(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, Error> {
    client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Store(format!("Vault server IO error: {:?}", e)))
}

pub(crate) fn remove_trailing_slash(s: &str) -> &str {
    if let Some(stripped) = s.strip_suffix('/') {
        stripped
    } else {
        s
    }
}
