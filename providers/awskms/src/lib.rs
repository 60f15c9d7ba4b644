//! AWS KMS encryption gateway for secret-provisioner.
//!
//! `key_id` may be a key id, key ARN, alias name, or alias ARN - whatever
//! the KMS `Encrypt` call accepts. The returned ciphertext is the KMS
//! ciphertext blob encoded standard base64, so responses carry a printable
//! token.
//!
//! Credentials and region come from the ambient AWS environment chain
//! (environment variables, profile, instance metadata) via `aws-config`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secret_provisioner::{
    error::{Error, Result},
    gateway::EncryptionGateway,
};
use tracing::debug;

/// Encryption gateway backed by AWS KMS
#[derive(Clone, Debug)]
pub struct KmsGateway {
    client: aws_sdk_kms::Client,
}

impl KmsGateway {
    pub fn new(client: aws_sdk_kms::Client) -> Self {
        KmsGateway { client }
    }

    /// Construct from the ambient AWS environment (region and credential
    /// provider chain)
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        KmsGateway {
            client: aws_sdk_kms::Client::new(&config),
        }
    }
}

#[async_trait]
impl EncryptionGateway for KmsGateway {
    async fn encrypt(&self, key_id: &str, plaintext: &str) -> Result<String, Error> {
        debug!(key_id, "kms encrypt");
        let out = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(aws_sdk_kms::primitives::Blob::new(plaintext.as_bytes()))
            .send()
            .await
            .map_err(|e| Error::Encryption(format!("kms encrypt failed: {}", e)))?;
        let blob = out
            .ciphertext_blob()
            .ok_or_else(|| Error::Encryption("kms response had no ciphertext blob".to_string()))?;
        Ok(STANDARD.encode(blob.as_ref()))
    }
}

#[cfg(test)]
mod tests {

    use super::KmsGateway;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use secret_provisioner::{
        error::{Error, Result},
        gateway::EncryptionGateway,
    };

    #[tokio::test]
    #[ignore] // needs AWS credentials and a key named by KMS_TEST_KEY_ID
    async fn live_kms_encrypt() -> Result<(), Error> {
        let key_id = std::env::var("KMS_TEST_KEY_ID")
            .map_err(|_| Error::MissingEnv("KMS_TEST_KEY_ID".to_string()))?;
        let gateway = KmsGateway::from_env().await;
        let ciphertext = gateway.encrypt(&key_id, "Your base are encrypted").await?;
        // printable base64 of a non-empty blob
        assert!(!ciphertext.is_empty());
        assert!(STANDARD.decode(&ciphertext).is_ok());
        Ok(())
    }
}
