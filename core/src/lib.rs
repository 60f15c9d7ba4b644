//! # Secret-Provisioner
//!
//! Event-driven, idempotent secret provisioning for declarative
//! infrastructure stacks. Each lifecycle notification (Create, Update,
//! Delete of a declared resource) is processed to exactly one terminal
//! response: inbound `Encrypt_<Name>` plaintext fields are encrypted
//! through an external encryption service, and a pool of randomly
//! generated, encrypted passwords is persisted per logical resource so
//! that passwords already handed out survive retries and updates intact.
//!
//! The crate holds the core logic and two capability seams:
//!
//! - [`EncryptionGateway`](gateway::EncryptionGateway) - symmetric
//!   encrypt-by-key-id against an external service. Implementations in the
//!   `secret-provisioner-hashivault` (Vault transit) and
//!   `secret-provisioner-awskms` (AWS KMS) crates.
//! - [`SecretStore`](store::SecretStore) - durable namespaced key-value
//!   storage for persisted pools. [`MemoryStore`](store::MemoryStore) and
//!   [`FileStore`](store::FileStore) are built in; the hashivault crate
//!   adds a Vault KV v2 store.
//!
//! No cryptographic primitive is implemented here; encryption is invoked
//! as an opaque oracle and ciphertexts are never decrypted.
//!
//! ```no_run
//! use secret_provisioner::{
//!     event::LifecycleRequest, handler::LifecycleHandler, store::MemoryStore,
//! };
//! # use std::sync::Arc;
//! # async fn example(gateway: Arc<dyn secret_provisioner::gateway::EncryptionGateway>)
//! #     -> Result<(), secret_provisioner::error::Error> {
//! let handler = LifecycleHandler::new(gateway, Arc::new(MemoryStore::new()));
//! let event: LifecycleRequest = serde_json::from_str(r#"{
//!     "RequestType": "Create",
//!     "StackId": "stack-1",
//!     "RequestId": "req-1",
//!     "LogicalResourceId": "AppSecrets",
//!     "ResourceProperties": { "KeyId": "alias/app", "Encrypt_Admin": "hunter2" }
//! }"#)?;
//! let response = handler.handle(&event).await?;
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod error;
pub mod event;
pub mod gateway;
pub mod handler;
pub mod password;
pub mod pool;
pub mod store;

pub use dispatch::ResponseDispatcher;
pub use event::{Action, LifecycleRequest, LifecycleResponse, Status};
pub use gateway::EncryptionGateway;
pub use handler::LifecycleHandler;
pub use pool::{PoolReconciler, MAX_POOL_SIZE};
pub use store::SecretStore;
