//! Lifecycle event orchestration.
//!
//! One handler invocation processes one event to exactly one terminal
//! response. The provisioning step returns a typed result which is
//! converted to the response envelope at a single point; the response is
//! then dispatched regardless of which branch produced it.

use crate::dispatch::ResponseDispatcher;
use crate::error::{Error, Result};
use crate::event::{Action, LifecycleRequest, LifecycleResponse, Status};
use crate::gateway::EncryptionGateway;
use crate::pool::PoolReconciler;
use crate::store::SecretStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

/// Reason reported on the success path
pub const REASON_SUCCESS: &str = "The value was successfully encrypted";
/// Reason reported when the request carries no usable KeyId
pub const REASON_MISSING_KEY_ID: &str = "KeyId not present";
/// Generic reason for internal failures. Details stay in the service logs;
/// the response channel may be echoed back to callers and must not leak
/// sensitive context.
pub const REASON_INTERNAL: &str =
    "Encryption failed - see the provisioner service logs for details";

/// Orchestrates one lifecycle event end to end.
pub struct LifecycleHandler {
    gateway: Arc<dyn EncryptionGateway>,
    reconciler: PoolReconciler,
    dispatcher: ResponseDispatcher,
}

impl LifecycleHandler {
    pub fn new(gateway: Arc<dyn EncryptionGateway>, store: Arc<dyn SecretStore>) -> Self {
        LifecycleHandler {
            reconciler: PoolReconciler::new(store, gateway.clone()),
            gateway,
            dispatcher: ResponseDispatcher::new(),
        }
    }

    /// Process one event to a terminal response, dispatching it to the
    /// callback url when the event carries one. The returned response is
    /// the one dispatched. Only a dispatch failure escapes as an error;
    /// every provisioning failure is folded into a FAILED response.
    pub async fn handle(&self, event: &LifecycleRequest) -> Result<LifecycleResponse, Error> {
        info!(
            action = ?event.action,
            stack_id = %event.stack_id,
            logical_resource_id = %event.logical_resource_id,
            request_id = %event.request_id,
            "received lifecycle event"
        );
        let mut response = LifecycleResponse::base(event);

        // nothing to provision for a delete; the persisted pool is
        // deliberately left in place
        if event.action == Action::Delete {
            self.dispatcher
                .deliver(event.response_url.as_deref(), &response)
                .await?;
            return Ok(response);
        }

        match self.provision(event).await {
            Ok(data) => {
                response.data = Some(data);
                response.reason = Some(REASON_SUCCESS.to_string());
            }
            Err(Error::Validation(reason)) => {
                info!(%reason, "request validation failed");
                response.status = Status::Failed;
                response.reason = Some(reason);
            }
            Err(e) => {
                error!(error = %e, "provisioning failed");
                response.status = Status::Failed;
                response.reason = Some(REASON_INTERNAL.to_string());
            }
        }
        self.dispatcher
            .deliver(event.response_url.as_deref(), &response)
            .await?;
        Ok(response)
    }

    /// Encrypt the request's `Encrypt_<Name>` properties and merge in the
    /// reconciled password pool.
    async fn provision(&self, event: &LifecycleRequest) -> Result<BTreeMap<String, String>, Error> {
        let props = &event.resource_properties;
        let key_id = match props.key_id.as_deref() {
            Some(key_id) if !key_id.is_empty() => key_id,
            _ => return Err(Error::Validation(REASON_MISSING_KEY_ID.to_string())),
        };

        let mut data = BTreeMap::new();
        for (name, plaintext) in props.encrypt_entries() {
            let ciphertext = self.gateway.encrypt(key_id, plaintext).await?;
            data.insert(name, ciphertext);
        }

        let pool = self
            .reconciler
            .reconcile(
                props.bucket_name.as_deref(),
                &event.pool_key(),
                key_id,
                data.len(),
            )
            .await?;
        data.extend(pool);
        Ok(data)
    }
}
