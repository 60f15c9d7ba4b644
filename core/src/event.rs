//! Lifecycle event envelopes: the inbound notification and the single
//! outbound response, with their PascalCase wire forms.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Property keys with this prefix name plaintext values to be encrypted
pub const ENCRYPT_PREFIX: &str = "Encrypt_";

/// Lifecycle action for the declared resource.
/// An unrecognized wire value is a caller contract violation and fails
/// envelope decoding; it is not defended against downstream.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// Terminal status reported to the orchestrator
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Status {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

/// Caller-supplied properties of the declared resource.
/// `KeyId` and `BucketName` are recognized directly; everything else
/// (including the `Encrypt_<Name>` entries) is captured in `extra`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ResourceProperties {
    #[serde(rename = "KeyId", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    #[serde(rename = "BucketName", default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ResourceProperties {
    /// Iterate the `Encrypt_<Name>` properties as (output-field-name, plaintext)
    pub fn encrypt_entries(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.extra.iter().filter_map(|(key, plaintext)| {
            encrypted_field_name(key).map(|name| (name, plaintext.as_str()))
        })
    }
}

/// One inbound lifecycle notification from the orchestrator
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LifecycleRequest {
    #[serde(rename = "RequestType")]
    pub action: Action,

    #[serde(rename = "StackId")]
    pub stack_id: String,

    #[serde(rename = "RequestId")]
    pub request_id: String,

    #[serde(rename = "LogicalResourceId")]
    pub logical_resource_id: String,

    #[serde(
        rename = "PhysicalResourceId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub physical_resource_id: Option<String>,

    #[serde(rename = "ResponseURL", default, skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,

    #[serde(rename = "ResourceProperties", default)]
    pub resource_properties: ResourceProperties,
}

impl LifecycleRequest {
    /// Persistence key owning this resource's password pool
    pub fn pool_key(&self) -> String {
        format!("{}_{}", self.stack_id, self.logical_resource_id)
    }
}

/// The single outbound result for one lifecycle event
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LifecycleResponse {
    #[serde(rename = "StackId")]
    pub stack_id: String,

    #[serde(rename = "RequestId")]
    pub request_id: String,

    #[serde(rename = "LogicalResourceId")]
    pub logical_resource_id: String,

    #[serde(rename = "PhysicalResourceId")]
    pub physical_resource_id: String,

    #[serde(rename = "Status")]
    pub status: Status,

    #[serde(rename = "Reason", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(rename = "Data", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
}

impl LifecycleResponse {
    /// Build the base response for an event: ids echoed verbatim, status
    /// SUCCESS, no reason or data yet. The physical resource id is copied
    /// from the request when present, else freshly generated - the
    /// orchestrator requires one even though it is meaningless here.
    pub fn base(event: &LifecycleRequest) -> Self {
        LifecycleResponse {
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            physical_resource_id: event
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            status: Status::Success,
            reason: None,
            data: None,
        }
    }
}

/// Map an inbound `Encrypt_<Name>` property key to its output field name
/// `<Name>Encrypted`. Returns None for keys without the prefix.
pub fn encrypted_field_name(property: &str) -> Option<String> {
    property
        .strip_prefix(ENCRYPT_PREFIX)
        .map(|name| format!("{}Encrypted", name))
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::error::{Error, Result};

    #[test]
    fn field_naming_rule() {
        assert_eq!(
            encrypted_field_name("Encrypt_DbPassword").as_deref(),
            Some("DbPasswordEncrypted")
        );
        // bare prefix still maps (mirrors the strip/append rule exactly)
        assert_eq!(encrypted_field_name("Encrypt_").as_deref(), Some("Encrypted"));
        assert_eq!(encrypted_field_name("KeyId"), None);
        assert_eq!(encrypted_field_name("encrypt_foo"), None, "prefix is case-sensitive");
    }

    #[test]
    fn parse_inbound_event() -> Result<(), Error> {
        let event: LifecycleRequest = serde_json::from_str(
            r#"{
                "RequestType": "Create",
                "StackId": "arn:aws:cloudformation:us-east-1:111122223333:stack/demo/1",
                "RequestId": "req-0001",
                "LogicalResourceId": "AppSecrets",
                "ResponseURL": "https://callback.example.net/respond?sig=abc",
                "ResourceProperties": {
                    "ServiceToken": "arn:aws:lambda:us-east-1:111122223333:function:enc",
                    "KeyId": "alias/app-key",
                    "BucketName": "secrets-bucket",
                    "Encrypt_AdminPassword": "hunter2"
                }
            }"#,
        )?;
        assert_eq!(event.action, Action::Create);
        assert_eq!(event.request_id, "req-0001");
        assert!(event.physical_resource_id.is_none());
        assert_eq!(event.resource_properties.key_id.as_deref(), Some("alias/app-key"));
        assert_eq!(
            event.resource_properties.bucket_name.as_deref(),
            Some("secrets-bucket")
        );
        // unrecognized properties land in extra; only Encrypt_ keys are encryption input
        assert!(event.resource_properties.extra.contains_key("ServiceToken"));
        let entries: Vec<(String, &str)> = event.resource_properties.encrypt_entries().collect();
        assert_eq!(entries, vec![("AdminPasswordEncrypted".to_string(), "hunter2")]);
        assert_eq!(
            event.pool_key(),
            "arn:aws:cloudformation:us-east-1:111122223333:stack/demo/1_AppSecrets"
        );
        Ok(())
    }

    #[test]
    fn unknown_action_rejected() {
        let res = serde_json::from_str::<LifecycleRequest>(
            r#"{"RequestType":"Upsert","StackId":"s","RequestId":"r","LogicalResourceId":"l"}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn response_wire_form() -> Result<(), Error> {
        let event: LifecycleRequest = serde_json::from_str(
            r#"{"RequestType":"Delete","StackId":"stack-1","RequestId":"req-9",
                "LogicalResourceId":"AppSecrets","PhysicalResourceId":"phys-7"}"#,
        )?;
        let response = LifecycleResponse::base(&event);
        assert_eq!(response.physical_resource_id, "phys-7");

        let json = serde_json::to_value(&response)?;
        assert_eq!(json["StackId"], "stack-1");
        assert_eq!(json["RequestId"], "req-9");
        assert_eq!(json["LogicalResourceId"], "AppSecrets");
        assert_eq!(json["Status"], "SUCCESS");
        // absent Reason and Data are omitted, not null
        let obj = json.as_object().expect("object");
        assert!(!obj.contains_key("Reason"));
        assert!(!obj.contains_key("Data"));
        Ok(())
    }

    #[test]
    fn physical_id_generated_when_absent() -> Result<(), Error> {
        let event: LifecycleRequest = serde_json::from_str(
            r#"{"RequestType":"Create","StackId":"s","RequestId":"r","LogicalResourceId":"l"}"#,
        )?;
        let response = LifecycleResponse::base(&event);
        assert!(!response.physical_resource_id.is_empty());
        Ok(())
    }
}
