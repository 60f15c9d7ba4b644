//! Terminal response delivery to the orchestrator's callback endpoint.

use crate::error::{Error, Result};
use crate::event::LifecycleResponse;
use tracing::debug;
use url::Url;

/// Delivers one response per invocation with a single HTTP PUT.
pub struct ResponseDispatcher {
    client: reqwest::Client,
}

impl Default for ResponseDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseDispatcher {
    pub fn new() -> Self {
        ResponseDispatcher {
            client: reqwest::Client::new(),
        }
    }

    /// PUT the JSON-serialized response to the callback url.
    /// An absent or empty callback means there is nowhere to send the
    /// response (test or dry-run invocation) and delivery is a no-op.
    /// The body is sent raw: pre-signed callback urls reject requests
    /// carrying a content-type header.
    pub async fn deliver(
        &self,
        callback: Option<&str>,
        response: &LifecycleResponse,
    ) -> Result<(), Error> {
        let callback = match callback {
            Some(url) if !url.is_empty() => url,
            _ => return Ok(()),
        };
        let url = Url::parse(callback)
            .map_err(|e| Error::Dispatch(format!("invalid callback url: {}", e)))?;
        let body = serde_json::to_string(response)?;

        debug!(%url, status = ?response.status, "dispatching lifecycle response");
        let res = self
            .client
            .put(url)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Dispatch(format!("callback IO error: {:?}", e)))?;
        if !res.status().is_success() {
            return Err(Error::Dispatch(format!(
                "callback returned status {}",
                res.status()
            )));
        }
        Ok(())
    }
}
