use serde::Serialize;

use crate::{Result, WebhookError};

/// Identity of a webhook request: destination plus serialized payload.
///
/// Payloads are serialized through [`serde_json::Value`], whose object map is
/// ordered by key, so two payloads that are equal as JSON produce the same key
/// regardless of field declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestKey {
    destination: String,
    body: String,
}

impl RequestKey {
    pub fn new<P: Serialize + ?Sized>(destination: &str, payload: &P) -> Result<Self> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(WebhookError::InvalidRequest(
                "destination must not be empty".to_owned(),
            ));
        }

        let value = serde_json::to_value(payload).map_err(|err| {
            WebhookError::InvalidRequest(format!("payload is not JSON-serializable: {err}"))
        })?;
        let body = serde_json::to_string(&value).map_err(|err| {
            WebhookError::InvalidRequest(format!("payload is not JSON-serializable: {err}"))
        })?;

        Ok(Self {
            destination: destination.to_owned(),
            body,
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// The exact JSON text sent as the request body.
    pub fn body(&self) -> &str {
        &self.body
    }
}
