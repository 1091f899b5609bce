use serde::{Deserialize, Serialize};

/// Normalized result of a successful webhook call.
///
/// Serializes as `{"success": true, "data": "<raw body>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub success: bool,
    /// Raw response body. Empty when the body could not be read.
    pub data: String,
}

impl WebhookResponse {
    pub(crate) fn ok(data: String) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
