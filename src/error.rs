/// Failure of a single webhook attempt. Every kind is retryable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    /// The attempt did not complete within the per-attempt timeout and was aborted.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    /// A response arrived with a status outside the 2xx range.
    #[error("HTTP {status}: {status_text}")]
    HttpStatus { status: u16, status_text: String },
    /// Connection, DNS or other transport-level failure.
    #[error("network error: {0}")]
    Network(String),
}

/// Terminal failure after the attempt budget is exhausted.
///
/// Carries the cause of the final attempt.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{operation} request to {destination} failed after {attempts} attempts: {cause}")]
pub struct TransportError {
    /// Diagnostic label passed to `submit`.
    pub operation: String,
    pub destination: String,
    pub attempts: u32,
    #[source]
    pub cause: AttemptError,
}

/// Error type returned by this crate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    /// The request was rejected before anything was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// All attempts failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The background task driving the request did not run to completion.
    #[error("request task failed: {0}")]
    TaskFailed(String),
}

impl WebhookError {
    /// Returns the terminal transport failure, if this is one.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}
