use std::collections::HashMap;
use std::error::Error as _;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::header;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::{
    options::backoff_delay, AttemptError, ClientOptions, ContentCategory, DecisionPayload,
    EndpointTable, Rejection, RequestKey, Result, ReviewAction, ReviewItem, TransportError,
    WebhookError, WebhookResponse,
};

type SharedOutcome = Shared<BoxFuture<'static, Result<WebhookResponse>>>;

struct PendingEntry {
    id: u64,
    outcome: SharedOutcome,
}

/// In-flight requests keyed by destination and payload.
#[derive(Default)]
struct PendingRegistry {
    entries: Mutex<HashMap<RequestKey, PendingEntry>>,
    next_id: AtomicU64,
}

impl PendingRegistry {
    fn lock(&self) -> MutexGuard<'_, HashMap<RequestKey, PendingEntry>> {
        // The map is only touched between await points; a panic while holding
        // the lock cannot leave it half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes `key` only if it still belongs to the request `id`.
    fn remove(&self, key: &RequestKey, id: u64) {
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|entry| entry.id == id) {
            entries.remove(key);
        }
    }
}

/// Removes its registry entry when dropped, on every exit path of the
/// request task including panics and runtime shutdown.
struct PendingGuard {
    registry: Arc<PendingRegistry>,
    key: RequestKey,
    id: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.key, self.id);
    }
}

#[derive(Clone)]
/// Deduplicating retry client for moderation webhooks.
///
/// Clones share the same pending-request registry, so identical requests
/// issued through any clone coalesce into one network call.
pub struct WebhookClient {
    http: reqwest::Client,
    endpoints: EndpointTable,
    options: ClientOptions,
    pending: Arc<PendingRegistry>,
}

impl fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookClient")
            .field("endpoints", &self.endpoints.base_url())
            .field("options", &self.options)
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookClient {
    /// Creates a client targeting the production webhook host with default
    /// timeout and retry settings.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints: EndpointTable::default(),
            options: ClientOptions::default(),
            pending: Arc::new(PendingRegistry::default()),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// All variables are optional:
    /// - `MODERATION_WEBHOOK_BASE_URL`: webhook host (defaults to production)
    /// - `MODERATION_WEBHOOK_TIMEOUT_MS`
    /// - `MODERATION_WEBHOOK_MAX_ATTEMPTS`
    /// - `MODERATION_WEBHOOK_RETRY_BACKOFF_MS`
    ///
    /// Returns an error if a variable is set but empty or not a number.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use moderation_webhook::WebhookClient;
    ///
    /// let client = WebhookClient::from_env().expect("invalid MODERATION_WEBHOOK_* env vars");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        let (endpoints, options) = config_from_lookup(|name| std::env::var(name).ok())?;
        Ok(Self::new().with_endpoints(endpoints).with_options(options))
    }

    /// Applies timeout and retry options.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Replaces the endpoint table used by [`approve`](Self::approve),
    /// [`reject`](Self::reject) and [`delete`](Self::delete).
    pub fn with_endpoints(mut self, endpoints: EndpointTable) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Number of distinct requests currently in flight.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether a request with this destination and payload is in flight.
    pub fn is_pending<P: Serialize + ?Sized>(&self, destination: &str, payload: &P) -> bool {
        RequestKey::new(destination, payload)
            .map(|key| self.pending.lock().contains_key(&key))
            .unwrap_or(false)
    }

    /// POSTs `payload` as JSON to `destination`.
    ///
    /// If an identical request (same destination, same JSON payload) is
    /// already in flight, this joins it instead of issuing a new call, and
    /// observes the same outcome. Otherwise the request is attempted up to
    /// [`ClientOptions::max_attempts`] times with exponential backoff.
    ///
    /// `operation` is a free-text label used only in diagnostics.
    ///
    /// The request runs on a background task and completes even if every
    /// caller stops awaiting it.
    pub async fn submit<P: Serialize + ?Sized>(
        &self,
        destination: &str,
        payload: &P,
        operation: &str,
    ) -> Result<WebhookResponse> {
        let key = RequestKey::new(destination, payload)?;
        self.join_or_start(key, operation).await
    }

    /// Approves `item`, writing the approved status to its row.
    pub async fn approve(
        &self,
        category: ContentCategory,
        item: &ReviewItem,
    ) -> Result<WebhookResponse> {
        let action = ReviewAction::Approve;
        let payload = DecisionPayload::approve(category, item);
        self.submit(&self.endpoints.resolve(category, action), &payload, action.label())
            .await
    }

    /// Rejects `item`. Reviewer guidance is forwarded for user content only.
    pub async fn reject(
        &self,
        category: ContentCategory,
        item: &ReviewItem,
        rejection: &Rejection,
    ) -> Result<WebhookResponse> {
        let action = ReviewAction::Reject;
        let payload = DecisionPayload::reject(category, item, rejection);
        self.submit(&self.endpoints.resolve(category, action), &payload, action.label())
            .await
    }

    /// Deletes the row backing `item`.
    pub async fn delete(
        &self,
        category: ContentCategory,
        item: &ReviewItem,
    ) -> Result<WebhookResponse> {
        let action = ReviewAction::Delete;
        let payload = DecisionPayload::delete(item);
        self.submit(&self.endpoints.resolve(category, action), &payload, action.label())
            .await
    }

    fn join_or_start(&self, key: RequestKey, operation: &str) -> SharedOutcome {
        let mut entries = self.pending.lock();
        if let Some(entry) = entries.get(&key) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                operation,
                destination = key.destination(),
                "request already in flight, joining"
            );
            return entry.outcome.clone();
        }

        let id = self.pending.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let outcome = rx
            .map(|received| {
                received.unwrap_or_else(|_| {
                    Err(WebhookError::TaskFailed(
                        "request task ended without a result".to_owned(),
                    ))
                })
            })
            .boxed()
            .shared();
        entries.insert(
            key.clone(),
            PendingEntry {
                id,
                outcome: outcome.clone(),
            },
        );
        // The task may be dropped inline if the runtime is shutting down,
        // which runs the guard; the lock must be released first.
        drop(entries);

        let guard = PendingGuard {
            registry: Arc::clone(&self.pending),
            key: key.clone(),
            id,
        };
        let sequence = AttemptSequence {
            http: self.http.clone(),
            options: self.options.clone(),
            key,
            operation: operation.to_owned(),
        };

        tokio::spawn(async move {
            let result = sequence.run().await;
            // Deregister before publishing so a caller that observes the
            // result never sees its key still pending.
            drop(guard);
            let _ = tx.send(result);
        });

        outcome
    }
}

enum AttemptState {
    Attempting(u32),
    Succeeded(String),
    Failed { attempts: u32, cause: AttemptError },
}

/// One request's attempt loop, detached from the client so it can run on
/// its own task.
struct AttemptSequence {
    http: reqwest::Client,
    options: ClientOptions,
    key: RequestKey,
    operation: String,
}

impl AttemptSequence {
    async fn run(self) -> Result<WebhookResponse> {
        let max_attempts = self.options.max_attempts.max(1);
        #[cfg(feature = "tracing")]
        let started = std::time::Instant::now();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            operation = %self.operation,
            destination = self.key.destination(),
            body = self.key.body(),
            "starting webhook request"
        );

        let mut state = AttemptState::Attempting(1);
        loop {
            state = match state {
                AttemptState::Attempting(attempt) => match self.attempt().await {
                    Ok(body) => AttemptState::Succeeded(body),
                    Err(cause) if attempt >= max_attempts => AttemptState::Failed {
                        attempts: attempt,
                        cause,
                    },
                    Err(cause) => {
                        let delay = backoff_delay(self.options.retry_backoff_ms, attempt);

                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            operation = %self.operation,
                            destination = self.key.destination(),
                            attempt,
                            error = %cause,
                            "webhook attempt failed, retrying in {} ms",
                            delay.as_millis()
                        );
                        #[cfg(not(feature = "tracing"))]
                        let _ = cause;

                        sleep(delay).await;
                        AttemptState::Attempting(attempt + 1)
                    }
                },
                AttemptState::Succeeded(data) => {
                    #[cfg(feature = "tracing")]
                    tracing::info!(
                        operation = %self.operation,
                        destination = self.key.destination(),
                        elapsed_ms = (started.elapsed().as_millis() as u64),
                        "webhook request succeeded"
                    );
                    return Ok(WebhookResponse::ok(data));
                }
                AttemptState::Failed { attempts, cause } => {
                    let err = TransportError {
                        operation: self.operation,
                        destination: self.key.destination().to_owned(),
                        attempts,
                        cause,
                    };
                    #[cfg(feature = "tracing")]
                    tracing::error!(
                        elapsed_ms = (started.elapsed().as_millis() as u64),
                        error = %err,
                        "webhook request failed"
                    );
                    return Err(err.into());
                }
            };
        }
    }

    /// Performs one POST. A timeout aborts the in-flight request.
    async fn attempt(&self) -> std::result::Result<String, AttemptError> {
        let response = self
            .http
            .post(self.key.destination())
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(self.options.timeout())
            .body(self.key.body().to_owned())
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        let status_text = reason_phrase(&response);
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) if err.is_timeout() => return Err(self.classify(err)),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %_err, "response body unreadable, treating as empty");
                String::new()
            }
        };

        if !status.is_success() {
            return Err(AttemptError::HttpStatus {
                status: status.as_u16(),
                status_text,
            });
        }

        Ok(body)
    }

    fn classify(&self, err: reqwest::Error) -> AttemptError {
        if err.is_timeout() {
            return AttemptError::Timeout {
                timeout_ms: self.options.timeout_ms,
            };
        }

        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        AttemptError::Network(message)
    }
}

/// Reason phrase as sent by the server, falling back to the canonical one.
fn reason_phrase(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned())
        .unwrap_or_else(|| {
            response
                .status()
                .canonical_reason()
                .unwrap_or_default()
                .to_owned()
        })
}

fn config_from_lookup<F>(lookup: F) -> std::result::Result<(EndpointTable, ClientOptions), String>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| -> std::result::Result<Option<String>, String> {
        match lookup(name) {
            None => Ok(None),
            Some(value) if value.trim().is_empty() => Err(format!("{name} is set but empty")),
            Some(value) => Ok(Some(value.trim().to_owned())),
        }
    };
    let read_number = |name: &str| -> std::result::Result<Option<u64>, String> {
        read(name)?
            .map(|value| {
                value
                    .parse::<u64>()
                    .map_err(|err| format!("{name} must be a non-negative integer: {err}"))
            })
            .transpose()
    };

    let endpoints = read("MODERATION_WEBHOOK_BASE_URL")?
        .map(EndpointTable::new)
        .unwrap_or_default();

    let mut options = ClientOptions::default();
    if let Some(timeout_ms) = read_number("MODERATION_WEBHOOK_TIMEOUT_MS")? {
        options.timeout_ms = timeout_ms;
    }
    if let Some(max_attempts) = read_number("MODERATION_WEBHOOK_MAX_ATTEMPTS")? {
        options.max_attempts = u32::try_from(max_attempts)
            .ok()
            .filter(|attempts| *attempts > 0)
            .ok_or_else(|| {
                "MODERATION_WEBHOOK_MAX_ATTEMPTS must be between 1 and u32::MAX".to_owned()
            })?;
    }
    if let Some(backoff_ms) = read_number("MODERATION_WEBHOOK_RETRY_BACKOFF_MS")? {
        options.retry_backoff_ms = backoff_ms;
    }

    Ok((endpoints, options))
}
