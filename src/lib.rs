//! `moderation-webhook` forwards content-moderation decisions to the
//! automation webhooks that update the review spreadsheets.
//!
//! The core is [`WebhookClient::submit`], a deduplicating retry client:
//! - identical in-flight requests (same URL, same JSON body) share one call
//! - failed attempts are retried with exponential backoff
//! - every attempt is bounded by a timeout
//!
//! [`WebhookClient::approve`], [`WebhookClient::reject`] and
//! [`WebhookClient::delete`] resolve the webhook for a [`ContentCategory`]
//! and build the decision body before submitting.

mod client;
mod endpoints;
mod error;
mod key;
mod options;
mod review;
mod types;

pub use client::WebhookClient;
pub use endpoints::{ContentCategory, EndpointTable, ReviewAction, DEFAULT_WEBHOOK_BASE_URL};
pub use error::{AttemptError, TransportError, WebhookError};
pub use key::RequestKey;
pub use options::{backoff_delay, ClientOptions};
pub use review::{DecisionPayload, Rejection, ReviewItem, STATUS_APPROVED, STATUS_REJECTED};
pub use types::WebhookResponse;

pub type Result<T> = std::result::Result<T, WebhookError>;
