//! Webhook delivery with exponential-backoff retry.
//!
//! [`WebhookDelivery`] POSTs a JSON-encoded [`PlatformEvent`] to an external
//! URL. Failed attempts are retried according to a [`RetryPolicy`]
//! (by default 1 s, 2 s, 4 s between four attempts).

use std::time::Duration;

use dealroom_core::retry::{retry, RetryPolicy};

use crate::bus::PlatformEvent;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers platform events to an external webhook endpoint.
#[derive(Clone)]
pub struct WebhookDelivery {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl WebhookDelivery {
    /// Create a delivery service with the default retry policy.
    pub fn new() -> Result<Self, WebhookError> {
        Self::with_policy(RetryPolicy::default())
    }

    /// Create a delivery service with a custom retry policy.
    pub fn with_policy(policy: RetryPolicy) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(WebhookError::Client)?;
        Ok(Self { client, policy })
    }

    /// The JSON body sent for an event.
    pub fn payload_for(event: &PlatformEvent) -> serde_json::Value {
        serde_json::json!({
            "event_type": event.event_type,
            "deal_id": event.deal_id,
            "source_entity_type": event.source_entity_type,
            "source_entity_id": event.source_entity_id,
            "actor_user_id": event.actor_user_id,
            "payload": event.payload,
            "timestamp": event.timestamp,
        })
    }

    /// Deliver an event to a webhook URL, retrying per the policy.
    ///
    /// Returns the error of the last attempt if every attempt fails.
    pub async fn deliver(&self, url: &str, event: &PlatformEvent) -> Result<(), WebhookError> {
        let payload = Self::payload_for(event);

        let result = retry(&self.policy, |attempt| {
            let payload = &payload;
            async move {
                let outcome = self.try_send(url, payload).await;
                if let Err(e) = &outcome {
                    tracing::warn!(
                        attempt,
                        url,
                        event_type = %event.event_type,
                        error = %e,
                        "Webhook delivery attempt failed"
                    );
                }
                outcome
            }
        })
        .await;

        if let Err(e) = &result {
            tracing::error!(url, error = %e, "Webhook delivery failed after all retries");
        }
        result
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, payload: &serde_json::Value) -> Result<(), WebhookError> {
        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
