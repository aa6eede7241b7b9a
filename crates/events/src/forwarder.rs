//! Forwards selected platform events to an external webhook.
//!
//! Downstream systems (e.g. knowledge-graph ingestion reacting to a freshly
//! answered Q&A item) are notified after the triggering write has
//! committed. Each delivery runs as a detached task: it never delays the
//! bus loop, is never awaited by the publisher, and its failure is only
//! logged.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::bus::PlatformEvent;
use crate::delivery::webhook::WebhookDelivery;

/// Background service that forwards matching events to one webhook URL.
pub struct WebhookForwarder {
    url: Arc<str>,
    event_types: Vec<String>,
    delivery: WebhookDelivery,
}

impl WebhookForwarder {
    pub fn new(url: impl Into<Arc<str>>, event_types: Vec<String>, delivery: WebhookDelivery) -> Self {
        Self {
            url: url.into(),
            event_types,
            delivery,
        }
    }

    /// Whether the event's type is on the forwarding list.
    pub fn should_forward(&self, event: &PlatformEvent) -> bool {
        self.event_types.iter().any(|t| *t == event.event_type)
    }

    /// Run the forwarding loop until the channel is closed.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if self.should_forward(&event) {
                        self.dispatch(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Webhook forwarder lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, webhook forwarder shutting down");
                    break;
                }
            }
        }
    }

    /// Spawn a detached delivery task for one event.
    ///
    /// The handle is returned for tests; callers in the loop drop it.
    pub fn dispatch(&self, event: PlatformEvent) -> JoinHandle<()> {
        let delivery = self.delivery.clone();
        let url = Arc::clone(&self.url);
        tokio::spawn(async move {
            if delivery.deliver(&url, &event).await.is_ok() {
                tracing::debug!(
                    event_type = %event.event_type,
                    source_entity_id = ?event.source_entity_id,
                    "Event forwarded to webhook"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dealroom_core::retry::RetryPolicy;

    use super::*;

    fn forwarder(url: &str) -> WebhookForwarder {
        let delivery =
            WebhookDelivery::with_policy(RetryPolicy::new(1, Duration::ZERO, Duration::ZERO))
                .unwrap();
        WebhookForwarder::new(url, vec!["qa_item.answered".to_string()], delivery)
    }

    #[test]
    fn forwards_only_listed_event_types() {
        let fwd = forwarder("http://127.0.0.1:9/hook");
        assert!(fwd.should_forward(&PlatformEvent::new("qa_item.answered")));
        assert!(!fwd.should_forward(&PlatformEvent::new("qa_item.created")));
        assert!(!fwd.should_forward(&PlatformEvent::new("deal.created")));
    }

    #[tokio::test]
    async fn failed_delivery_does_not_panic_the_task() {
        let fwd = forwarder("http://127.0.0.1:9/hook");
        let handle = fwd.dispatch(PlatformEvent::new("qa_item.answered"));
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn loop_exits_when_bus_is_dropped() {
        let bus = crate::EventBus::default();
        let rx = bus.subscribe();
        let task = tokio::spawn(forwarder("http://127.0.0.1:9/hook").run(rx));

        bus.publish(PlatformEvent::new("deal.created"));
        drop(bus);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("forwarder should stop once the bus closes")
            .unwrap();
    }
}
