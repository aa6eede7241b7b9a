//! Dealroom event bus and downstream delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Publishing never blocks and never fails the
//!   caller; delivery is best-effort and at most once.
//! - [`PlatformEvent`]: the canonical domain event envelope.
//! - [`EventPersistence`]: background service that writes every event to
//!   the `events` table (the deal audit trail).
//! - [`WebhookForwarder`]: background service that forwards selected events
//!   to an external endpoint, one detached task per delivery.
//! - [`delivery`]: outbound delivery channels.

pub mod bus;
pub mod delivery;
pub mod forwarder;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::webhook::WebhookDelivery;
pub use forwarder::WebhookForwarder;
pub use persistence::EventPersistence;
