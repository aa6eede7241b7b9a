//! Durable event persistence service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every received [`PlatformEvent`] to the `events` table, which
//! backs the per-deal audit trail. It shuts down when the bus is dropped.

use dealroom_core::types::DbId;
use dealroom_db::models::event::NewEvent;
use dealroom_db::repositories::EventRepo;
use dealroom_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

/// Error persisting a single event.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Background service that persists platform events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop until the channel is closed.
    ///
    /// Failures are logged and the event is skipped; the loop never stops on
    /// a bad event.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            deal_id = ?event.deal_id,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the `events` table, resolving its type name
    /// to the `event_types` row.
    pub async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<DbId, PersistError> {
        let event_type = EventRepo::get_event_type_by_name(pool, &event.event_type)
            .await?
            .ok_or_else(|| PersistError::UnknownEventType(event.event_type.clone()))?;

        let id = EventRepo::insert(
            pool,
            &NewEvent {
                event_type_id: event_type.id,
                deal_id: event.deal_id,
                source_entity_type: event.source_entity_type.as_deref(),
                source_entity_id: event.source_entity_id,
                actor_user_id: event.actor_user_id,
                payload: &event.payload,
            },
        )
        .await?;
        Ok(id)
    }
}
