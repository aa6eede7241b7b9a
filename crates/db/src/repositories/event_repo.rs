//! Repository for the `events` and `event_types` tables.

use dealroom_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{Event, EventType, NewEvent};

/// Column list for `event_types` queries.
const EVENT_TYPE_COLUMNS: &str = "id, name, category, description, created_at";

/// Column list for `events` queries (joined with `event_types t`).
const EVENT_COLUMNS: &str = "e.id, t.name AS event_type, e.deal_id, e.source_entity_type, \
                             e.source_entity_id, e.actor_user_id, e.payload, e.created_at";

/// Provides read/write operations for events and event types.
pub struct EventRepo;

impl EventRepo {
    /// Find an event type by its dot-separated name (e.g. `"qa_item.answered"`).
    pub async fn get_event_type_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<EventType>, sqlx::Error> {
        let query = format!("SELECT {EVENT_TYPE_COLUMNS} FROM event_types WHERE name = $1");
        sqlx::query_as::<_, EventType>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new event row, returning the generated ID.
    pub async fn insert(pool: &PgPool, event: &NewEvent<'_>) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events \
                (event_type_id, deal_id, source_entity_type, source_entity_id, actor_user_id, payload) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(event.event_type_id)
        .bind(event.deal_id)
        .bind(event.source_entity_type)
        .bind(event.source_entity_id)
        .bind(event.actor_user_id)
        .bind(event.payload)
        .fetch_one(pool)
        .await
    }

    /// List a deal's events, newest first.
    pub async fn list_by_deal(
        pool: &PgPool,
        deal_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS}
             FROM events e
             JOIN event_types t ON t.id = e.event_type_id
             WHERE e.deal_id = $1
             ORDER BY e.created_at DESC, e.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(deal_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
