//! Event and event-type entity models.

use dealroom_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `event_types` lookup table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventType {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// A row from the `events` table, joined with its type name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub event_type: String,
    pub deal_id: Option<DbId>,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

/// Fields for inserting an event row.
#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub event_type_id: DbId,
    pub deal_id: Option<DbId>,
    pub source_entity_type: Option<&'a str>,
    pub source_entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: &'a serde_json::Value,
}
