//! Handlers for the `/deals/{deal_id}/qa-items` resource.
//!
//! Edits go through the optimistic-concurrency protocol: the caller sends
//! the `updated_at` it last saw as `expected_updated_at`, and a stale value
//! yields 409 with the current record instead of overwriting it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use dealroom_core::concurrency::{attempt_update, Changeset, RecordKey};
use dealroom_core::error::CoreError;
use dealroom_core::qa;
use dealroom_core::types::DbId;
use dealroom_db::models::qa_item::{CreateQaItem, QaItem, QaItemFilter, UpdateQaItemRequest};
use dealroom_db::repositories::QaItemRepo;
use dealroom_db::store::PgQaItemStore;
use dealroom_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::deal_access::DealMember;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "QaItem";

/// POST /api/v1/deals/{deal_id}/qa-items
pub async fn create(
    member: DealMember,
    State(state): State<AppState>,
    Json(input): Json<CreateQaItem>,
) -> AppResult<(StatusCode, Json<DataResponse<QaItem>>)> {
    input
        .validate()
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let item = QaItemRepo::create(&state.pool, member.deal_id, member.user_id(), &input).await?;

    tracing::info!(
        deal_id = item.deal_id,
        qa_item_id = item.id,
        user_id = member.user_id(),
        "Q&A item created"
    );

    state.event_bus.publish(
        PlatformEvent::new(qa::events::CREATED)
            .in_deal(item.deal_id)
            .with_source("qa_item", item.id)
            .with_actor(member.user_id())
            .with_payload(serde_json::json!({
                "question": item.question,
                "priority": item.priority,
                "status": item.status,
            })),
    );
    if item.was_just_answered() {
        publish_answered(&state, &item, member.user_id());
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// GET /api/v1/deals/{deal_id}/qa-items
pub async fn list(
    member: DealMember,
    State(state): State<AppState>,
    Query(filter): Query<QaItemFilter>,
) -> AppResult<Json<DataResponse<Vec<QaItem>>>> {
    if let Some(status) = &filter.status {
        qa::validate_status(status).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    let items = QaItemRepo::list_by_deal(&state.pool, member.deal_id, &filter).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/deals/{deal_id}/qa-items/{id}
pub async fn get_by_id(
    member: DealMember,
    State(state): State<AppState>,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<QaItem>>> {
    let item = QaItemRepo::find_in_deal(&state.pool, member.deal_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::qa_item_not_found(id)))?;
    Ok(Json(DataResponse { data: item }))
}

/// PUT /api/v1/deals/{deal_id}/qa-items/{id}
///
/// Body: the fields to change plus `expected_updated_at`. Keys other than
/// the editable fields are ignored; a body with no editable field is a
/// no-op request.
pub async fn update(
    member: DealMember,
    State(state): State<AppState>,
    Path((_, id)): Path<(DbId, DbId)>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<DataResponse<QaItem>>> {
    let request: UpdateQaItemRequest = serde_json::from_value(body).map_err(|e| {
        AppError::Core(CoreError::Validation(format!("Invalid request body: {e}")))
    })?;
    // Nothing to change is reported ahead of a missing token.
    if request.changes.is_empty() {
        return Err(AppError::NoOpRequest);
    }
    let expected = request.expected_updated_at.ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "expected_updated_at is required".into(),
        ))
    })?;

    let store = PgQaItemStore::new(&state.pool);
    let item = attempt_update(
        &store,
        RecordKey::new(member.deal_id, id),
        &expected,
        request.changes,
    )
    .await
    .map_err(|err| {
        if err.is_retryable() {
            tracing::warn!(
                deal_id = member.deal_id,
                qa_item_id = id,
                error = %err,
                "Q&A item update failed"
            );
        } else {
            tracing::debug!(
                deal_id = member.deal_id,
                qa_item_id = id,
                error = %err,
                "Q&A item update rejected"
            );
        }
        AppError::from_update(err, ENTITY, id)
    })?;

    tracing::info!(
        deal_id = item.deal_id,
        qa_item_id = item.id,
        user_id = member.user_id(),
        updated_at = %item.updated_at,
        "Q&A item updated"
    );

    if item.was_just_answered() {
        publish_answered(&state, &item, member.user_id());
    }

    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/deals/{deal_id}/qa-items/{id}
pub async fn delete(
    member: DealMember,
    State(state): State<AppState>,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !QaItemRepo::delete(&state.pool, member.deal_id, id).await? {
        return Err(AppError::Core(CoreError::qa_item_not_found(id)));
    }

    tracing::info!(deal_id = member.deal_id, qa_item_id = id, "Q&A item deleted");
    state.event_bus.publish(
        PlatformEvent::new(qa::events::DELETED)
            .in_deal(member.deal_id)
            .with_source("qa_item", id)
            .with_actor(member.user_id()),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Announce a freshly answered item. The write has already committed; the
/// HTTP outcome does not depend on anyone receiving this.
fn publish_answered(state: &AppState, item: &QaItem, actor: DbId) {
    state.event_bus.publish(
        PlatformEvent::new(qa::events::ANSWERED)
            .in_deal(item.deal_id)
            .with_source("qa_item", item.id)
            .with_actor(actor)
            .with_payload(serde_json::json!({
                "question": item.question,
                "answer": item.answer,
                "category": item.category,
                "answered_at": item.answered_at,
            })),
    );
}
