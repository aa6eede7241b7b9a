//! Handlers for the `/deals` resource and deal membership.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use dealroom_core::deal;
use dealroom_core::error::CoreError;
use dealroom_db::models::deal::{AddDealMember, CreateDeal, Deal, DealMember as DealMemberRow};
use dealroom_db::models::event::Event;
use dealroom_db::repositories::{clamp_limit, clamp_offset, DealRepo, EventRepo};
use dealroom_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::deal_access::{DealMember, RequireDealOwner};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/deals
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDeal>,
) -> AppResult<(StatusCode, Json<DataResponse<Deal>>)> {
    deal::validate_deal_name(&input.name)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let created = DealRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(deal_id = created.id, user_id = auth.user_id, "Deal created");

    state.event_bus.publish(
        PlatformEvent::new(deal::events::CREATED)
            .in_deal(created.id)
            .with_source("deal", created.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({ "name": created.name })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/deals
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Deal>>>> {
    let deals = DealRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: deals }))
}

/// GET /api/v1/deals/{deal_id}
pub async fn get_by_id(
    member: DealMember,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Deal>>> {
    let found = DealRepo::find_by_id(&state.pool, member.deal_id)
        .await?
        .ok_or(AppError::Core(CoreError::deal_not_found(member.deal_id)))?;
    Ok(Json(DataResponse { data: found }))
}

/// GET /api/v1/deals/{deal_id}/members
pub async fn list_members(
    member: DealMember,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<DealMemberRow>>>> {
    let members = DealRepo::list_members(&state.pool, member.deal_id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// POST /api/v1/deals/{deal_id}/members
///
/// Adds a user to the deal, or changes the role of an existing member.
/// Demoting the only owner is a 409.
pub async fn add_member(
    RequireDealOwner(owner): RequireDealOwner,
    State(state): State<AppState>,
    Json(input): Json<AddDealMember>,
) -> AppResult<(StatusCode, Json<DataResponse<DealMemberRow>>)> {
    let role = input.role.as_deref().unwrap_or(deal::roles::MEMBER);
    deal::validate_role(role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let added = DealRepo::upsert_member(&state.pool, owner.deal_id, input.user_id, role)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "A deal must keep at least one owner".into(),
            ))
        })?;
    tracing::info!(
        deal_id = owner.deal_id,
        member_user_id = added.user_id,
        role = %added.role,
        "Deal member added"
    );

    state.event_bus.publish(
        PlatformEvent::new(deal::events::MEMBER_ADDED)
            .in_deal(owner.deal_id)
            .with_source("deal", owner.deal_id)
            .with_actor(owner.user_id())
            .with_payload(serde_json::json!({
                "user_id": added.user_id,
                "role": added.role,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: added })))
}

/// GET /api/v1/deals/{deal_id}/events
///
/// The deal's audit trail, newest first.
pub async fn list_events(
    member: DealMember,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let events = EventRepo::list_by_deal(
        &state.pool,
        member.deal_id,
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data: events }))
}
