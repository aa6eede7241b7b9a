//! HTTP-level tests for deals, membership and the audit trail.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, create_deal, create_qa_item, get, post_json};
use dealroom_events::EventPersistence;
use serde_json::json;
use sqlx::PgPool;

const OWNER: i64 = 1;
const MEMBER: i64 = 2;
const OUTSIDER: i64 = 3;

#[sqlx::test(migrations = "../db/migrations")]
async fn create_deal_makes_creator_owner(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/deals",
        OWNER,
        json!({"name": "Project Falcon", "description": "Carve-out"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let deal = body_json(response).await["data"].clone();
    assert_eq!(deal["name"], "Project Falcon");
    assert_eq!(deal["created_by"], OWNER);

    let response = get(
        app,
        &format!("/api/v1/deals/{}/members", deal["id"]),
        OWNER,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let members = body_json(response).await["data"].clone();
    assert_eq!(members, json!([{
        "deal_id": deal["id"],
        "user_id": OWNER,
        "role": "owner",
        "created_at": members[0]["created_at"],
    }]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_deal_rejects_blank_name(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/deals", OWNER, json!({"name": "  "})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_shows_only_deals_the_caller_belongs_to(pool: PgPool) {
    let app = common::build_test_app(pool);
    create_deal(app.clone(), OWNER, "Project Falcon").await;
    create_deal(app.clone(), OUTSIDER, "Project Osprey").await;

    let response = get(app, "/api/v1/deals", OWNER).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let deals = json["data"].as_array().unwrap();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0]["name"], "Project Falcon");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_member_gets_404_for_existing_deal(pool: PgPool) {
    let app = common::build_test_app(pool);
    let deal_id = create_deal(app.clone(), OWNER, "Project Falcon").await;

    let hidden = get(app.clone(), &format!("/api/v1/deals/{deal_id}"), OUTSIDER).await;
    let missing = get(app, "/api/v1/deals/999999", OUTSIDER).await;

    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(hidden).await["error"],
        format!("Deal with id {deal_id} not found")
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn owner_adds_member_who_can_then_edit(pool: PgPool) {
    let app = common::build_test_app(pool);
    let deal_id = create_deal(app.clone(), OWNER, "Project Falcon").await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/deals/{deal_id}/members"),
        OWNER,
        json!({"user_id": MEMBER}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["role"], "member");

    let item = create_qa_item(app.clone(), deal_id, MEMBER, json!({"question": "Headcount?"})).await;
    assert_eq!(item["created_by"], MEMBER);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_owner_manages_members(pool: PgPool) {
    let app = common::build_test_app(pool);
    let deal_id = create_deal(app.clone(), OWNER, "Project Falcon").await;
    post_json(
        app.clone(),
        &format!("/api/v1/deals/{deal_id}/members"),
        OWNER,
        json!({"user_id": MEMBER}),
    )
    .await;

    let as_member = post_json(
        app.clone(),
        &format!("/api/v1/deals/{deal_id}/members"),
        MEMBER,
        json!({"user_id": OUTSIDER}),
    )
    .await;
    assert_eq!(as_member.status(), StatusCode::FORBIDDEN);

    let as_outsider = post_json(
        app.clone(),
        &format!("/api/v1/deals/{deal_id}/members"),
        OUTSIDER,
        json!({"user_id": OUTSIDER}),
    )
    .await;
    assert_eq!(as_outsider.status(), StatusCode::NOT_FOUND);

    let bad_role = post_json(
        app,
        &format!("/api/v1/deals/{deal_id}/members"),
        OWNER,
        json!({"user_id": MEMBER, "role": "admin"}),
    )
    .await;
    assert_eq!(bad_role.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sole_owner_cannot_demote_themselves(pool: PgPool) {
    let app = common::build_test_app(pool);
    let deal_id = create_deal(app.clone(), OWNER, "Project Falcon").await;
    let members_uri = format!("/api/v1/deals/{deal_id}/members");

    let response = post_json(
        app.clone(),
        &members_uri,
        OWNER,
        json!({"user_id": OWNER, "role": "member"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");

    // Still the owner, so owner-only actions keep working.
    let response = get(app.clone(), &members_uri, OWNER).await;
    let members = body_json(response).await["data"].clone();
    assert_eq!(members[0]["user_id"], OWNER);
    assert_eq!(members[0]["role"], "owner");

    let response = post_json(
        app.clone(),
        &members_uri,
        OWNER,
        json!({"user_id": MEMBER, "role": "owner"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // With a second owner in place the demotion goes through.
    let response = post_json(
        app,
        &members_uri,
        OWNER,
        json!({"user_id": OWNER, "role": "member"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["role"], "member");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn events_endpoint_returns_persisted_audit_trail(pool: PgPool) {
    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    tokio::spawn(EventPersistence::run(pool, bus.subscribe()));

    let deal_id = create_deal(app.clone(), OWNER, "Project Falcon").await;
    create_qa_item(
        app.clone(),
        deal_id,
        OWNER,
        json!({"question": "Revenue?", "answer": "$12.4M"}),
    )
    .await;

    // deal.created, qa_item.created, qa_item.answered
    let uri = format!("/api/v1/deals/{deal_id}/events");
    let mut events = Vec::new();
    for _ in 0..50 {
        let response = get(app.clone(), &uri, OWNER).await;
        assert_eq!(response.status(), StatusCode::OK);
        events = body_json(response).await["data"].as_array().unwrap().clone();
        if events.len() >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let mut types: Vec<&str> = events
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    types.sort_unstable();
    assert_eq!(
        types,
        ["deal.created", "qa_item.answered", "qa_item.created"]
    );

    let response = get(app, &uri, OUTSIDER).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
