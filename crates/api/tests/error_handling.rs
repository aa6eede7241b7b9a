//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is involved.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use dealroom_api::error::AppError;
use dealroom_core::concurrency::UpdateError;
use dealroom_core::error::CoreError;
use http_body_util::BodyExt;
use serde::Serialize;
use serde_json::json;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[derive(Debug, Serialize)]
struct Item {
    id: i64,
    answer: Option<String>,
}

#[derive(Debug, Serialize)]
struct Changes {
    answer: String,
}

type ItemUpdateError = UpdateError<Item, Changes, sqlx::Error>;

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::qa_item_not_found(42));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "QaItem with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("priority must be one of".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn forbidden_error_returns_403() {
    let err = AppError::Core(CoreError::Forbidden("Deal owner role required".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("connection string postgres://secret".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Optimistic-update outcomes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_op_update_returns_400_no_op_request() {
    let err = AppError::from_update(ItemUpdateError::NoOpRequest, "QaItem", 1);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"error": "No fields to update", "code": "NO_OP_REQUEST"}));
}

#[tokio::test]
async fn conflict_returns_409_with_current_record_and_attempted_changes() {
    let err = AppError::from_update(
        ItemUpdateError::Conflict {
            current: Item {
                id: 7,
                answer: Some("42".into()),
            },
            attempted: Changes {
                answer: "43".into(),
            },
        },
        "QaItem",
        7,
    );
    assert_matches!(err, AppError::VersionConflict { entity: "QaItem", .. });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["current_record"], json!({"id": 7, "answer": "42"}));
    assert_eq!(json["attempted_changes"], json!({"answer": "43"}));
}

#[tokio::test]
async fn update_not_found_names_the_entity() {
    let err = AppError::from_update(ItemUpdateError::NotFound, "QaItem", 9);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "QaItem with id 9 not found");
}

#[tokio::test]
async fn update_validation_failure_returns_400() {
    let err = AppError::from_update(
        ItemUpdateError::Validation("question must not be empty".into()),
        "QaItem",
        1,
    );

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "question must not be empty");
}

#[tokio::test]
async fn store_failure_is_a_sanitized_500_never_a_conflict() {
    let err = AppError::from_update(
        ItemUpdateError::Store(sqlx::Error::PoolTimedOut),
        "QaItem",
        1,
    );

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
}
