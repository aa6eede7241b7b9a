use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dealroom_core::concurrency::UpdateError;
use dealroom_core::error::CoreError;
use dealroom_core::types::DbId;
use serde::Serialize;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `dealroom_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An update request that named no recognized field.
    #[error("No fields to update")]
    NoOpRequest,

    /// The caller's version token is stale.
    #[error("{entity} was modified by another user")]
    VersionConflict {
        entity: &'static str,
        conflict: Box<VersionConflict>,
    },

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Extra body fields of a 409 version-conflict response.
#[derive(Debug, Serialize)]
pub struct VersionConflict {
    /// The authoritative record as it is now.
    pub current_record: serde_json::Value,
    /// The changes the caller tried to apply, echoed back for reconciliation.
    pub attempted_changes: serde_json::Value,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Map an optimistic-update failure on `entity` `id` to an HTTP error.
    pub fn from_update<R, C, E>(err: UpdateError<R, C, E>, entity: &'static str, id: DbId) -> Self
    where
        R: Serialize,
        C: Serialize,
        E: Into<AppError>,
    {
        match err {
            UpdateError::NoOpRequest => AppError::NoOpRequest,
            UpdateError::Validation(msg) => AppError::Core(CoreError::Validation(msg)),
            UpdateError::NotFound => AppError::Core(CoreError::NotFound { entity, id }),
            UpdateError::Conflict { current, attempted } => {
                match (
                    serde_json::to_value(current),
                    serde_json::to_value(attempted),
                ) {
                    (Ok(current_record), Ok(attempted_changes)) => AppError::VersionConflict {
                        entity,
                        conflict: Box::new(VersionConflict {
                            current_record,
                            attempted_changes,
                        }),
                    },
                    (Err(e), _) | (_, Err(e)) => {
                        AppError::InternalError(format!("Failed to serialize conflict: {e}"))
                    }
                }
            }
            UpdateError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NoOpRequest => (
                StatusCode::BAD_REQUEST,
                "NO_OP_REQUEST",
                "No fields to update".to_string(),
            ),
            AppError::VersionConflict { entity, .. } => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("{entity} was modified by another user. Review the current version and retry."),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });

        if let AppError::VersionConflict { conflict, .. } = self {
            let VersionConflict {
                current_record,
                attempted_changes,
            } = *conflict;
            body["current_record"] = current_record;
            body["attempted_changes"] = attempted_changes;
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
