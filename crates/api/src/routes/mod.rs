pub mod deal;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /deals                                   create, list (caller's deals)
/// /deals/{deal_id}                         get
/// /deals/{deal_id}/members                 list, add / change role (owner only)
/// /deals/{deal_id}/events                  audit trail
/// /deals/{deal_id}/qa-items                list, create
/// /deals/{deal_id}/qa-items/{id}           get, versioned update, delete
/// ```
///
/// Every route requires a Bearer token. Routes under `/deals/{deal_id}`
/// answer 404 to callers who are not members of the deal.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/deals", deal::router())
}
