use axum::routing::get;
use axum::Router;

use crate::handlers::{deal, qa_item};
use crate::state::AppState;

/// Routes mounted at `/deals`.
///
/// ```text
/// GET, POST              /
/// GET                    /{deal_id}
/// GET, POST              /{deal_id}/members
/// GET                    /{deal_id}/events
/// GET, POST              /{deal_id}/qa-items
/// GET, PUT, DELETE       /{deal_id}/qa-items/{id}
/// ```
pub fn router() -> Router<AppState> {
    let qa_items = Router::new()
        .route("/", get(qa_item::list).post(qa_item::create))
        .route(
            "/{id}",
            get(qa_item::get_by_id)
                .put(qa_item::update)
                .delete(qa_item::delete),
        );

    Router::new()
        .route("/", get(deal::list).post(deal::create))
        .route("/{deal_id}", get(deal::get_by_id))
        .route(
            "/{deal_id}/members",
            get(deal::list_members).post(deal::add_member),
        )
        .route("/{deal_id}/events", get(deal::list_events))
        .nest("/{deal_id}/qa-items", qa_items)
}
