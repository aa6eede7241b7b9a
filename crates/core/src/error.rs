//! Domain-level error type shared by the db and api layers.

use crate::types::DbId;

/// Errors raised by domain logic, independent of any transport.
///
/// The api crate maps each variant to an HTTP status. Version conflicts on
/// collaboratively edited records are *not* represented here; they travel as
/// [`UpdateError::Conflict`](crate::concurrency::UpdateError::Conflict) so
/// the current record can be returned alongside the rejected changes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing deal.
    ///
    /// Also returned when the caller is not a member of the deal, so that
    /// deal existence never leaks across tenants.
    pub fn deal_not_found(id: DbId) -> Self {
        Self::NotFound { entity: "Deal", id }
    }

    /// Shorthand for a missing Q&A item.
    pub fn qa_item_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "QaItem",
            id,
        }
    }
}
