//! Shared query-parameter types for list endpoints.

use serde::Deserialize;

/// `?limit=&offset=` pagination. Values are clamped by the repositories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
