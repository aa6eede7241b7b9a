//! Deal and deal-membership models and DTOs.

use dealroom_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `deals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Deal {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `deal_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DealMember {
    pub deal_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new deal. The creator becomes its owner.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeal {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for adding a user to a deal (or changing their role).
#[derive(Debug, Clone, Deserialize)]
pub struct AddDealMember {
    pub user_id: DbId,
    /// Defaults to `member` if omitted.
    pub role: Option<String>,
}
