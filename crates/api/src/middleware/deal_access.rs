//! Deal-scope access extractors.
//!
//! Every route under `/deals/{deal_id}` resolves the caller's membership
//! before the handler runs. A caller who is not a member gets the same 404
//! as for a deal that does not exist.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use dealroom_core::deal::roles;
use dealroom_core::error::CoreError;
use dealroom_core::types::DbId;
use dealroom_db::repositories::DealRepo;
use serde::Deserialize;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
struct DealPath {
    deal_id: DbId,
}

/// An authenticated member of the deal named in the path.
///
/// ```ignore
/// async fn list(member: DealMember, State(state): State<AppState>) -> AppResult<..> {
///     QaItemRepo::list_by_deal(&state.pool, member.deal_id, &filter).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DealMember {
    pub user: AuthUser,
    pub deal_id: DbId,
    /// `owner` or `member`.
    pub role: String,
}

impl DealMember {
    pub fn user_id(&self) -> DbId {
        self.user.user_id
    }

    pub fn is_owner(&self) -> bool {
        self.role == roles::OWNER
    }
}

impl FromRequestParts<AppState> for DealMember {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let Path(DealPath { deal_id }) = Path::<DealPath>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let role = DealRepo::member_role(&state.pool, deal_id, user.user_id)
            .await?
            .ok_or(AppError::Core(CoreError::deal_not_found(deal_id)))?;

        Ok(DealMember {
            user,
            deal_id,
            role,
        })
    }
}

/// Requires the `owner` role in the deal. Members get 403 Forbidden,
/// non-members 404.
pub struct RequireDealOwner(pub DealMember);

impl FromRequestParts<AppState> for RequireDealOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let member = DealMember::from_request_parts(parts, state).await?;
        if !member.is_owner() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Deal owner role required".into(),
            )));
        }
        Ok(RequireDealOwner(member))
    }
}
