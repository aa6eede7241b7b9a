//! Repository for the `deals` and `deal_members` tables.

use dealroom_core::deal::roles;
use dealroom_core::types::DbId;
use sqlx::PgPool;

use crate::models::deal::{CreateDeal, Deal, DealMember};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, created_by, created_at, updated_at";

/// Same columns, qualified for queries joining `deal_members`.
const QUALIFIED_COLUMNS: &str =
    "d.id, d.name, d.description, d.created_by, d.created_at, d.updated_at";

const MEMBER_COLUMNS: &str = "deal_id, user_id, role, created_at";

/// Provides CRUD and membership operations for deals.
pub struct DealRepo;

impl DealRepo {
    /// Insert a new deal and register its creator as `owner`, atomically.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateDeal,
    ) -> Result<Deal, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO deals (name, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let deal = sqlx::query_as::<_, Deal>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO deal_members (deal_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(deal.id)
            .bind(created_by)
            .bind(roles::OWNER)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deal)
    }

    /// Find a deal by ID, regardless of membership.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Deal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deals WHERE id = $1");
        sqlx::query_as::<_, Deal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the deals a user is a member of, most recently created first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Deal>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS}
             FROM deals d
             JOIN deal_members m ON m.deal_id = d.id
             WHERE m.user_id = $1
             ORDER BY d.created_at DESC, d.id DESC"
        );
        sqlx::query_as::<_, Deal>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// The user's role in the deal, or `None` if they are not a member (or
    /// the deal does not exist).
    pub async fn member_role(
        pool: &PgPool,
        deal_id: DbId,
        user_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT role FROM deal_members WHERE deal_id = $1 AND user_id = $2")
            .bind(deal_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Add a member, or change the role of an existing one.
    ///
    /// Returns `None`, changing nothing, when the change would demote the
    /// deal's only owner. Owner rows are locked for the check so two owners
    /// cannot demote each other concurrently.
    pub async fn upsert_member(
        pool: &PgPool,
        deal_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<Option<DealMember>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owners: Vec<DbId> = sqlx::query_scalar(
            "SELECT user_id FROM deal_members
             WHERE deal_id = $1 AND role = $2
             FOR UPDATE",
        )
        .bind(deal_id)
        .bind(roles::OWNER)
        .fetch_all(&mut *tx)
        .await?;

        if role != roles::OWNER && owners == [user_id] {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO deal_members (deal_id, user_id, role)
             VALUES ($1, $2, $3)
             ON CONFLICT (deal_id, user_id) DO UPDATE SET role = EXCLUDED.role
             RETURNING {MEMBER_COLUMNS}"
        );
        let member = sqlx::query_as::<_, DealMember>(&query)
            .bind(deal_id)
            .bind(user_id)
            .bind(role)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(member))
    }

    /// List the members of a deal, oldest first.
    pub async fn list_members(
        pool: &PgPool,
        deal_id: DbId,
    ) -> Result<Vec<DealMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM deal_members
             WHERE deal_id = $1
             ORDER BY created_at, user_id"
        );
        sqlx::query_as::<_, DealMember>(&query)
            .bind(deal_id)
            .fetch_all(pool)
            .await
    }
}
