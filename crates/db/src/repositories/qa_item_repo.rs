//! Repository for the `qa_items` table.
//!
//! Every query is filtered by `deal_id` as well as `id`, so an item can only
//! be reached through the deal that owns it.

use dealroom_core::qa;
use dealroom_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::qa_item::{CreateQaItem, QaItem, QaItemFilter, UpdateQaItem};
use crate::repositories::{clamp_limit, clamp_offset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, deal_id, question, answer, category, priority, status, \
                       created_by, answered_at, created_at, updated_at";

/// Next version token, evaluated against the row being updated.
///
/// Strictly greater than the current token even if the clock has not moved,
/// and identical for every use within one statement, which lets
/// `answered_at` be stamped with exactly the new token.
const NEXT_TOKEN: &str = "GREATEST(now(), updated_at + INTERVAL '1 microsecond')";

/// Provides CRUD and versioned update operations for Q&A items.
pub struct QaItemRepo;

impl QaItemRepo {
    /// Insert a new Q&A item, returning the created row with its initial
    /// version token.
    pub async fn create(
        pool: &PgPool,
        deal_id: DbId,
        created_by: DbId,
        input: &CreateQaItem,
    ) -> Result<QaItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO qa_items
                (deal_id, question, answer, category, priority, status, created_by, answered_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, CASE WHEN $3::TEXT IS NULL THEN NULL ELSE now() END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QaItem>(&query)
            .bind(deal_id)
            .bind(input.question.trim())
            .bind(&input.answer)
            .bind(&input.category)
            .bind(input.priority.as_deref().unwrap_or(qa::DEFAULT_PRIORITY))
            .bind(qa::initial_status(input.answer.as_deref()))
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a Q&A item by ID within a deal.
    pub async fn find_in_deal(
        pool: &PgPool,
        deal_id: DbId,
        id: DbId,
    ) -> Result<Option<QaItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qa_items WHERE id = $1 AND deal_id = $2");
        sqlx::query_as::<_, QaItem>(&query)
            .bind(id)
            .bind(deal_id)
            .fetch_optional(pool)
            .await
    }

    /// List Q&A items in a deal, oldest first, with optional status and
    /// category filters.
    pub async fn list_by_deal(
        pool: &PgPool,
        deal_id: DbId,
        filter: &QaItemFilter,
    ) -> Result<Vec<QaItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM qa_items
             WHERE deal_id = $1
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::TEXT IS NULL OR category = $3)
             ORDER BY created_at, id
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, QaItem>(&query)
            .bind(deal_id)
            .bind(&filter.status)
            .bind(&filter.category)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// Apply `changes` if, and only if, the item's current `updated_at`
    /// equals `expected`. The token advance happens in the same statement.
    ///
    /// Returns `None` when no row matched (missing, other deal, or stale
    /// token, including one more precise than a stored token can be). Concurrent callers holding the same token serialize on the
    /// row lock; after the first commits, the others re-evaluate the
    /// `updated_at` predicate against the new row and match nothing.
    ///
    /// Besides the supplied fields:
    /// - `answered_at` is set to the new token when the answer goes from
    ///   `NULL` to a value, and cleared when the answer is cleared.
    /// - `status` follows the answer (`open` -> `answered` on first answer,
    ///   `answered` -> `open` when cleared) unless a status is supplied.
    pub async fn update_if_current(
        pool: &PgPool,
        deal_id: DbId,
        id: DbId,
        expected: Timestamp,
        changes: &UpdateQaItem,
    ) -> Result<Option<QaItem>, sqlx::Error> {
        // Stored tokens have microsecond resolution. A finer value was never
        // issued, and binding it would truncate it onto a real token.
        if expected.timestamp_subsec_nanos() % 1_000 != 0 {
            return Ok(None);
        }

        // Nullable columns: if the outer Option is Some, use the inner value
        // (which may be None to clear). If the outer Option is None, keep existing.
        let answer_provided = changes.answer.is_some();
        let answer_value = changes.answer.as_ref().and_then(|v| v.as_deref());
        let category_provided = changes.category.is_some();
        let category_value = changes.category.as_ref().and_then(|v| v.as_deref());

        let query = format!(
            "UPDATE qa_items SET
                 question    = COALESCE($4, question),
                 answer      = CASE WHEN $5 THEN $6 ELSE answer END,
                 category    = CASE WHEN $7 THEN $8 ELSE category END,
                 priority    = COALESCE($9, priority),
                 status      = COALESCE($10, CASE
                                   WHEN $5 AND $6::TEXT IS NOT NULL AND status = 'open' THEN 'answered'
                                   WHEN $5 AND $6::TEXT IS NULL AND status = 'answered' THEN 'open'
                                   ELSE status
                               END),
                 answered_at = CASE
                                   WHEN NOT $5 THEN answered_at
                                   WHEN $6::TEXT IS NULL THEN NULL
                                   WHEN answer IS NULL THEN {NEXT_TOKEN}
                                   ELSE answered_at
                               END,
                 updated_at  = {NEXT_TOKEN}
             WHERE id = $1 AND deal_id = $2 AND updated_at = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QaItem>(&query)
            .bind(id)
            .bind(deal_id)
            .bind(expected)
            .bind(changes.question.as_deref().map(str::trim))
            .bind(answer_provided)
            .bind(answer_value)
            .bind(category_provided)
            .bind(category_value)
            .bind(&changes.priority)
            .bind(&changes.status)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a Q&A item. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, deal_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM qa_items WHERE id = $1 AND deal_id = $2")
            .bind(id)
            .bind(deal_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
