//! Postgres-backed [`VersionedStore`] for Q&A items.

use async_trait::async_trait;
use dealroom_core::concurrency::{RecordKey, VersionedStore};
use dealroom_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::qa_item::{QaItem, UpdateQaItem};
use crate::repositories::QaItemRepo;

/// Q&A items keyed by `(deal_id, id)` with `updated_at` as the version token.
///
/// Borrowed from the pool for the duration of one request; cheap to build.
#[derive(Clone, Copy)]
pub struct PgQaItemStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgQaItemStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionedStore for PgQaItemStore<'_> {
    type Record = QaItem;
    type Changes = UpdateQaItem;
    type Token = Timestamp;
    type Error = sqlx::Error;

    async fn write_if_current(
        &self,
        key: RecordKey,
        expected: &Timestamp,
        changes: &UpdateQaItem,
    ) -> Result<Option<QaItem>, sqlx::Error> {
        QaItemRepo::update_if_current(self.pool, key.scope_id, key.id, *expected, changes).await
    }

    async fn read(&self, key: RecordKey) -> Result<Option<QaItem>, sqlx::Error> {
        QaItemRepo::find_in_deal(self.pool, key.scope_id, key.id).await
    }
}
