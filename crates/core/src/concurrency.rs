//! Optimistic-concurrency update protocol for collaboratively edited records.
//!
//! A caller proposes a set of field changes together with the version token
//! it last observed. The store applies the changes and advances the token in
//! one atomic conditional write; if the token no longer matches, nothing is
//! written and the caller receives the record's current state so it can
//! reconcile. No lock is held between a user's read and their edit.
//!
//! The protocol is stateless per call:
//!
//! ```text
//! (token = T, fields)  --attempt_update(T, changes)-->  (token = T', fields + changes)
//!                      --attempt_update(stale, ..)-->   Conflict { current, attempted }
//! ```
//!
//! Storage is reached only through [`VersionedStore`], which is passed in
//! explicitly by the caller.

use async_trait::async_trait;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Identifies a record inside the collection (tenant scope) that owns it.
///
/// Every read and write is filtered by both fields, so a record can never be
/// reached through a scope that does not own it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKey {
    /// Owning collection, e.g. the deal a Q&A item belongs to.
    pub scope_id: DbId,
    /// The record itself.
    pub id: DbId,
}

impl RecordKey {
    pub fn new(scope_id: DbId, id: DbId) -> Self {
        Self { scope_id, id }
    }
}

/// A set of proposed field changes.
///
/// Unknown fields are expected to have been dropped already (typically by
/// deserialization), so `is_empty` reports whether any recognized field is
/// present.
pub trait Changeset {
    /// `true` when no recognized field is set.
    fn is_empty(&self) -> bool;

    /// Type and range checks for the supplied values.
    fn validate(&self) -> Result<(), String>;
}

/// Storage capable of a single-round-trip compare-and-set update.
///
/// Implementations must make [`write_if_current`](Self::write_if_current)
/// atomic: the token comparison, the field changes and the token advance
/// either all happen or none do, under any interleaving of concurrent
/// callers.
#[async_trait]
pub trait VersionedStore: Send + Sync {
    /// The full record as seen by callers.
    type Record: Send;
    /// Proposed field changes.
    type Changes: Changeset + Send + Sync;
    /// Version token. Compared for exact equality only.
    type Token: Send + Sync;
    /// Storage failure unrelated to concurrency (network, timeout, ...).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Apply `changes` and regenerate the token, but only if the record
    /// identified by `key` exists and its token equals `expected`.
    ///
    /// Returns the updated record, or `None` when no row matched.
    async fn write_if_current(
        &self,
        key: RecordKey,
        expected: &Self::Token,
        changes: &Self::Changes,
    ) -> Result<Option<Self::Record>, Self::Error>;

    /// Read the current record by key, without any token predicate.
    async fn read(&self, key: RecordKey) -> Result<Option<Self::Record>, Self::Error>;
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why an update was not applied.
///
/// `R` is the record type, `C` the changeset type and `E` the store error.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError<R, C, E> {
    /// No recognized field was supplied. Raised before any I/O.
    #[error("No fields to update")]
    NoOpRequest,

    /// A supplied value failed type/range checks. Raised before any I/O.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The record does not exist in the given scope.
    #[error("Record not found")]
    NotFound,

    /// The supplied token is stale. Carries the authoritative current record
    /// and echoes back the rejected changes.
    #[error("Record was modified by another writer")]
    Conflict { current: R, attempted: C },

    /// The store failed. Safe to retry the whole operation with a freshly
    /// read token; never retried here.
    #[error("Storage error: {0}")]
    Store(#[source] E),
}

impl<R, C, E> UpdateError<R, C, E> {
    /// `true` only for storage failures. Conflicts are routine outcomes and
    /// must be reconciled, not retried blindly.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Result of [`attempt_update`] for a given store.
pub type UpdateResult<S> = Result<
    <S as VersionedStore>::Record,
    UpdateError<
        <S as VersionedStore>::Record,
        <S as VersionedStore>::Changes,
        <S as VersionedStore>::Error,
    >,
>;

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

/// Attempt a conditional update of the record at `key`.
///
/// 1. Reject empty or invalid changesets without touching the store.
/// 2. Issue one atomic conditional write keyed by id, scope and token.
/// 3. If nothing matched, read by id and scope alone to tell a missing
///    record apart from a stale token.
///
/// The follow-up read is not atomic with the write: a record deleted between
/// the two statements is reported as [`UpdateError::NotFound`], which is
/// accurate as of the read.
pub async fn attempt_update<S>(
    store: &S,
    key: RecordKey,
    expected: &S::Token,
    changes: S::Changes,
) -> UpdateResult<S>
where
    S: VersionedStore + ?Sized,
{
    if changes.is_empty() {
        return Err(UpdateError::NoOpRequest);
    }
    changes.validate().map_err(UpdateError::Validation)?;

    if let Some(updated) = store
        .write_if_current(key, expected, &changes)
        .await
        .map_err(UpdateError::Store)?
    {
        return Ok(updated);
    }

    match store.read(key).await.map_err(UpdateError::Store)? {
        None => Err(UpdateError::NotFound),
        Some(current) => Err(UpdateError::Conflict {
            current,
            attempted: changes,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
