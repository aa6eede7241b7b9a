//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod deal_repo;
pub mod event_repo;
pub mod qa_item_repo;

pub use deal_repo::DealRepo;
pub use event_repo::EventRepo;
pub use qa_item_repo::QaItemRepo;

/// Default page size for list queries.
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 500;

/// Clamp a caller-supplied limit into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a caller-supplied offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
