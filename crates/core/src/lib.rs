//! Domain building blocks shared by every dealroom crate.
//!
//! Nothing in here performs I/O directly. Storage and transport concerns are
//! reached through traits (see [`concurrency::VersionedStore`]) so that the
//! database layer and tests can plug in their own implementations.

pub mod concurrency;
pub mod deal;
pub mod error;
pub mod qa;
pub mod retry;
pub mod types;
