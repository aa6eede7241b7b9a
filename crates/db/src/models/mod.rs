//! Row types and DTOs, one submodule per table family.

pub mod deal;
pub mod event;
pub mod qa_item;
