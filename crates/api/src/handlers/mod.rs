pub mod deal;
pub mod qa_item;
