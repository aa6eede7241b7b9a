pub mod auth;
pub mod deal_access;
