//! Deal and membership constants and validation.
//!
//! A deal is the tenant scope: every Q&A item belongs to exactly one deal and
//! only members of that deal may see or edit it.

/// Membership roles.
pub mod roles {
    /// Created the deal; may manage membership.
    pub const OWNER: &str = "owner";
    /// Regular collaborator.
    pub const MEMBER: &str = "member";
}

/// The set of all valid membership roles.
pub const VALID_ROLES: &[&str] = &[roles::OWNER, roles::MEMBER];

pub const MAX_DEAL_NAME_LEN: usize = 200;

/// Event types published for deal lifecycle changes.
pub mod events {
    pub const CREATED: &str = "deal.created";
    pub const MEMBER_ADDED: &str = "deal.member_added";
}

pub fn validate_deal_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be empty".into());
    }
    if name.chars().count() > MAX_DEAL_NAME_LEN {
        return Err(format!("name must be at most {MAX_DEAL_NAME_LEN} characters"));
    }
    Ok(())
}

pub fn validate_role(role: &str) -> Result<(), String> {
    if !VALID_ROLES.contains(&role) {
        return Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ));
    }
    Ok(())
}
