//! Q&A tracker constants and validation.
//!
//! Lives in `core` so the repository layer, the HTTP handlers and the
//! changeset used by the concurrency protocol share the same rules.

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Known Q&A item statuses.
pub mod statuses {
    pub const OPEN: &str = "open";
    pub const ANSWERED: &str = "answered";
    pub const CLOSED: &str = "closed";
}

/// The set of all valid statuses.
pub const VALID_STATUSES: &[&str] = &[statuses::OPEN, statuses::ANSWERED, statuses::CLOSED];

// ---------------------------------------------------------------------------
// Priorities
// ---------------------------------------------------------------------------

/// Known Q&A item priorities.
pub mod priorities {
    pub const HIGH: &str = "high";
    pub const MEDIUM: &str = "medium";
    pub const LOW: &str = "low";
}

/// The set of all valid priorities.
pub const VALID_PRIORITIES: &[&str] = &[priorities::HIGH, priorities::MEDIUM, priorities::LOW];

/// Priority assigned when none is supplied on create.
pub const DEFAULT_PRIORITY: &str = priorities::MEDIUM;

// ---------------------------------------------------------------------------
// Length limits
// ---------------------------------------------------------------------------

pub const MAX_QUESTION_LEN: usize = 4_000;
pub const MAX_ANSWER_LEN: usize = 20_000;
pub const MAX_CATEGORY_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// Event types published for Q&A item lifecycle changes.
pub mod events {
    pub const CREATED: &str = "qa_item.created";
    pub const ANSWERED: &str = "qa_item.answered";
    pub const DELETED: &str = "qa_item.deleted";
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

pub fn validate_question(question: &str) -> Result<(), String> {
    if question.trim().is_empty() {
        return Err("question must not be empty".into());
    }
    if question.chars().count() > MAX_QUESTION_LEN {
        return Err(format!(
            "question must be at most {MAX_QUESTION_LEN} characters"
        ));
    }
    Ok(())
}

pub fn validate_answer(answer: &str) -> Result<(), String> {
    if answer.trim().is_empty() {
        return Err("answer must not be blank; send null to clear it".into());
    }
    if answer.chars().count() > MAX_ANSWER_LEN {
        return Err(format!("answer must be at most {MAX_ANSWER_LEN} characters"));
    }
    Ok(())
}

pub fn validate_category(category: &str) -> Result<(), String> {
    if category.trim().is_empty() {
        return Err("category must not be blank; send null to clear it".into());
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(format!(
            "category must be at most {MAX_CATEGORY_LEN} characters"
        ));
    }
    Ok(())
}

pub fn validate_priority(priority: &str) -> Result<(), String> {
    if !VALID_PRIORITIES.contains(&priority) {
        return Err(format!(
            "Invalid priority '{priority}'. Must be one of: {}",
            VALID_PRIORITIES.join(", ")
        ));
    }
    Ok(())
}

pub fn validate_status(status: &str) -> Result<(), String> {
    if !VALID_STATUSES.contains(&status) {
        return Err(format!(
            "Invalid status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ));
    }
    Ok(())
}

/// Status a newly created item starts in.
pub fn initial_status(answer: Option<&str>) -> &'static str {
    if answer.is_some() {
        statuses::ANSWERED
    } else {
        statuses::OPEN
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
