//! Q&A item model, DTOs, and the changeset used for versioned updates.

use dealroom_core::concurrency::Changeset;
use dealroom_core::qa;
use dealroom_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A row from the `qa_items` table.
///
/// `updated_at` is the version token for optimistic concurrency. Clients
/// must echo it back unchanged as `expected_updated_at` when editing.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct QaItem {
    pub id: DbId,
    pub deal_id: DbId,
    pub question: String,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub priority: String,
    pub status: String,
    pub created_by: DbId,
    pub answered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QaItem {
    /// `true` if the write that produced this row is the one that moved the
    /// answer from empty to present.
    ///
    /// The repository stamps `answered_at` with the same value as the new
    /// version token on that transition, and never again until the answer is
    /// cleared.
    pub fn was_just_answered(&self) -> bool {
        self.answered_at == Some(self.updated_at)
    }
}

/// DTO for creating a new Q&A item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQaItem {
    pub question: String,
    pub answer: Option<String>,
    pub category: Option<String>,
    /// Defaults to `medium` if omitted.
    pub priority: Option<String>,
}

impl CreateQaItem {
    pub fn validate(&self) -> Result<(), String> {
        qa::validate_question(&self.question)?;
        if let Some(answer) = &self.answer {
            qa::validate_answer(answer)?;
        }
        if let Some(category) = &self.category {
            qa::validate_category(category)?;
        }
        if let Some(priority) = &self.priority {
            qa::validate_priority(priority)?;
        }
        Ok(())
    }
}

/// Proposed changes to a Q&A item. All fields are optional.
///
/// Nullable columns use `Option<Option<_>>`: an absent key leaves the value
/// alone, an explicit `null` clears it. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UpdateQaItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub answer: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Changeset for UpdateQaItem {
    fn is_empty(&self) -> bool {
        self.question.is_none()
            && self.answer.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(question) = &self.question {
            qa::validate_question(question)?;
        }
        if let Some(Some(answer)) = &self.answer {
            qa::validate_answer(answer)?;
        }
        if let Some(Some(category)) = &self.category {
            qa::validate_category(category)?;
        }
        if let Some(priority) = &self.priority {
            qa::validate_priority(priority)?;
        }
        if let Some(status) = &self.status {
            qa::validate_status(status)?;
        }
        Ok(())
    }
}

/// Request body for `PUT /deals/{deal_id}/qa-items/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQaItemRequest {
    /// The `updated_at` value the caller last observed. Required.
    pub expected_updated_at: Option<Timestamp>,
    #[serde(flatten)]
    pub changes: UpdateQaItem,
}

/// Query parameters for listing Q&A items in a deal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QaItemFilter {
    pub status: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Deserialize a present key into `Some(value)`, including `null` into
/// `Some(None)`. Paired with `#[serde(default)]` for the absent case.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
