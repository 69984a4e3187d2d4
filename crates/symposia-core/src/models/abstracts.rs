//! Abstract (submission) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbstractStatus {
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
}

impl AbstractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbstractStatus::Submitted => "submitted",
            AbstractStatus::UnderReview => "under_review",
            AbstractStatus::Accepted => "accepted",
            AbstractStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Abstract {
    pub id: Uuid,
    /// Owning conference; immutable after creation.
    pub conference_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub keywords: Vec<String>,
    pub status: AbstractStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new submission. The owning conference is passed to the
/// accessor separately and is never optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAbstract {
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAbstract {
    pub title: Option<String>,
    pub content: Option<String>,
    pub keywords: Option<Vec<String>>,
}

/// Optional filters for listing abstracts within one conference.
#[derive(Debug, Clone, Default)]
pub struct AbstractFilter {
    pub author_id: Option<Uuid>,
    pub status: Option<AbstractStatus>,
}
