//! Review domain model.
//!
//! A review belongs to an abstract and, through it, to exactly one
//! conference. The `conference_id` is denormalized onto the review so
//! every query can scope on it directly; creation verifies the abstract
//! actually belongs to the stated conference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Accept,
    Revise,
    Reject,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Accept => "accept",
            Recommendation::Revise => "revise",
            Recommendation::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    /// Owning conference; immutable after creation.
    pub conference_id: Uuid,
    pub abstract_id: Uuid,
    pub reviewer_id: Uuid,
    pub score: i64,
    pub comments: Option<String>,
    pub recommendation: Recommendation,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    pub abstract_id: Uuid,
    pub reviewer_id: Uuid,
    pub score: i64,
    pub comments: Option<String>,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateReview {
    pub score: Option<i64>,
    pub comments: Option<String>,
    pub recommendation: Option<Recommendation>,
}

/// Optional filters for listing reviews within one conference.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub abstract_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
}

/// Aggregate over the reviews of one abstract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAggregate {
    pub average_score: Option<f64>,
    pub total_reviews: u64,
}
