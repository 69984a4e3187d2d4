//! Conference domain model.
//!
//! The conference is the tenant boundary of the system: every abstract,
//! review, schedule item, settings row, and role assignment carries a
//! non-null, immutable `conference_id`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conference lifecycle.
///
/// `Draft → Upcoming → Ongoing → Completed`; `Cancelled` is reachable
/// from any non-terminal state. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConferenceStatus {
    Draft,
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl ConferenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConferenceStatus::Draft => "draft",
            ConferenceStatus::Upcoming => "upcoming",
            ConferenceStatus::Ongoing => "ongoing",
            ConferenceStatus::Completed => "completed",
            ConferenceStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a transition from `self` to `next` is legal.
    ///
    /// Setting the current status again is a no-op and always allowed.
    pub fn can_transition_to(&self, next: ConferenceStatus) -> bool {
        use ConferenceStatus::*;
        if *self == next {
            return true;
        }
        match self {
            Draft => matches!(next, Upcoming | Cancelled),
            Upcoming => matches!(next, Ongoing | Cancelled),
            Ongoing => matches!(next, Completed | Cancelled),
            Completed | Cancelled => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conference {
    pub id: Uuid,
    pub title: String,
    /// URL-safe unique identifier, generated from the title.
    pub slug: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    /// Invariant: `start_date <= end_date`, enforced at creation.
    pub end_date: NaiveDate,
    pub submission_deadline: Option<NaiveDate>,
    /// The creating user; also receives the organizer role assignment.
    pub organizer_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub status: ConferenceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new conference. The slug is derived from
/// `title` and uniquified by the store; the status starts at `Draft`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConference {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub submission_deadline: Option<NaiveDate>,
    pub organizer_id: Uuid,
    pub organization_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateConference {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// `Some(Some(d))` = set, `Some(None)` = clear, `None` = no change.
    pub submission_deadline: Option<Option<NaiveDate>>,
    pub status: Option<ConferenceStatus>,
}

#[cfg(test)]
mod tests {
    use super::ConferenceStatus::*;

    #[test]
    fn forward_transitions_allowed() {
        assert!(Draft.can_transition_to(Upcoming));
        assert!(Upcoming.can_transition_to(Ongoing));
        assert!(Ongoing.can_transition_to(Completed));
    }

    #[test]
    fn cancellation_from_any_nonterminal() {
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Upcoming.can_transition_to(Cancelled));
        assert!(Ongoing.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_are_final() {
        assert!(!Completed.can_transition_to(Ongoing));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Draft));
        assert!(!Cancelled.can_transition_to(Upcoming));
    }

    #[test]
    fn no_skipping_or_rewinding() {
        assert!(!Draft.can_transition_to(Ongoing));
        assert!(!Draft.can_transition_to(Completed));
        assert!(!Ongoing.can_transition_to(Upcoming));
        assert!(!Upcoming.can_transition_to(Draft));
    }

    #[test]
    fn same_status_is_noop() {
        assert!(Draft.can_transition_to(Draft));
        assert!(Completed.can_transition_to(Completed));
    }
}
