//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Conference-scoped repositories
//! require a `conference_id` parameter on every operation to enforce
//! tenant isolation: a row whose conference does not match is reported
//! as not-found, indistinguishable from true absence.

use uuid::Uuid;

use crate::error::SymposiaResult;
use crate::models::{
    abstracts::{Abstract, AbstractFilter, CreateAbstract, UpdateAbstract},
    conference::{Conference, ConferenceStatus, CreateConference, UpdateConference},
    organization::{CreateOrganization, Organization, UpdateOrganization},
    review::{CreateReview, Review, ReviewAggregate, ReviewFilter, UpdateReview},
    role_assignment::{AssignRole, ConferenceMember, ConferenceMembership, RoleAssignment},
    schedule::{CreateScheduleItem, ScheduleItem, UpdateScheduleItem},
    session::{CreateSession, Session},
    settings::{ConferenceSettings, SettingsInput},
    user::{CreateUser, UpdateUser, User},
};
use crate::models::abstracts::AbstractStatus;
use crate::permission::{ConferenceRole, Feature};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 30,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Platform-global repositories
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Create a user. The raw password is hashed before storage and the
    /// default feature template is applied.
    fn create(&self, input: CreateUser) -> impl Future<Output = SymposiaResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SymposiaResult<User>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = SymposiaResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = SymposiaResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = SymposiaResult<User>> + Send;
    /// Append features to the user's flag set (deduplicated).
    fn grant_features(
        &self,
        id: Uuid,
        features: &[Feature],
    ) -> impl Future<Output = SymposiaResult<User>> + Send;
    /// Soft-delete: sets status to Inactive. Accounts are never removed.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = SymposiaResult<()>> + Send;
}

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = SymposiaResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SymposiaResult<Organization>> + Send;
    fn get_by_slug(&self, slug: &str)
    -> impl Future<Output = SymposiaResult<Organization>> + Send;
    fn list_by_owner(
        &self,
        owner_id: Uuid,
    ) -> impl Future<Output = SymposiaResult<Vec<Organization>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = SymposiaResult<Organization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = SymposiaResult<()>> + Send;
}

/// Optional filters for listing conferences.
#[derive(Debug, Clone, Default)]
pub struct ConferenceFilter {
    pub status: Option<ConferenceStatus>,
    pub organizer_id: Option<Uuid>,
}

pub trait ConferenceRepository: Send + Sync {
    /// Create a conference. Validates `start_date <= end_date`, generates
    /// a unique slug, and atomically assigns the organizer role to the
    /// creator in the same store transaction.
    fn create(
        &self,
        input: CreateConference,
    ) -> impl Future<Output = SymposiaResult<Conference>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SymposiaResult<Conference>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = SymposiaResult<Conference>> + Send;
    fn list(
        &self,
        filter: ConferenceFilter,
        pagination: Pagination,
    ) -> impl Future<Output = SymposiaResult<PaginatedResult<Conference>>> + Send;
    /// Update a conference. A status change must be a legal lifecycle
    /// transition or the call fails with a validation error.
    fn update(
        &self,
        id: Uuid,
        input: UpdateConference,
    ) -> impl Future<Output = SymposiaResult<Conference>> + Send;
    /// Delete a conference together with every row scoped to it (role
    /// assignments, abstracts, reviews, schedule items, settings) in one
    /// transaction.
    fn delete(&self, id: Uuid) -> impl Future<Output = SymposiaResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Role assignments
// ---------------------------------------------------------------------------

pub trait RoleAssignmentRepository: Send + Sync {
    /// Insert or replace the assignment for `(user, conference, role)`.
    ///
    /// Re-assigning an existing role replaces its permission set with the
    /// new effective set; the upsert is a single atomic statement, never
    /// read-then-write.
    fn assign(
        &self,
        input: AssignRole,
    ) -> impl Future<Output = SymposiaResult<RoleAssignment>> + Send;

    /// Remove the assignment for `(user, conference, role)`. A no-op when
    /// no such assignment exists.
    fn remove(
        &self,
        user_id: Uuid,
        conference_id: Uuid,
        role: ConferenceRole,
    ) -> impl Future<Output = SymposiaResult<()>> + Send;

    /// All roles a user holds in one conference.
    fn user_roles_in_conference(
        &self,
        user_id: Uuid,
        conference_id: Uuid,
    ) -> impl Future<Output = SymposiaResult<Vec<RoleAssignment>>> + Send;

    /// All members of a conference, joined with their public identity.
    fn conference_members(
        &self,
        conference_id: Uuid,
    ) -> impl Future<Output = SymposiaResult<Vec<ConferenceMember>>> + Send;

    /// All conferences a user belongs to, optionally restricted to one
    /// role.
    fn user_conferences(
        &self,
        user_id: Uuid,
        role: Option<ConferenceRole>,
    ) -> impl Future<Output = SymposiaResult<Vec<ConferenceMembership>>> + Send;
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession)
    -> impl Future<Output = SymposiaResult<Session>> + Send;
    /// Look up a session by token hash, rejecting expired ones in the
    /// query itself.
    fn find_valid_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = SymposiaResult<Session>> + Send;
    /// Invalidate a single session (logout). A no-op when absent.
    fn delete_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = SymposiaResult<()>> + Send;
    /// Invalidate all sessions for a user (e.g. on password change).
    fn delete_by_user(&self, user_id: Uuid) -> impl Future<Output = SymposiaResult<()>> + Send;
    /// Remove all expired sessions; returns the number removed.
    fn delete_expired(&self) -> impl Future<Output = SymposiaResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Conference-scoped accessors
// ---------------------------------------------------------------------------

pub trait AbstractRepository: Send + Sync {
    fn create(
        &self,
        conference_id: Uuid,
        input: CreateAbstract,
    ) -> impl Future<Output = SymposiaResult<Abstract>> + Send;
    fn get_by_id(
        &self,
        conference_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SymposiaResult<Abstract>> + Send;
    fn find_all(
        &self,
        conference_id: Uuid,
        filter: AbstractFilter,
        pagination: Pagination,
    ) -> impl Future<Output = SymposiaResult<Vec<Abstract>>> + Send;
    fn update(
        &self,
        conference_id: Uuid,
        id: Uuid,
        input: UpdateAbstract,
    ) -> impl Future<Output = SymposiaResult<Abstract>> + Send;
    /// Move a submission through the review pipeline (organizer action).
    fn update_status(
        &self,
        conference_id: Uuid,
        id: Uuid,
        status: AbstractStatus,
    ) -> impl Future<Output = SymposiaResult<Abstract>> + Send;
    fn delete(
        &self,
        conference_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SymposiaResult<()>> + Send;
}

pub trait ReviewRepository: Send + Sync {
    /// Create a review. Fails with not-found when the abstract does not
    /// belong to the given conference.
    fn create(
        &self,
        conference_id: Uuid,
        input: CreateReview,
    ) -> impl Future<Output = SymposiaResult<Review>> + Send;
    fn get_by_id(
        &self,
        conference_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SymposiaResult<Review>> + Send;
    fn find_all(
        &self,
        conference_id: Uuid,
        filter: ReviewFilter,
        pagination: Pagination,
    ) -> impl Future<Output = SymposiaResult<Vec<Review>>> + Send;
    fn by_abstract(
        &self,
        conference_id: Uuid,
        abstract_id: Uuid,
    ) -> impl Future<Output = SymposiaResult<Vec<Review>>> + Send;
    fn update(
        &self,
        conference_id: Uuid,
        id: Uuid,
        input: UpdateReview,
    ) -> impl Future<Output = SymposiaResult<Review>> + Send;
    fn delete(
        &self,
        conference_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SymposiaResult<()>> + Send;
    /// Average score and review count for one abstract.
    fn average_score(
        &self,
        conference_id: Uuid,
        abstract_id: Uuid,
    ) -> impl Future<Output = SymposiaResult<ReviewAggregate>> + Send;
}

pub trait ScheduleRepository: Send + Sync {
    fn create(
        &self,
        conference_id: Uuid,
        input: CreateScheduleItem,
    ) -> impl Future<Output = SymposiaResult<ScheduleItem>> + Send;
    fn get_by_id(
        &self,
        conference_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SymposiaResult<ScheduleItem>> + Send;
    /// Items ordered by start time.
    fn find_all(
        &self,
        conference_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = SymposiaResult<Vec<ScheduleItem>>> + Send;
    fn update(
        &self,
        conference_id: Uuid,
        id: Uuid,
        input: UpdateScheduleItem,
    ) -> impl Future<Output = SymposiaResult<ScheduleItem>> + Send;
    fn delete(
        &self,
        conference_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SymposiaResult<()>> + Send;
}

pub trait SettingsRepository: Send + Sync {
    /// Create the settings row for a conference, merging `input` over the
    /// defaults. Fails when the conference already has settings.
    fn create(
        &self,
        conference_id: Uuid,
        input: SettingsInput,
    ) -> impl Future<Output = SymposiaResult<ConferenceSettings>> + Send;
    fn get(
        &self,
        conference_id: Uuid,
    ) -> impl Future<Output = SymposiaResult<ConferenceSettings>> + Send;
    fn update(
        &self,
        conference_id: Uuid,
        input: SettingsInput,
    ) -> impl Future<Output = SymposiaResult<ConferenceSettings>> + Send;
}
