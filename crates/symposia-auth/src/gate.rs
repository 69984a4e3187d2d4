//! The conference authorization gate.
//!
//! Every conference-scoped handler authorizes through this single
//! choke-point before touching domain data, passing the same
//! `conference_id` to the check and to the subsequent accessor call.
//! The gate binds identity, conference, and action together; accessors
//! then enforce tenant scoping on the data itself.
//!
//! Authorization outcomes are booleans, never errors: a missing,
//! expired, or malformed session, an unknown user, an insufficient
//! permission, and a store failure all degrade to "denied". Callers map
//! denial to 401/403 at the boundary.

use symposia_core::error::SymposiaError;
use symposia_core::models::role_assignment::RoleAssignment;
use symposia_core::models::user::User;
use symposia_core::permission::{Feature, Permission, PermissionSet};
use symposia_core::repository::{
    RoleAssignmentRepository, SessionRepository, UserRepository,
};
use tracing::debug;
use uuid::Uuid;

use crate::request::RequestIdentity;
use crate::resolver::PermissionResolver;
use crate::token;

/// Aggregate view of a user's standing in one conference, for role
/// management and profile surfaces. Not used by the gate's own
/// decisions.
#[derive(Debug, Clone)]
pub struct UserConferenceContext {
    pub user: User,
    pub roles: Vec<RoleAssignment>,
    pub permissions: PermissionSet,
}

/// Stateless composition of session registry, user store, and
/// permission resolver. Constructed once at process start and shared by
/// reference; holds no mutable state of its own.
#[derive(Clone)]
pub struct AuthorizationGate<U, S, R>
where
    U: UserRepository,
    S: SessionRepository,
    R: RoleAssignmentRepository,
{
    users: U,
    sessions: S,
    resolver: PermissionResolver<R>,
}

impl<U, S, R> AuthorizationGate<U, S, R>
where
    U: UserRepository,
    S: SessionRepository,
    R: RoleAssignmentRepository,
{
    pub fn new(users: U, sessions: S, assignments: R) -> Self {
        Self {
            users,
            sessions,
            resolver: PermissionResolver::new(assignments),
        }
    }

    pub fn resolver(&self) -> &PermissionResolver<R> {
        &self.resolver
    }

    /// Platform-global check against the user's feature flags, for
    /// actions with no conference context (e.g. creating a conference
    /// at all).
    pub async fn can_request(&self, feature: Feature, identity: &RequestIdentity) -> bool {
        match self.resolve_user(identity).await {
            Some(user) => user.features.contains(&feature),
            None => false,
        }
    }

    /// Conference-scoped check: resolves the session to a user, then
    /// asks the resolver whether that user holds `permission` in
    /// `conference_id`.
    pub async fn can_request_in_conference(
        &self,
        permission: Permission,
        conference_id: Uuid,
        identity: &RequestIdentity,
    ) -> bool {
        let Some(user) = self.resolve_user(identity).await else {
            return false;
        };

        match self
            .resolver
            .has_permission(user.id, conference_id, permission)
            .await
        {
            Ok(granted) => granted,
            Err(e) => {
                debug!(error = %e, "permission resolution failed; denying");
                false
            }
        }
    }

    /// The acting user behind a request, for accessors that stamp
    /// `author_id`/`reviewer_id`. `None` on any authentication failure.
    pub async fn user_from_request(&self, identity: &RequestIdentity) -> Option<User> {
        self.resolve_user(identity).await
    }

    /// The user's full standing in one conference: identity, role
    /// assignments, and resolved permission union.
    pub async fn user_conference_context(
        &self,
        identity: &RequestIdentity,
        conference_id: Uuid,
    ) -> Option<UserConferenceContext> {
        let user = self.resolve_user(identity).await?;

        let roles = match self
            .resolver
            .assignments()
            .user_roles_in_conference(user.id, conference_id)
            .await
        {
            Ok(roles) => roles,
            Err(SymposiaError::ConferenceContext) => Vec::new(),
            Err(e) => {
                debug!(error = %e, "role lookup failed");
                return None;
            }
        };

        let permissions = roles.iter().flat_map(|r| r.permissions.clone()).collect();

        Some(UserConferenceContext {
            user,
            roles,
            permissions,
        })
    }

    /// Resolve the session token to its user. Every failure mode
    /// (absent token, unknown or expired session, missing user, store
    /// error) collapses to `None`.
    async fn resolve_user(&self, identity: &RequestIdentity) -> Option<User> {
        let raw_token = identity.session_token()?;
        let token_hash = token::hash_session_token(raw_token);

        let session = match self.sessions.find_valid_by_token_hash(&token_hash).await {
            Ok(session) => session,
            Err(SymposiaError::NotFound { .. }) => return None,
            Err(e) => {
                debug!(error = %e, "session lookup failed; treating as unauthenticated");
                return None;
            }
        };

        match self.users.get_by_id(session.user_id).await {
            Ok(user) => Some(user),
            Err(SymposiaError::NotFound { .. }) => None,
            Err(e) => {
                debug!(error = %e, "user lookup failed; treating as unauthenticated");
                None
            }
        }
    }
}
