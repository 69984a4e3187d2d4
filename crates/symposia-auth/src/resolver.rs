//! Permission resolution for a (user, conference) pair.

use symposia_core::error::SymposiaResult;
use symposia_core::permission::{Permission, PermissionSet};
use symposia_core::repository::RoleAssignmentRepository;
use uuid::Uuid;

/// Computes the effective permission set of a user within a conference.
///
/// Stateless and cache-free: every check re-reads the current
/// assignment state, so a revoked role is gone from the very next
/// check, including on already-issued sessions.
#[derive(Clone)]
pub struct PermissionResolver<R: RoleAssignmentRepository> {
    assignments: R,
}

impl<R: RoleAssignmentRepository> PermissionResolver<R> {
    pub fn new(assignments: R) -> Self {
        Self { assignments }
    }

    /// The underlying assignment store, for the gate's context view.
    pub(crate) fn assignments(&self) -> &R {
        &self.assignments
    }

    /// Union of the permission sets of every role the user holds in the
    /// conference, deduplicated.
    ///
    /// A nil conference id resolves to the empty set (fail-closed), not
    /// an error: "no conference" simply grants nothing.
    pub async fn permissions_in_conference(
        &self,
        user_id: Uuid,
        conference_id: Uuid,
    ) -> SymposiaResult<PermissionSet> {
        if conference_id.is_nil() {
            return Ok(PermissionSet::new());
        }

        let assignments = self
            .assignments
            .user_roles_in_conference(user_id, conference_id)
            .await?;

        Ok(assignments
            .into_iter()
            .flat_map(|a| a.permissions)
            .collect())
    }

    /// Set membership in the resolved permission set.
    pub async fn has_permission(
        &self,
        user_id: Uuid,
        conference_id: Uuid,
        permission: Permission,
    ) -> SymposiaResult<bool> {
        let permissions = self
            .permissions_in_conference(user_id, conference_id)
            .await?;
        Ok(permissions.contains(&permission))
    }
}
