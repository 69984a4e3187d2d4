//! Role assignment domain model.
//!
//! An assignment is the tuple `(user_id, conference_id, role,
//! permissions)`. Its identity is the triple `(user_id, conference_id,
//! role)`: a user may hold several distinct roles in the same conference,
//! each contributing its own permission set, but never the same role
//! twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::conference::Conference;
use crate::permission::{ConferenceRole, PermissionSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user_id: Uuid,
    pub conference_id: Uuid,
    pub role: ConferenceRole,
    /// The granted capability set. Defaults to the role template; a
    /// custom grant replaces it wholesale.
    pub permissions: PermissionSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for assigning (or re-assigning) a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRole {
    pub user_id: Uuid,
    pub conference_id: Uuid,
    pub role: ConferenceRole,
    /// When absent, the role's default template applies. When present,
    /// this exact set is stored, not a union with the template.
    pub custom_permissions: Option<PermissionSet>,
}

impl AssignRole {
    /// The permission set this assignment will carry.
    pub fn effective_permissions(&self) -> PermissionSet {
        self.custom_permissions
            .clone()
            .unwrap_or_else(|| self.role.template_set())
    }
}

/// A conference member as shown on role-management surfaces: the
/// assignment joined with the user's public identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConferenceMember {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: ConferenceRole,
    pub permissions: PermissionSet,
    pub created_at: DateTime<Utc>,
}

/// A conference a user belongs to, with the role held there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConferenceMembership {
    pub conference: Conference,
    pub role: ConferenceRole,
    pub permissions: PermissionSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Permission;

    #[test]
    fn effective_permissions_default_to_template() {
        let input = AssignRole {
            user_id: Uuid::new_v4(),
            conference_id: Uuid::new_v4(),
            role: ConferenceRole::Reviewer,
            custom_permissions: None,
        };
        assert_eq!(
            input.effective_permissions(),
            ConferenceRole::Reviewer.template_set()
        );
    }

    #[test]
    fn custom_permissions_replace_template() {
        let custom: PermissionSet = [Permission::ReadConference].into_iter().collect();
        let input = AssignRole {
            user_id: Uuid::new_v4(),
            conference_id: Uuid::new_v4(),
            role: ConferenceRole::Reviewer,
            custom_permissions: Some(custom.clone()),
        };
        assert_eq!(input.effective_permissions(), custom);
    }
}
