//! SurrealDB implementation of [`RoleAssignmentRepository`].
//!
//! The record id of a `conference_role` row IS the composite key
//! `user:conference:role`, so assigning is a single `UPSERT` on that
//! record: an atomic insert-or-update with no read-then-write window.
//! A unique index on the triple backstops the invariant.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use symposia_core::error::SymposiaResult;
use symposia_core::models::role_assignment::{
    AssignRole, ConferenceMember, ConferenceMembership, RoleAssignment,
};
use symposia_core::permission::ConferenceRole;
use symposia_core::repository::RoleAssignmentRepository;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::conference::ConferenceRowWithId;
use crate::repository::{check_response, parse_permissions, parse_uuid, require_conference};

/// Composite record key for the `(user, conference, role)` triple.
pub(crate) fn triple_key(user_id: Uuid, conference_id: Uuid, role: ConferenceRole) -> String {
    format!("{user_id}:{conference_id}:{}", role.as_str())
}

#[derive(Debug, SurrealValue)]
struct RoleRow {
    user_id: String,
    conference_id: String,
    role: String,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<ConferenceRole, DbError> {
    s.parse::<ConferenceRole>()
        .map_err(|e| DbError::Decode(e.to_string()))
}

impl RoleRow {
    fn try_into_assignment(self) -> Result<RoleAssignment, DbError> {
        Ok(RoleAssignment {
            user_id: parse_uuid(&self.user_id, "user")?,
            conference_id: parse_uuid(&self.conference_id, "conference")?,
            role: parse_role(&self.role)?,
            permissions: parse_permissions(&self.permissions)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Projection used when joining members with their user identity.
#[derive(Debug, SurrealValue)]
struct MemberIdentityRow {
    record_id: String,
    username: String,
    email: String,
}

/// SurrealDB implementation of the role assignment store.
#[derive(Clone)]
pub struct SurrealRoleAssignmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleAssignmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleAssignmentRepository for SurrealRoleAssignmentRepository<C> {
    async fn assign(&self, input: AssignRole) -> SymposiaResult<RoleAssignment> {
        require_conference(input.conference_id)?;

        let key = triple_key(input.user_id, input.conference_id, input.role);
        let permissions: Vec<String> = input
            .effective_permissions()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();

        // Single-statement upsert: re-assigning the same role replaces
        // its permission set instead of erroring or duplicating.
        let result = self
            .db
            .query(
                "UPSERT type::record('conference_role', $key) SET \
                 user_id = $user_id, conference_id = $conference_id, \
                 role = $role, permissions = $permissions, \
                 updated_at = time::now()",
            )
            .bind(("key", key.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("conference_id", input.conference_id.to_string()))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("permissions", permissions))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response(result, "role assignment")?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "conference_role".into(),
            id: key,
        })?;

        Ok(row.try_into_assignment()?)
    }

    async fn remove(
        &self,
        user_id: Uuid,
        conference_id: Uuid,
        role: ConferenceRole,
    ) -> SymposiaResult<()> {
        require_conference(conference_id)?;

        let key = triple_key(user_id, conference_id, role);

        // Deliberately a no-op when no such assignment exists.
        self.db
            .query("DELETE type::record('conference_role', $key)")
            .bind(("key", key))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn user_roles_in_conference(
        &self,
        user_id: Uuid,
        conference_id: Uuid,
    ) -> SymposiaResult<Vec<RoleAssignment>> {
        require_conference(conference_id)?;

        let mut result = self
            .db
            .query(
                "SELECT * FROM conference_role \
                 WHERE conference_id = $conference_id \
                 AND user_id = $user_id",
            )
            .bind(("conference_id", conference_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;

        let assignments = rows
            .into_iter()
            .map(|row| row.try_into_assignment())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(assignments)
    }

    async fn conference_members(
        &self,
        conference_id: Uuid,
    ) -> SymposiaResult<Vec<ConferenceMember>> {
        require_conference(conference_id)?;

        let mut result = self
            .db
            .query(
                "SELECT * FROM conference_role \
                 WHERE conference_id = $conference_id \
                 ORDER BY created_at DESC",
            )
            .bind(("conference_id", conference_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let role_rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        if role_rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut user_ids: Vec<String> = role_rows.iter().map(|r| r.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, username, email \
                 FROM user WHERE meta::id(id) IN $user_ids",
            )
            .bind(("user_ids", user_ids))
            .await
            .map_err(DbError::from)?;

        let identity_rows: Vec<MemberIdentityRow> = result.take(0).map_err(DbError::from)?;
        let identities: std::collections::HashMap<String, (String, String)> = identity_rows
            .into_iter()
            .map(|r| (r.record_id, (r.username, r.email)))
            .collect();

        let mut members = Vec::with_capacity(role_rows.len());
        for row in role_rows {
            let (username, email) =
                identities
                    .get(&row.user_id)
                    .cloned()
                    .ok_or_else(|| DbError::NotFound {
                        entity: "user".into(),
                        id: row.user_id.clone(),
                    })?;
            let assignment = row.try_into_assignment()?;
            members.push(ConferenceMember {
                user_id: assignment.user_id,
                username,
                email,
                role: assignment.role,
                permissions: assignment.permissions,
                created_at: assignment.created_at,
            });
        }

        Ok(members)
    }

    async fn user_conferences(
        &self,
        user_id: Uuid,
        role: Option<ConferenceRole>,
    ) -> SymposiaResult<Vec<ConferenceMembership>> {
        let query = if role.is_some() {
            "SELECT * FROM conference_role \
             WHERE user_id = $user_id AND role = $role"
        } else {
            "SELECT * FROM conference_role WHERE user_id = $user_id"
        };

        let mut builder = self
            .db
            .query(query)
            .bind(("user_id", user_id.to_string()));
        if let Some(role) = role {
            builder = builder.bind(("role", role.as_str().to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let role_rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        if role_rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut conference_ids: Vec<String> =
            role_rows.iter().map(|r| r.conference_id.clone()).collect();
        conference_ids.sort();
        conference_ids.dedup();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM conference \
                 WHERE meta::id(id) IN $conference_ids",
            )
            .bind(("conference_ids", conference_ids))
            .await
            .map_err(DbError::from)?;

        let conference_rows: Vec<ConferenceRowWithId> = result.take(0).map_err(DbError::from)?;
        let conferences: std::collections::HashMap<Uuid, _> = conference_rows
            .into_iter()
            .map(|row| row.try_into_conference().map(|c| (c.id, c)))
            .collect::<Result<_, DbError>>()?;

        let mut memberships = Vec::with_capacity(role_rows.len());
        for row in role_rows {
            let assignment = row.try_into_assignment()?;
            let conference = conferences
                .get(&assignment.conference_id)
                .cloned()
                .ok_or_else(|| DbError::NotFound {
                    entity: "conference".into(),
                    id: assignment.conference_id.to_string(),
                })?;
            memberships.push(ConferenceMembership {
                conference,
                role: assignment.role,
                permissions: assignment.permissions,
            });
        }

        // Most recent conference first, matching the dashboard ordering.
        memberships.sort_by(|a, b| b.conference.start_date.cmp(&a.conference.start_date));

        Ok(memberships)
    }
}
