//! SurrealDB repository implementations.

mod abstracts;
mod conference;
mod organization;
mod review;
mod role_assignment;
mod schedule;
mod session;
mod settings;
mod user;

pub use abstracts::SurrealAbstractRepository;
pub use conference::SurrealConferenceRepository;
pub use organization::SurrealOrganizationRepository;
pub use review::SurrealReviewRepository;
pub use role_assignment::SurrealRoleAssignmentRepository;
pub use schedule::SurrealScheduleRepository;
pub use session::SurrealSessionRepository;
pub use settings::SurrealSettingsRepository;
pub use user::{SurrealUserRepository, verify_password};

use chrono::NaiveDate;
use symposia_core::error::{SymposiaError, SymposiaResult};
use symposia_core::permission::{Permission, PermissionSet};
use uuid::Uuid;

use crate::error::DbError;

/// Conference-scoped accessors refuse to run with a nil conference id:
/// a nil here means the caller lost the tenant context, and defaulting
/// to "all conferences" would silently break isolation.
pub(crate) fn require_conference(conference_id: Uuid) -> SymposiaResult<()> {
    if conference_id.is_nil() {
        return Err(SymposiaError::ConferenceContext);
    }
    Ok(())
}

pub(crate) fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

pub(crate) fn parse_date(s: &str, what: &str) -> Result<NaiveDate, DbError> {
    s.parse()
        .map_err(|e| DbError::Decode(format!("invalid {what} date: {e}")))
}

pub(crate) fn parse_permissions(raw: &[String]) -> Result<PermissionSet, DbError> {
    raw.iter()
        .map(|s| {
            s.parse::<Permission>()
                .map_err(|e| DbError::Decode(e.to_string()))
        })
        .collect()
}

/// Check a query response, mapping unique-index and duplicate-record
/// violations to [`DbError::Conflict`].
pub(crate) fn check_response(
    response: surrealdb::Response,
    entity: &str,
) -> Result<surrealdb::Response, DbError> {
    match response.check() {
        Ok(r) => Ok(r),
        Err(e)
            if {
                let msg = e.to_string();
                msg.contains("already contains") || msg.contains("already exists")
            } =>
        {
            Err(DbError::Conflict {
                entity: entity.to_string(),
            })
        }
        Err(e) => Err(DbError::Surreal(e)),
    }
}
