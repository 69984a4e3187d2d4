//! SurrealDB implementation of [`ConferenceRepository`].
//!
//! Creation is a single store transaction that writes the conference
//! row and the creator's organizer role assignment together, so a
//! conference can never exist without its organizer membership.
//! Deletion removes every row scoped to the conference in the same
//! transaction.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use symposia_core::error::{SymposiaError, SymposiaResult};
use symposia_core::models::conference::{
    Conference, ConferenceStatus, CreateConference, UpdateConference,
};
use symposia_core::permission::ConferenceRole;
use symposia_core::repository::{
    ConferenceFilter, ConferenceRepository, PaginatedResult, Pagination,
};
use symposia_core::validate;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{check_response, parse_date, parse_uuid, role_assignment::triple_key};

#[derive(Debug, SurrealValue)]
struct ConferenceRow {
    title: String,
    slug: String,
    description: Option<String>,
    location: Option<String>,
    start_date: String,
    end_date: String,
    submission_deadline: Option<String>,
    organizer_id: String,
    organization_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct ConferenceRowWithId {
    record_id: String,
    title: String,
    slug: String,
    description: Option<String>,
    location: Option<String>,
    start_date: String,
    end_date: String,
    submission_deadline: Option<String>,
    organizer_id: String,
    organization_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<ConferenceStatus, DbError> {
    match s {
        "draft" => Ok(ConferenceStatus::Draft),
        "upcoming" => Ok(ConferenceStatus::Upcoming),
        "ongoing" => Ok(ConferenceStatus::Ongoing),
        "completed" => Ok(ConferenceStatus::Completed),
        "cancelled" => Ok(ConferenceStatus::Cancelled),
        other => Err(DbError::Decode(format!(
            "unknown conference status: {other}"
        ))),
    }
}

impl ConferenceRow {
    fn into_conference(self, id: Uuid) -> Result<Conference, DbError> {
        Ok(Conference {
            id,
            title: self.title,
            slug: self.slug,
            description: self.description,
            location: self.location,
            start_date: parse_date(&self.start_date, "start")?,
            end_date: parse_date(&self.end_date, "end")?,
            submission_deadline: self
                .submission_deadline
                .as_deref()
                .map(|d| parse_date(d, "submission deadline"))
                .transpose()?,
            organizer_id: parse_uuid(&self.organizer_id, "organizer")?,
            organization_id: self
                .organization_id
                .as_deref()
                .map(|o| parse_uuid(o, "organization"))
                .transpose()?,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ConferenceRowWithId {
    pub(crate) fn try_into_conference(self) -> Result<Conference, DbError> {
        let id = parse_uuid(&self.record_id, "conference")?;
        let row = ConferenceRow {
            title: self.title,
            slug: self.slug,
            description: self.description,
            location: self.location,
            start_date: self.start_date,
            end_date: self.end_date,
            submission_deadline: self.submission_deadline,
            organizer_id: self.organizer_id,
            organization_id: self.organization_id,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        row.into_conference(id)
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Conference repository.
#[derive(Clone)]
pub struct SurrealConferenceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealConferenceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM conference \
                 WHERE slug = $slug GROUP ALL",
            )
            .bind(("slug", slug.to_string()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    /// Derive a unique slug from the title, suffixing `-N` on collision.
    async fn generate_unique_slug(&self, title: &str) -> Result<String, DbError> {
        let base = validate::slugify(title);
        let mut slug = base.clone();
        let mut counter = 1;
        while self.slug_exists(&slug).await? {
            slug = format!("{base}-{counter}");
            counter += 1;
        }
        Ok(slug)
    }
}

impl<C: Connection> ConferenceRepository for SurrealConferenceRepository<C> {
    async fn create(&self, input: CreateConference) -> SymposiaResult<Conference> {
        validate::validate_title(&input.title)?;
        validate::validate_date_range(input.start_date, input.end_date)?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let slug = self.generate_unique_slug(&input.title).await?;

        let organizer_permissions: Vec<String> = ConferenceRole::Organizer
            .template()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        let role_key = triple_key(input.organizer_id, id, ConferenceRole::Organizer);

        // Conference and organizer assignment are committed together:
        // the creator is a member from the first instant the conference
        // is visible.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('conference', $id) SET \
                 title = $title, slug = $slug, \
                 description = $description, location = $location, \
                 start_date = $start_date, end_date = $end_date, \
                 submission_deadline = $submission_deadline, \
                 organizer_id = $organizer_id, \
                 organization_id = $organization_id, \
                 status = $status; \
                 CREATE type::record('conference_role', $role_key) SET \
                 user_id = $organizer_id, conference_id = $id, \
                 role = 'organizer', permissions = $permissions; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("slug", slug))
            .bind(("description", input.description))
            .bind(("location", input.location))
            .bind(("start_date", input.start_date.to_string()))
            .bind(("end_date", input.end_date.to_string()))
            .bind((
                "submission_deadline",
                input.submission_deadline.map(|d| d.to_string()),
            ))
            .bind(("organizer_id", input.organizer_id.to_string()))
            .bind((
                "organization_id",
                input.organization_id.map(|o| o.to_string()),
            ))
            .bind(("status", "draft".to_string()))
            .bind(("role_key", role_key))
            .bind(("permissions", organizer_permissions))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response(result, "conference")?;

        let rows: Vec<ConferenceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "conference".into(),
            id: id_str,
        })?;

        Ok(row.into_conference(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SymposiaResult<Conference> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('conference', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ConferenceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "conference".into(),
            id: id_str,
        })?;

        Ok(row.into_conference(id)?)
    }

    async fn get_by_slug(&self, slug: &str) -> SymposiaResult<Conference> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM conference \
                 WHERE slug = $slug",
            )
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ConferenceRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "conference".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_conference()?)
    }

    async fn list(
        &self,
        filter: ConferenceFilter,
        pagination: Pagination,
    ) -> SymposiaResult<PaginatedResult<Conference>> {
        let mut wheres = Vec::new();
        if filter.status.is_some() {
            wheres.push("status = $status");
        }
        if filter.organizer_id.is_some() {
            wheres.push("organizer_id = $organizer_id");
        }
        let where_clause = if wheres.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", wheres.join(" AND "))
        };

        let count_query = format!(
            "SELECT count() AS total FROM conference {where_clause}GROUP ALL"
        );
        let mut builder = self.db.query(&count_query);
        if let Some(status) = filter.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(organizer_id) = filter.organizer_id {
            builder = builder.bind(("organizer_id", organizer_id.to_string()));
        }
        let mut count_result = builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let page_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM conference \
             {where_clause}ORDER BY start_date DESC \
             LIMIT $limit START $offset"
        );
        let mut builder = self
            .db
            .query(&page_query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(status) = filter.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(organizer_id) = filter.organizer_id {
            builder = builder.bind(("organizer_id", organizer_id.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<ConferenceRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_conference())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(&self, id: Uuid, input: UpdateConference) -> SymposiaResult<Conference> {
        // Current state is needed to validate the status transition and
        // the effective date range.
        let current = self.get_by_id(id).await?;

        if let Some(next) = input.status {
            if !current.status.can_transition_to(next) {
                return Err(SymposiaError::Validation {
                    message: format!(
                        "illegal status transition: {} -> {}",
                        current.status.as_str(),
                        next.as_str()
                    ),
                });
            }
        }

        let effective_start = input.start_date.unwrap_or(current.start_date);
        let effective_end = input.end_date.unwrap_or(current.end_date);
        validate::validate_date_range(effective_start, effective_end)?;
        if let Some(ref title) = input.title {
            validate::validate_title(title)?;
        }

        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.location.is_some() {
            sets.push("location = $location");
        }
        if input.start_date.is_some() {
            sets.push("start_date = $start_date");
        }
        if input.end_date.is_some() {
            sets.push("end_date = $end_date");
        }
        if input.submission_deadline.is_some() {
            sets.push("submission_deadline = $submission_deadline");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('conference', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(location) = input.location {
            builder = builder.bind(("location", location));
        }
        if let Some(start_date) = input.start_date {
            builder = builder.bind(("start_date", start_date.to_string()));
        }
        if let Some(end_date) = input.end_date {
            builder = builder.bind(("end_date", end_date.to_string()));
        }
        if let Some(submission_deadline) = input.submission_deadline {
            // Option<Option<_>>: Some(None) clears the deadline.
            builder = builder.bind((
                "submission_deadline",
                submission_deadline.map(|d| d.to_string()),
            ));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = check_response(result, "conference")?;

        let rows: Vec<ConferenceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "conference".into(),
            id: id_str,
        })?;

        Ok(row.into_conference(id)?)
    }

    async fn delete(&self, id: Uuid) -> SymposiaResult<()> {
        // Existence check up front so a missing conference reports
        // not-found instead of silently deleting nothing.
        self.get_by_id(id).await?;

        let id_str = id.to_string();

        // Scoped rows go first, then the conference itself, all in one
        // transaction so no orphaned cross-tenant data can survive.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE conference_role WHERE conference_id = $id; \
                 DELETE abstract WHERE conference_id = $id; \
                 DELETE review WHERE conference_id = $id; \
                 DELETE schedule_item WHERE conference_id = $id; \
                 DELETE conference_settings WHERE conference_id = $id; \
                 DELETE type::record('conference', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
