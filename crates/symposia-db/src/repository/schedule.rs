//! SurrealDB implementation of [`ScheduleRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use symposia_core::error::SymposiaResult;
use symposia_core::models::schedule::{CreateScheduleItem, ScheduleItem, UpdateScheduleItem};
use symposia_core::repository::{Pagination, ScheduleRepository};
use symposia_core::validate;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{check_response, parse_uuid, require_conference};

#[derive(Debug, SurrealValue)]
struct ScheduleRow {
    conference_id: String,
    title: String,
    description: Option<String>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    location: Option<String>,
    speaker: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ScheduleRowWithId {
    record_id: String,
    conference_id: String,
    title: String,
    description: Option<String>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    location: Option<String>,
    speaker: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ScheduleRow {
    fn into_item(self, id: Uuid) -> Result<ScheduleItem, DbError> {
        Ok(ScheduleItem {
            id,
            conference_id: parse_uuid(&self.conference_id, "conference")?,
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            speaker: self.speaker,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ScheduleRowWithId {
    fn try_into_item(self) -> Result<ScheduleItem, DbError> {
        let id = parse_uuid(&self.record_id, "schedule item")?;
        let row = ScheduleRow {
            conference_id: self.conference_id,
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            speaker: self.speaker,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        row.into_item(id)
    }
}

/// SurrealDB implementation of the Schedule repository.
#[derive(Clone)]
pub struct SurrealScheduleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealScheduleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ScheduleRepository for SurrealScheduleRepository<C> {
    async fn create(
        &self,
        conference_id: Uuid,
        input: CreateScheduleItem,
    ) -> SymposiaResult<ScheduleItem> {
        require_conference(conference_id)?;
        validate::validate_title(&input.title)?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('schedule_item', $id) SET \
                 conference_id = $conference_id, \
                 title = $title, description = $description, \
                 start_time = $start_time, end_time = $end_time, \
                 location = $location, speaker = $speaker",
            )
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("start_time", input.start_time))
            .bind(("end_time", input.end_time))
            .bind(("location", input.location))
            .bind(("speaker", input.speaker))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response(result, "schedule item")?;

        let rows: Vec<ScheduleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "schedule_item".into(),
            id: id_str,
        })?;

        Ok(row.into_item(id)?)
    }

    async fn get_by_id(&self, conference_id: Uuid, id: Uuid) -> SymposiaResult<ScheduleItem> {
        require_conference(conference_id)?;

        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('schedule_item', $id) \
                 WHERE conference_id = $conference_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ScheduleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "schedule_item".into(),
            id: id_str,
        })?;

        Ok(row.into_item(id)?)
    }

    async fn find_all(
        &self,
        conference_id: Uuid,
        pagination: Pagination,
    ) -> SymposiaResult<Vec<ScheduleItem>> {
        require_conference(conference_id)?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM schedule_item \
                 WHERE conference_id = $conference_id \
                 ORDER BY start_time ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("conference_id", conference_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ScheduleRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_item())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn update(
        &self,
        conference_id: Uuid,
        id: Uuid,
        input: UpdateScheduleItem,
    ) -> SymposiaResult<ScheduleItem> {
        require_conference(conference_id)?;
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
        if input.start_time.is_some() {
            sets.push("start_time = $start_time");
        }
        if input.end_time.is_some() {
            sets.push("end_time = $end_time");
        }
        if input.location.is_some() {
            sets.push("location = $location");
        }
        if input.speaker.is_some() {
            sets.push("speaker = $speaker");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('schedule_item', $id) SET {} \
             WHERE conference_id = $conference_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(start_time) = input.start_time {
            builder = builder.bind(("start_time", start_time));
        }
        if let Some(end_time) = input.end_time {
            builder = builder.bind(("end_time", end_time));
        }
        if let Some(location) = input.location {
            builder = builder.bind(("location", location));
        }
        if let Some(speaker) = input.speaker {
            builder = builder.bind(("speaker", speaker));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = check_response(result, "schedule item")?;

        let rows: Vec<ScheduleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "schedule_item".into(),
            id: id_str,
        })?;

        Ok(row.into_item(id)?)
    }

    async fn delete(&self, conference_id: Uuid, id: Uuid) -> SymposiaResult<()> {
        require_conference(conference_id)?;

        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "DELETE type::record('schedule_item', $id) \
                 WHERE conference_id = $conference_id \
                 RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ScheduleRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "schedule_item".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }
}
