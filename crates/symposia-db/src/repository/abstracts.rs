//! SurrealDB implementation of [`AbstractRepository`].
//!
//! Every statement scopes on `conference_id`: a row that exists under a
//! different conference behaves exactly like a missing row, and writes
//! that match zero rows report not-found rather than succeeding
//! silently.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use symposia_core::error::SymposiaResult;
use symposia_core::models::abstracts::{
    Abstract, AbstractFilter, AbstractStatus, CreateAbstract, UpdateAbstract,
};
use symposia_core::repository::{AbstractRepository, Pagination};
use symposia_core::validate;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{check_response, parse_uuid, require_conference};

#[derive(Debug, SurrealValue)]
struct AbstractRow {
    conference_id: String,
    author_id: String,
    title: String,
    content: String,
    keywords: Vec<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AbstractRowWithId {
    record_id: String,
    conference_id: String,
    author_id: String,
    title: String,
    content: String,
    keywords: Vec<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<AbstractStatus, DbError> {
    match s {
        "submitted" => Ok(AbstractStatus::Submitted),
        "under_review" => Ok(AbstractStatus::UnderReview),
        "accepted" => Ok(AbstractStatus::Accepted),
        "rejected" => Ok(AbstractStatus::Rejected),
        other => Err(DbError::Decode(format!("unknown abstract status: {other}"))),
    }
}

impl AbstractRow {
    fn into_abstract(self, id: Uuid) -> Result<Abstract, DbError> {
        Ok(Abstract {
            id,
            conference_id: parse_uuid(&self.conference_id, "conference")?,
            author_id: parse_uuid(&self.author_id, "author")?,
            title: self.title,
            content: self.content,
            keywords: self.keywords,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AbstractRowWithId {
    fn try_into_abstract(self) -> Result<Abstract, DbError> {
        let id = parse_uuid(&self.record_id, "abstract")?;
        let row = AbstractRow {
            conference_id: self.conference_id,
            author_id: self.author_id,
            title: self.title,
            content: self.content,
            keywords: self.keywords,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        row.into_abstract(id)
    }
}

/// SurrealDB implementation of the Abstract repository.
#[derive(Clone)]
pub struct SurrealAbstractRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAbstractRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AbstractRepository for SurrealAbstractRepository<C> {
    async fn create(&self, conference_id: Uuid, input: CreateAbstract) -> SymposiaResult<Abstract> {
        require_conference(conference_id)?;
        validate::validate_title(&input.title)?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('abstract', $id) SET \
                 conference_id = $conference_id, \
                 author_id = $author_id, \
                 title = $title, content = $content, \
                 keywords = $keywords, status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()))
            .bind(("author_id", input.author_id.to_string()))
            .bind(("title", input.title))
            .bind(("content", input.content))
            .bind(("keywords", input.keywords))
            .bind(("status", "submitted".to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response(result, "abstract")?;

        let rows: Vec<AbstractRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "abstract".into(),
            id: id_str,
        })?;

        Ok(row.into_abstract(id)?)
    }

    async fn get_by_id(&self, conference_id: Uuid, id: Uuid) -> SymposiaResult<Abstract> {
        require_conference(conference_id)?;

        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('abstract', $id) \
                 WHERE conference_id = $conference_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AbstractRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "abstract".into(),
            id: id_str,
        })?;

        Ok(row.into_abstract(id)?)
    }

    async fn find_all(
        &self,
        conference_id: Uuid,
        filter: AbstractFilter,
        pagination: Pagination,
    ) -> SymposiaResult<Vec<Abstract>> {
        require_conference(conference_id)?;

        // The tenant clause always comes first; filters are appended,
        // never substituted for it.
        let mut wheres = vec!["conference_id = $conference_id"];
        if filter.author_id.is_some() {
            wheres.push("author_id = $author_id");
        }
        if filter.status.is_some() {
            wheres.push("status = $status");
        }

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM abstract \
             WHERE {} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset",
            wheres.join(" AND ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("conference_id", conference_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));

        if let Some(author_id) = filter.author_id {
            builder = builder.bind(("author_id", author_id.to_string()));
        }
        if let Some(status) = filter.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<AbstractRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_abstract())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn update(
        &self,
        conference_id: Uuid,
        id: Uuid,
        input: UpdateAbstract,
    ) -> SymposiaResult<Abstract> {
        require_conference(conference_id)?;
        if let Some(ref title) = input.title {
            validate::validate_title(title)?;
        }

        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.content.is_some() {
            sets.push("content = $content");
        }
        if input.keywords.is_some() {
            sets.push("keywords = $keywords");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('abstract', $id) SET {} \
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
        if let Some(content) = input.content {
            builder = builder.bind(("content", content));
        }
        if let Some(keywords) = input.keywords {
            builder = builder.bind(("keywords", keywords));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = check_response(result, "abstract")?;

        // Zero rows affected means the id exists under another
        // conference or not at all; both are not-found.
        let rows: Vec<AbstractRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "abstract".into(),
            id: id_str,
        })?;

        Ok(row.into_abstract(id)?)
    }

    async fn update_status(
        &self,
        conference_id: Uuid,
        id: Uuid,
        status: AbstractStatus,
    ) -> SymposiaResult<Abstract> {
        require_conference(conference_id)?;

        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('abstract', $id) SET \
                 status = $status, updated_at = time::now() \
                 WHERE conference_id = $conference_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AbstractRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "abstract".into(),
            id: id_str,
        })?;

        Ok(row.into_abstract(id)?)
    }

    async fn delete(&self, conference_id: Uuid, id: Uuid) -> SymposiaResult<()> {
        require_conference(conference_id)?;

        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "DELETE type::record('abstract', $id) \
                 WHERE conference_id = $conference_id \
                 RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AbstractRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "abstract".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }
}
