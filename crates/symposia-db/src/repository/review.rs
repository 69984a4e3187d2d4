//! SurrealDB implementation of [`ReviewRepository`].
//!
//! Reviews denormalize `conference_id` so every query scopes on it
//! directly; creation verifies the abstract actually belongs to the
//! stated conference before inserting. The `(abstract, reviewer)` pair
//! is unique.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use symposia_core::error::SymposiaResult;
use symposia_core::models::review::{
    CreateReview, Recommendation, Review, ReviewAggregate, ReviewFilter, UpdateReview,
};
use symposia_core::repository::{Pagination, ReviewRepository};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{check_response, parse_uuid, require_conference};

#[derive(Debug, SurrealValue)]
struct ReviewRow {
    conference_id: String,
    abstract_id: String,
    reviewer_id: String,
    score: i64,
    comments: Option<String>,
    recommendation: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ReviewRowWithId {
    record_id: String,
    conference_id: String,
    abstract_id: String,
    reviewer_id: String,
    score: i64,
    comments: Option<String>,
    recommendation: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_recommendation(s: &str) -> Result<Recommendation, DbError> {
    match s {
        "accept" => Ok(Recommendation::Accept),
        "revise" => Ok(Recommendation::Revise),
        "reject" => Ok(Recommendation::Reject),
        other => Err(DbError::Decode(format!("unknown recommendation: {other}"))),
    }
}

impl ReviewRow {
    fn into_review(self, id: Uuid) -> Result<Review, DbError> {
        Ok(Review {
            id,
            conference_id: parse_uuid(&self.conference_id, "conference")?,
            abstract_id: parse_uuid(&self.abstract_id, "abstract")?,
            reviewer_id: parse_uuid(&self.reviewer_id, "reviewer")?,
            score: self.score,
            comments: self.comments,
            recommendation: parse_recommendation(&self.recommendation)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ReviewRowWithId {
    fn try_into_review(self) -> Result<Review, DbError> {
        let id = parse_uuid(&self.record_id, "review")?;
        let row = ReviewRow {
            conference_id: self.conference_id,
            abstract_id: self.abstract_id,
            reviewer_id: self.reviewer_id,
            score: self.score,
            comments: self.comments,
            recommendation: self.recommendation,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        row.into_review(id)
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

#[derive(Debug, SurrealValue)]
struct AggregateRow {
    average_score: Option<f64>,
    total_reviews: u64,
}

/// SurrealDB implementation of the Review repository.
#[derive(Clone)]
pub struct SurrealReviewRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReviewRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Whether the abstract belongs to the conference. Abstracts never
    /// move between conferences, so this check cannot go stale.
    async fn abstract_in_conference(
        &self,
        conference_id: Uuid,
        abstract_id: Uuid,
    ) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM abstract \
                 WHERE meta::id(id) = $abstract_id \
                 AND conference_id = $conference_id GROUP ALL",
            )
            .bind(("abstract_id", abstract_id.to_string()))
            .bind(("conference_id", conference_id.to_string()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}

impl<C: Connection> ReviewRepository for SurrealReviewRepository<C> {
    async fn create(&self, conference_id: Uuid, input: CreateReview) -> SymposiaResult<Review> {
        require_conference(conference_id)?;

        // A review against an abstract of another conference must look
        // exactly like a review against a nonexistent abstract.
        if !self
            .abstract_in_conference(conference_id, input.abstract_id)
            .await?
        {
            return Err(DbError::NotFound {
                entity: "abstract".into(),
                id: input.abstract_id.to_string(),
            }
            .into());
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('review', $id) SET \
                 conference_id = $conference_id, \
                 abstract_id = $abstract_id, \
                 reviewer_id = $reviewer_id, \
                 score = $score, comments = $comments, \
                 recommendation = $recommendation",
            )
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()))
            .bind(("abstract_id", input.abstract_id.to_string()))
            .bind(("reviewer_id", input.reviewer_id.to_string()))
            .bind(("score", input.score))
            .bind(("comments", input.comments))
            .bind((
                "recommendation",
                input.recommendation.as_str().to_string(),
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response(result, "review")?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "review".into(),
            id: id_str,
        })?;

        Ok(row.into_review(id)?)
    }

    async fn get_by_id(&self, conference_id: Uuid, id: Uuid) -> SymposiaResult<Review> {
        require_conference(conference_id)?;

        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('review', $id) \
                 WHERE conference_id = $conference_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "review".into(),
            id: id_str,
        })?;

        Ok(row.into_review(id)?)
    }

    async fn find_all(
        &self,
        conference_id: Uuid,
        filter: ReviewFilter,
        pagination: Pagination,
    ) -> SymposiaResult<Vec<Review>> {
        require_conference(conference_id)?;

        let mut wheres = vec!["conference_id = $conference_id"];
        if filter.abstract_id.is_some() {
            wheres.push("abstract_id = $abstract_id");
        }
        if filter.reviewer_id.is_some() {
            wheres.push("reviewer_id = $reviewer_id");
        }

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM review \
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

        if let Some(abstract_id) = filter.abstract_id {
            builder = builder.bind(("abstract_id", abstract_id.to_string()));
        }
        if let Some(reviewer_id) = filter.reviewer_id {
            builder = builder.bind(("reviewer_id", reviewer_id.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<ReviewRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_review())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn by_abstract(
        &self,
        conference_id: Uuid,
        abstract_id: Uuid,
    ) -> SymposiaResult<Vec<Review>> {
        require_conference(conference_id)?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM review \
                 WHERE conference_id = $conference_id \
                 AND abstract_id = $abstract_id \
                 ORDER BY created_at DESC",
            )
            .bind(("conference_id", conference_id.to_string()))
            .bind(("abstract_id", abstract_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_review())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn update(
        &self,
        conference_id: Uuid,
        id: Uuid,
        input: UpdateReview,
    ) -> SymposiaResult<Review> {
        require_conference(conference_id)?;

        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.score.is_some() {
            sets.push("score = $score");
        }
        if input.comments.is_some() {
            sets.push("comments = $comments");
        }
        if input.recommendation.is_some() {
            sets.push("recommendation = $recommendation");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('review', $id) SET {} \
             WHERE conference_id = $conference_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()));

        if let Some(score) = input.score {
            builder = builder.bind(("score", score));
        }
        if let Some(comments) = input.comments {
            builder = builder.bind(("comments", comments));
        }
        if let Some(recommendation) = input.recommendation {
            builder = builder.bind(("recommendation", recommendation.as_str().to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = check_response(result, "review")?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "review".into(),
            id: id_str,
        })?;

        Ok(row.into_review(id)?)
    }

    async fn delete(&self, conference_id: Uuid, id: Uuid) -> SymposiaResult<()> {
        require_conference(conference_id)?;

        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "DELETE type::record('review', $id) \
                 WHERE conference_id = $conference_id \
                 RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("conference_id", conference_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "review".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn average_score(
        &self,
        conference_id: Uuid,
        abstract_id: Uuid,
    ) -> SymposiaResult<ReviewAggregate> {
        require_conference(conference_id)?;

        let mut result = self
            .db
            .query(
                "SELECT math::mean(score) AS average_score, \
                 count() AS total_reviews FROM review \
                 WHERE conference_id = $conference_id \
                 AND abstract_id = $abstract_id GROUP ALL",
            )
            .bind(("conference_id", conference_id.to_string()))
            .bind(("abstract_id", abstract_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AggregateRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .next()
            .map(|r| ReviewAggregate {
                average_score: r.average_score,
                total_reviews: r.total_reviews,
            })
            .unwrap_or(ReviewAggregate {
                average_score: None,
                total_reviews: 0,
            }))
    }
}
